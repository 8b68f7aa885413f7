use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::DeskError;
use crate::traits::Tool;

/// JSON type accepted for a tool argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Integer,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
        }
    }

    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
        }
    }
}

/// Declarative descriptor for one argument.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    pub description: String,
}

/// Ordered set of argument descriptors for a tool.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InputSchema {
    pub fields: Vec<FieldSpec>,
}

impl InputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    fn field(
        mut self,
        name: &str,
        field_type: FieldType,
        required: bool,
        enum_values: Option<&[&str]>,
        description: &str,
    ) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            field_type,
            required,
            enum_values: enum_values.map(|v| v.iter().map(|s| s.to_string()).collect()),
            description: description.to_string(),
        });
        self
    }

    pub fn required_string(self, name: &str, description: &str) -> Self {
        self.field(name, FieldType::String, true, None, description)
    }

    pub fn optional_string(self, name: &str, description: &str) -> Self {
        self.field(name, FieldType::String, false, None, description)
    }

    pub fn required_enum(self, name: &str, values: &[&str], description: &str) -> Self {
        self.field(name, FieldType::String, true, Some(values), description)
    }

    pub fn optional_enum(self, name: &str, values: &[&str], description: &str) -> Self {
        self.field(name, FieldType::String, false, Some(values), description)
    }

    pub fn optional_number(self, name: &str, description: &str) -> Self {
        self.field(name, FieldType::Number, false, None, description)
    }

    pub fn optional_integer(self, name: &str, description: &str) -> Self {
        self.field(name, FieldType::Integer, false, None, description)
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render as a JSON Schema object for the model's tool list.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            let mut prop = json!({
                "type": field.field_type.as_str(),
                "description": field.description,
            });
            if let Some(values) = &field.enum_values {
                prop["enum"] = json!(values);
            }
            properties.insert(field.name.clone(), prop);
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A named operation the model may request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: InputSchema) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: schema,
        }
    }
}

/// Immutable name → handler table, built once at startup.
pub struct ToolRegistry {
    order: Vec<String>,
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition().clone())
            .collect()
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Freeze the registry. Duplicate names are a configuration error.
    pub fn build(self) -> Result<ToolRegistry, DeskError> {
        let mut order = Vec::with_capacity(self.tools.len());
        let mut tools = HashMap::with_capacity(self.tools.len());
        for tool in self.tools {
            let name = tool.definition().name.clone();
            if tools.contains_key(&name) {
                return Err(DeskError::Config(format!("tool '{name}' registered twice")));
            }
            order.push(name.clone());
            tools.insert(name, tool);
        }
        Ok(ToolRegistry { order, tools })
    }
}
