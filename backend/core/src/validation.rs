//! Argument validation against a tool's declared schema.
//!
//! Runs before any handler: a call that fails here never reaches the tool.

use serde_json::Value;

use crate::error::DeskError;
use crate::tools::ToolDefinition;

/// Check `args` against the definition's schema.
///
/// Rejects non-object arguments, missing required fields (absent or `null`),
/// values of the wrong JSON type and enum values outside the declared set.
/// Unknown extra fields are ignored.
pub fn validate_arguments(definition: &ToolDefinition, args: &Value) -> Result<(), DeskError> {
    let tool = definition.name.as_str();
    let Some(object) = args.as_object() else {
        return Err(DeskError::validation(tool, "<arguments>", "must be a JSON object"));
    };

    for field in &definition.input_schema.fields {
        let value = match object.get(&field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    return Err(DeskError::validation(tool, &field.name, "is required"));
                }
                continue;
            }
            Some(value) => value,
        };

        if !field.field_type.accepts(value) {
            return Err(DeskError::validation(
                tool,
                &field.name,
                format!("must be of type {}", field.field_type.as_str()),
            ));
        }

        if let (Some(allowed), Some(s)) = (&field.enum_values, value.as_str()) {
            if !allowed.iter().any(|v| v == s) {
                return Err(DeskError::validation(
                    tool,
                    &field.name,
                    format!("must be one of [{}], got '{s}'", allowed.join(", ")),
                ));
            }
        }
    }

    Ok(())
}
