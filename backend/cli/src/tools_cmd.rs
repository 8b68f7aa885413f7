//! `lexdesk tools`: list the tool catalog the model sees.

use anyhow::Result;

use lexdesk_config::LexDeskConfig;
use lexdesk_core::ToolDefinition;
use lexdesk_tools::{Collaborators, default_registry};

use crate::runtime::tool_settings;
use crate::terminal_output::{note_info, render_table};

pub fn run(config: &LexDeskConfig, json: bool) -> Result<()> {
    let registry = default_registry(&Collaborators::simulated(), &tool_settings(config))?;
    let definitions = registry.definitions();

    if json {
        let catalog: Vec<_> = definitions
            .iter()
            .map(|def| {
                serde_json::json!({
                    "name": def.name,
                    "description": def.description,
                    "inputSchema": def.input_schema.to_json_schema(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = definitions.iter().map(row).collect();
    print!("{}", render_table(&["Name", "Required", "Description"], &rows, 60));
    note_info(&format!("{} tools registered", definitions.len()));
    Ok(())
}

fn row(def: &ToolDefinition) -> Vec<String> {
    let required: Vec<&str> = def
        .input_schema
        .fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name.as_str())
        .collect();
    vec![
        def.name.clone(),
        required.join(", "),
        def.description.clone(),
    ]
}
