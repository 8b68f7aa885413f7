//! `lexdesk config show|path`

use std::path::Path;

use anyhow::Result;

use lexdesk_config::{LexDeskConfig, redact};

pub fn show(config: &LexDeskConfig) -> Result<()> {
    let value = serde_json::to_value(config)?;
    print!("{}", serde_yaml::to_string(&redact(&value))?);
    Ok(())
}

pub fn path(path: &Path) {
    let marker = if path.exists() { "" } else { " (not created yet)" };
    println!("{}{marker}", path.display());
}
