//! `lexdesk status`: ask a running server for its health report.

use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

use crate::terminal_output::{note_error, note_success, render_table};

pub async fn run(host: &str, port: u16) -> Result<()> {
    let url = format!("http://{host}:{port}/api/health");
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(_) => {
            note_error(&format!("LexDesk is not running on {host}:{port}"));
            return Ok(());
        }
    };
    let health: Value = response.error_for_status()?.json().await?;

    note_success(&format!("LexDesk is up at {host}:{port}"));
    let field = |key: &str| match &health[key] {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    };
    let rows = vec![
        vec!["status".to_string(), field("status")],
        vec!["version".to_string(), field("version")],
        vec!["uptime (s)".to_string(), field("uptimeSeconds")],
        vec!["tools".to_string(), field("tools")],
    ];
    print!("{}", render_table(&["", ""], &rows, 40));
    Ok(())
}
