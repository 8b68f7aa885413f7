//! Portfolio manager: client record lookup, search and updates.
//!
//! `retrieve` and `search` only read the store and give the same answer for
//! the same input. Every `update` appends a new revision.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use lexdesk_core::{InputSchema, Tool, ToolDefinition, ToolError};

use crate::records::RecordStore;
use crate::{parse_input, Latency};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PortfolioAction {
    Retrieve,
    Update,
    Search,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioInput {
    pub client_id: String,
    pub action: PortfolioAction,
    #[serde(default)]
    pub details: Option<String>,
}

pub struct PortfolioManagerTool {
    definition: ToolDefinition,
    records: Arc<dyn RecordStore>,
    latency: Latency,
}

impl PortfolioManagerTool {
    pub fn new(records: Arc<dyn RecordStore>, latency: Latency) -> Self {
        let definition = ToolDefinition::new(
            "portfolioManager",
            "Retrieve and update client records, case histories, and documents. \
             Manages client portfolios and provides access to relevant information.",
            InputSchema::new()
                .required_string("clientId", "Client identifier")
                .required_enum("action", &["retrieve", "update", "search"], "Action to perform")
                .optional_string("details", "Additional details or updates"),
        );
        Self {
            definition,
            records,
            latency,
        }
    }

    async fn retrieve(&self, client_id: &str) -> Result<String, ToolError> {
        let snapshot = self.records.portfolio(client_id).await?;
        let mut out = format!(
            "Retrieved portfolio for client {client_id}: Active since 2022, 3 ongoing matters, \
             last consultation 2 weeks ago. Case files include contract review, property \
             transaction, and estate planning."
        );
        if let Some(latest) = snapshot.revisions.last() {
            out.push_str(&format!(
                " {} recorded update(s); latest: {}.",
                snapshot.revisions.len(),
                latest.details
            ));
        }
        Ok(out)
    }

    async fn update(&self, client_id: &str, details: Option<&str>) -> Result<String, ToolError> {
        let details = details.unwrap_or("New information added to record.");
        let revision = self.records.append_revision(client_id, details).await?;
        info!(client_id = %client_id, revision = revision.number, "Portfolio updated");
        Ok(format!(
            "Portfolio updated for client {client_id} (revision {}): {details} \
             All changes synchronized with secure database.",
            revision.number
        ))
    }

    async fn search(&self, client_id: &str, details: Option<&str>) -> Result<String, ToolError> {
        let query = details.unwrap_or_default();
        let hits = self.records.search(client_id, query).await?;
        let scope = if query.is_empty() {
            "all records".to_string()
        } else {
            format!("\"{query}\"")
        };
        let mut out = format!(
            "Search completed for client {client_id}: Found relevant documents and case history \
             matching {scope}. Records are ready for review."
        );
        for hit in hits {
            out.push_str(&format!("\n- {hit}"));
        }
        Ok(out)
    }
}

#[async_trait]
impl Tool for PortfolioManagerTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let input: PortfolioInput = parse_input(args)?;
        self.latency.pause(700).await;
        match input.action {
            PortfolioAction::Retrieve => self.retrieve(&input.client_id).await,
            PortfolioAction::Update => {
                self.update(&input.client_id, input.details.as_deref()).await
            }
            PortfolioAction::Search => {
                self.search(&input.client_id, input.details.as_deref()).await
            }
        }
    }
}
