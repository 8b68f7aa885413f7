//! Gateway Health and tool listing.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::server::GatewayState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub tools: usize,
    pub timestamp: DateTime<Utc>,
}

/// Handler for `GET /api/health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok".into(),
        service: "lexdesk".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        tools: state.runner.registry().len(),
        timestamp: Utc::now(),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Handler for `GET /api/tools`
pub async fn list_tools(State(state): State<GatewayState>) -> Json<Vec<ToolInfo>> {
    Json(
        state
            .runner
            .registry()
            .definitions()
            .into_iter()
            .map(|def| ToolInfo {
                input_schema: def.input_schema.to_json_schema(),
                name: def.name,
                description: def.description,
            })
            .collect(),
    )
}
