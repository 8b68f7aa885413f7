//! Voice/telephony agent collaborator used by the chat and call tools.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutboundCall {
    pub client_name: String,
    pub phone_number: String,
    pub reason: String,
    pub notes: Option<String>,
}

#[async_trait]
pub trait VoiceAgentProvider: Send + Sync {
    /// Queue an outbound call and return the workflow id.
    async fn start_outbound_call(&self, call: OutboundCall) -> Result<String>;
    /// Conversational reply to a client question.
    async fn reply(&self, client_name: &str, query: &str) -> Result<String>;
}

/// Records calls in memory and answers with a canned acknowledgement.
pub struct SimulatedVoiceAgent {
    calls: Arc<RwLock<Vec<(String, OutboundCall)>>>,
}

impl SimulatedVoiceAgent {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn calls(&self) -> Vec<(String, OutboundCall)> {
        self.calls.read().await.clone()
    }
}

impl Default for SimulatedVoiceAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoiceAgentProvider for SimulatedVoiceAgent {
    async fn start_outbound_call(&self, call: OutboundCall) -> Result<String> {
        let id = format!("call_{}", Uuid::new_v4().simple());
        self.calls.write().await.push((id.clone(), call));
        Ok(id)
    }

    async fn reply(&self, _client_name: &str, query: &str) -> Result<String> {
        Ok(format!(
            "(Simulated voice agent reply) I understand your question: \"{query}\". A human or \
             phone agent can follow up if needed."
        ))
    }
}
