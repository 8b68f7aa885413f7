//! Conversational replies for general questions, backed by the voice agent.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use lexdesk_core::{InputSchema, Tool, ToolDefinition, ToolError};

use crate::parse_input;
use crate::voice::VoiceAgentProvider;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatInput {
    pub client_name: String,
    pub query: String,
}

pub struct ChatAiAgentTool {
    definition: ToolDefinition,
    voice: Arc<dyn VoiceAgentProvider>,
}

impl ChatAiAgentTool {
    pub fn new(voice: Arc<dyn VoiceAgentProvider>) -> Self {
        let definition = ToolDefinition::new(
            "chatAIAgent",
            "Handle general inquiries and provide conversational-style responses through the \
             firm's voice/chat agent.",
            InputSchema::new()
                .required_string("clientName", "The client's name for personalization")
                .required_string("query", "The client's question or request"),
        );
        Self { definition, voice }
    }
}

#[async_trait]
impl Tool for ChatAiAgentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let input: ChatInput = parse_input(args)?;
        let reply = self.voice.reply(&input.client_name, &input.query).await?;
        Ok(format!("Response for {}: {reply}", input.client_name))
    }
}
