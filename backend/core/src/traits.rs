use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;

use crate::error::{DeskError, ToolError};
use crate::message::{Message, ToolCall};
use crate::tools::ToolDefinition;

/// A capability the model can invoke by name.
///
/// Arguments are validated against [`Tool::definition`] before `execute`
/// is called. Handlers may perform real I/O; failures are returned as
/// [`ToolError`] and become `error` tool results.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and input schema.
    fn definition(&self) -> &ToolDefinition;

    /// Execute with already-validated arguments.
    async fn execute(&self, args: Value) -> Result<String, ToolError>;
}

/// Completion service the dispatch loop talks to.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "openrouter", "scripted").
    fn name(&self) -> &str;

    /// Open an incremental completion for the given conversation.
    async fn stream(&self, request: &CompletionRequest) -> Result<CompletionStream, DeskError>;
}

/// Request to a completion service.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// One item of a completion stream.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionChunk {
    /// A fragment of assistant text.
    TextDelta(String),
    /// A fully assembled tool call.
    ToolCall(ToolCall),
    /// The model finished its turn.
    Done,
}

pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<CompletionChunk, DeskError>> + Send>>;
