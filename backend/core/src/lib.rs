pub mod error;
pub mod event;
pub mod message;
pub mod tools;
pub mod traits;
pub mod validation;

pub use error::{DeskError, ToolError};
pub use event::{FinishReason, LoopEvent};
pub use message::{Message, Role, ToolCall, ToolResult, ToolState};
pub use tools::{FieldSpec, FieldType, InputSchema, ToolDefinition, ToolRegistry, ToolRegistryBuilder};
pub use traits::{CompletionChunk, CompletionRequest, CompletionStream, LlmProvider, Tool};
pub use validation::validate_arguments;
