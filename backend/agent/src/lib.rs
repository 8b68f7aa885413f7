//! LexDesk dispatch loop
//!
//! Runs one request: model turn, tool execution, repeat, until the model
//! answers, the step budget runs out, the client goes away, or something
//! fails.

pub mod agent_loop;
pub mod conversation;
pub mod system_prompt;
pub mod tool_dispatcher;

pub use agent_loop::{AgentRunner, LoopState, RunEnd, RunOutcome, RunnerSettings};
pub use conversation::Conversation;
pub use system_prompt::PromptBuilder;
pub use tool_dispatcher::ToolDispatcher;
