//! Core dispatch loop.
//!
//! `AwaitingModel -> ExecutingTools -> AwaitingModel ... -> Done | Failed`.
//! One model turn is streamed at a time; tool calls from a turn are only
//! executed once that turn completed without error.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use lexdesk_core::{
    CompletionChunk, DeskError, FinishReason, LoopEvent, Message, ToolCall, ToolRegistry,
};
use lexdesk_logging::{DispatchEvent, EventLogger};
use lexdesk_planner::ModelPlanner;

use crate::conversation::Conversation;
use crate::tool_dispatcher::ToolDispatcher;

/// Final text when the budget runs out before the model said anything.
pub const BUDGET_FALLBACK_TEXT: &str = "I wasn't able to finish all of the steps for this request. \
     Please let me know if you'd like me to continue, or contact the office directly.";

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Tool-execution rounds allowed per request.
    pub max_steps: usize,
    pub step_timeout: Duration,
    pub tool_timeout: Duration,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            max_steps: 8,
            step_timeout: Duration::from_secs(60),
            tool_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
pub enum LoopState {
    AwaitingModel,
    ExecutingTools(Vec<ToolCall>),
    Done { reason: FinishReason, text: String },
    Failed(DeskError),
}

#[derive(Debug)]
pub enum RunEnd {
    Finished { reason: FinishReason, text: String },
    Failed(DeskError),
}

/// What a finished run leaves behind.
#[derive(Debug)]
pub struct RunOutcome {
    pub run_id: String,
    pub steps: usize,
    pub end: RunEnd,
    pub conversation: Conversation,
}

#[derive(Default)]
struct ModelTurn {
    text: String,
    calls: Vec<ToolCall>,
}

pub struct AgentRunner {
    planner: ModelPlanner,
    registry: Arc<ToolRegistry>,
    dispatcher: ToolDispatcher,
    settings: RunnerSettings,
}

impl AgentRunner {
    pub fn new(planner: ModelPlanner, registry: Arc<ToolRegistry>, settings: RunnerSettings) -> Self {
        let dispatcher = ToolDispatcher::new(registry.clone(), settings.tool_timeout);
        Self {
            planner,
            registry,
            dispatcher,
            settings,
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Drive one request to completion, streaming events to `events`.
    ///
    /// Exactly one terminal event (`finish` or `error`) is sent last.
    #[instrument(skip_all, fields(conversation = %conversation.id()))]
    pub async fn run(
        &self,
        mut conversation: Conversation,
        events: mpsc::Sender<LoopEvent>,
    ) -> RunOutcome {
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, max_steps = self.settings.max_steps, "Starting dispatch run");

        let mut steps = 0usize;
        let mut run_text = String::new();
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel => {
                    if events.is_closed() {
                        info!(run_id = %run_id, "Client disconnected, not calling the model again");
                        LoopState::Done {
                            reason: FinishReason::Cancelled,
                            text: run_text.clone(),
                        }
                    } else {
                        self.await_model(&run_id, steps, &mut conversation, &mut run_text, &events)
                            .await
                    }
                }
                LoopState::ExecutingTools(calls) => {
                    steps += 1;
                    debug!(run_id = %run_id, step = steps, calls = calls.len(), "Executing tools");
                    match self.dispatcher.execute_all(&run_id, &calls, &events).await {
                        Ok(results) => {
                            for result in &results {
                                conversation.push(Message::tool_result(result));
                            }
                            LoopState::AwaitingModel
                        }
                        Err(e) => LoopState::Failed(e),
                    }
                }
                LoopState::Done { reason, text } => {
                    info!(run_id = %run_id, reason = %reason, steps, "Dispatch run finished");
                    EventLogger::log_event(
                        &run_id,
                        DispatchEvent::RunFinished {
                            reason: reason.to_string(),
                            steps,
                        },
                    );
                    let _ = events
                        .send(LoopEvent::Finish {
                            reason,
                            steps,
                            text: text.clone(),
                        })
                        .await;
                    return RunOutcome {
                        run_id,
                        steps,
                        end: RunEnd::Finished { reason, text },
                        conversation,
                    };
                }
                LoopState::Failed(e) => {
                    error!(run_id = %run_id, error = %e, steps, "Dispatch run failed");
                    EventLogger::log_event(
                        &run_id,
                        DispatchEvent::RunFailed {
                            error_msg: e.to_string(),
                        },
                    );
                    let _ = events
                        .send(LoopEvent::Error {
                            message: e.to_string(),
                        })
                        .await;
                    return RunOutcome {
                        run_id,
                        steps,
                        end: RunEnd::Failed(e),
                        conversation,
                    };
                }
            };
        }
    }

    async fn await_model(
        &self,
        run_id: &str,
        steps: usize,
        conversation: &mut Conversation,
        run_text: &mut String,
        events: &mpsc::Sender<LoopEvent>,
    ) -> LoopState {
        EventLogger::log_event(
            run_id,
            DispatchEvent::ModelTurn {
                step: steps,
                provider: self.planner.provider_name().to_string(),
            },
        );

        let turn = match tokio::time::timeout(
            self.settings.step_timeout,
            self.model_turn(conversation, events),
        )
        .await
        {
            Ok(Ok(turn)) => turn,
            Ok(Err(e)) => return LoopState::Failed(e),
            Err(_) => {
                return LoopState::Failed(DeskError::model_service(
                    self.planner.provider_name(),
                    format!(
                        "model turn exceeded {}s",
                        self.settings.step_timeout.as_secs()
                    ),
                ));
            }
        };
        run_text.push_str(&turn.text);

        if turn.calls.is_empty() {
            conversation.push(Message::assistant(turn.text));
            return LoopState::Done {
                reason: FinishReason::Completed,
                text: run_text.clone(),
            };
        }

        if steps >= self.settings.max_steps {
            warn!(run_id = %run_id, max_steps = self.settings.max_steps, "Step budget exhausted");
            if run_text.trim().is_empty() {
                run_text.push_str(BUDGET_FALLBACK_TEXT);
                let _ = events
                    .send(LoopEvent::TextDelta {
                        delta: BUDGET_FALLBACK_TEXT.to_string(),
                    })
                    .await;
            }
            conversation.push(Message::assistant(run_text.clone()));
            return LoopState::Done {
                reason: FinishReason::StepBudgetExhausted,
                text: run_text.clone(),
            };
        }

        for call in &turn.calls {
            let _ = events
                .send(LoopEvent::ToolCall {
                    call_id: call.id.clone(),
                    tool_name: call.name.clone(),
                    args: call.arguments.clone(),
                })
                .await;
        }
        conversation.push(Message::assistant_with_calls(turn.text, turn.calls.clone()));
        LoopState::ExecutingTools(turn.calls)
    }

    /// Stream one model turn, forwarding text as it arrives.
    async fn model_turn(
        &self,
        conversation: &Conversation,
        events: &mpsc::Sender<LoopEvent>,
    ) -> Result<ModelTurn, DeskError> {
        let mut stream = self
            .planner
            .open_turn(conversation.messages(), self.registry.definitions())
            .await?;

        let mut turn = ModelTurn::default();
        while let Some(chunk) = stream.next().await {
            match chunk? {
                CompletionChunk::TextDelta(delta) => {
                    turn.text.push_str(&delta);
                    let _ = events.send(LoopEvent::TextDelta { delta }).await;
                }
                CompletionChunk::ToolCall(call) => turn.calls.push(call),
                CompletionChunk::Done => return Ok(turn),
            }
        }
        Err(DeskError::model_service(
            self.planner.provider_name(),
            "completion stream ended without finishing the turn",
        ))
    }
}
