//! Dispatcher for model tool calls.
//!
//! Validates each call against its schema, runs the accepted ones
//! concurrently in spawned tasks and reports results in call order.
//! Spawned handlers finish even when the request that started them is gone.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use lexdesk_core::{
    DeskError, LoopEvent, Tool, ToolCall, ToolError, ToolRegistry, ToolResult, validate_arguments,
};
use lexdesk_logging::{DispatchEvent, EventLogger};

enum Slot {
    /// Rejected before reaching a handler.
    Rejected(ToolResult),
    Running { tool_name: String, handle: JoinHandle<ToolResult> },
}

pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    tool_timeout: Duration,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, tool_timeout: Duration) -> Self {
        Self {
            registry,
            tool_timeout,
        }
    }

    /// Unknown tool or bad arguments: the error result to report instead.
    fn check(&self, call: &ToolCall) -> Result<Arc<dyn Tool>, ToolResult> {
        let tool = self
            .registry
            .resolve(&call.name)
            .ok_or_else(|| ToolResult::error(call, DeskError::UnknownTool(call.name.clone()).to_string()))?;
        validate_arguments(tool.definition(), &call.arguments)
            .map_err(|e| ToolResult::error(call, e.to_string()))?;
        Ok(tool)
    }

    fn spawn(&self, tool: Arc<dyn Tool>, call: ToolCall) -> JoinHandle<ToolResult> {
        let timeout = self.tool_timeout;
        tokio::spawn(async move {
            match tokio::time::timeout(timeout, tool.execute(call.arguments.clone())).await {
                Ok(Ok(payload)) => ToolResult::complete(&call, payload),
                Ok(Err(e)) => ToolResult::error(&call, e.to_string()),
                Err(_) => {
                    warn!(tool = %call.name, call_id = %call.id, "Tool timed out");
                    ToolResult::error(&call, ToolError::Timeout(timeout.as_secs()).to_string())
                }
            }
        })
    }

    /// Execute one step's calls. Returns terminal results in call order.
    ///
    /// Errors only when a handler task panics or is aborted.
    pub async fn execute_all(
        &self,
        run_id: &str,
        calls: &[ToolCall],
        events: &mpsc::Sender<LoopEvent>,
    ) -> Result<Vec<ToolResult>, DeskError> {
        let mut slots = Vec::with_capacity(calls.len());
        for call in calls {
            EventLogger::log_event(
                run_id,
                DispatchEvent::ToolCall {
                    call_id: call.id.clone(),
                    tool_name: call.name.clone(),
                    arguments_json: call.arguments.to_string(),
                },
            );
            match self.check(call) {
                Ok(tool) => {
                    let _ = events
                        .send(LoopEvent::ToolResult(ToolResult::processing(call)))
                        .await;
                    debug!(tool = %call.name, call_id = %call.id, "Tool started");
                    slots.push(Slot::Running {
                        tool_name: call.name.clone(),
                        handle: self.spawn(tool, call.clone()),
                    });
                }
                Err(rejected) => {
                    warn!(tool = %call.name, call_id = %call.id, error = %rejected.payload, "Tool call rejected");
                    slots.push(Slot::Rejected(rejected));
                }
            }
        }

        let joined = join_all(slots.into_iter().map(|slot| async move {
            match slot {
                Slot::Rejected(result) => Ok(result),
                Slot::Running { tool_name, handle } => handle.await.map_err(|e| DeskError::Handler {
                    tool: tool_name,
                    message: format!("handler task failed: {e}"),
                }),
            }
        }))
        .await;

        let mut results = Vec::with_capacity(joined.len());
        for outcome in joined {
            let result = outcome?;
            EventLogger::log_event(
                run_id,
                DispatchEvent::ToolResult {
                    call_id: result.call_id.clone(),
                    tool_name: result.tool_name.clone(),
                    state: format!("{:?}", result.state).to_lowercase(),
                    payload: result.payload.clone(),
                },
            );
            let _ = events.send(LoopEvent::ToolResult(result.clone())).await;
            results.push(result);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use lexdesk_core::{InputSchema, ToolDefinition, ToolState};
    use serde_json::{Value, json};

    struct SleepyTool {
        definition: ToolDefinition,
        calls: Arc<AtomicUsize>,
    }

    impl SleepyTool {
        fn new(calls: Arc<AtomicUsize>) -> Self {
            Self {
                definition: ToolDefinition::new(
                    "sleepy",
                    "Sleeps for the given number of milliseconds",
                    InputSchema::new().required_string("label", "Echoed back"),
                ),
                calls,
            }
        }
    }

    #[async_trait]
    impl Tool for SleepyTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, args: Value) -> Result<String, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let label = args["label"].as_str().unwrap_or_default().to_string();
            let millis = args["millis"].as_u64().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(millis)).await;
            if label == "panic" {
                panic!("handler blew up");
            }
            Ok(label)
        }
    }

    fn dispatcher(timeout: Duration) -> (ToolDispatcher, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = ToolRegistry::builder()
            .register(Arc::new(SleepyTool::new(calls.clone())))
            .build()
            .unwrap();
        (ToolDispatcher::new(Arc::new(registry), timeout), calls)
    }

    fn drain(rx: &mut mpsc::Receiver<LoopEvent>) -> Vec<ToolResult> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let LoopEvent::ToolResult(result) = event {
                out.push(result);
            }
        }
        out
    }

    #[tokio::test]
    async fn results_follow_call_order() {
        let (dispatcher, _) = dispatcher(Duration::from_secs(5));
        let (tx, mut rx) = mpsc::channel(32);
        let calls = vec![
            ToolCall::new("a", "sleepy", json!({"label": "slow", "millis": 150})),
            ToolCall::new("b", "sleepy", json!({"label": "fast", "millis": 0})),
        ];
        let results = dispatcher.execute_all("run", &calls, &tx).await.unwrap();
        assert_eq!(results[0].payload, "slow");
        assert_eq!(results[1].payload, "fast");

        let events = drain(&mut rx);
        let order: Vec<_> = events
            .iter()
            .map(|r| (r.call_id.as_str(), r.state))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a", ToolState::Processing),
                ("b", ToolState::Processing),
                ("a", ToolState::Complete),
                ("b", ToolState::Complete),
            ]
        );
    }

    #[tokio::test]
    async fn rejected_calls_never_reach_the_handler() {
        let (dispatcher, counter) = dispatcher(Duration::from_secs(5));
        let (tx, mut rx) = mpsc::channel(32);
        let calls = vec![
            ToolCall::new("a", "sleepy", json!({"millis": 1})),
            ToolCall::new("b", "nope", json!({})),
        ];
        let results = dispatcher.execute_all("run", &calls, &tx).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(results[0].state, ToolState::Error);
        assert!(results[0].payload.contains("'label'"));
        assert!(results[1].payload.contains("unknown tool: nope"));

        // One error result each, no processing.
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[tokio::test]
    async fn slow_handler_times_out_as_error_result() {
        let (dispatcher, _) = dispatcher(Duration::from_millis(50));
        let (tx, _rx) = mpsc::channel(32);
        let calls = vec![ToolCall::new("a", "sleepy", json!({"label": "x", "millis": 5_000}))];
        let results = dispatcher.execute_all("run", &calls, &tx).await.unwrap();
        assert_eq!(results[0].state, ToolState::Error);
        assert!(results[0].payload.contains("timed out"));
    }

    #[tokio::test]
    async fn panicking_handler_fails_the_step() {
        let (dispatcher, _) = dispatcher(Duration::from_secs(5));
        let (tx, _rx) = mpsc::channel(32);
        let calls = vec![ToolCall::new("a", "sleepy", json!({"label": "panic"}))];
        let err = dispatcher.execute_all("run", &calls, &tx).await.unwrap_err();
        assert!(matches!(err, DeskError::Handler { .. }));
    }
}
