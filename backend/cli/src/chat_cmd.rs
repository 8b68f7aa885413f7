//! `lexdesk chat`: run one dispatch locally and print the event stream.

use std::io::stdout;

use anyhow::{Result, bail};
use tokio::sync::mpsc;

use lexdesk_agent::{AgentRunner, Conversation, PromptBuilder, RunEnd};
use lexdesk_core::{LoopEvent, Message, ToolState};

use crate::terminal_output::{DIM, GREEN, RED, note_error, paint, stream_write};

pub async fn run(runner: AgentRunner, firm_name: &str, message: String) -> Result<()> {
    let system = PromptBuilder::build(firm_name, &runner.registry().definitions());
    let conversation = Conversation::with_history(system, vec![Message::user(message)]);

    let (tx, mut rx) = mpsc::channel(64);
    let run = tokio::spawn(async move { runner.run(conversation, tx).await });

    let mut out = stdout();
    while let Some(event) = rx.recv().await {
        if let Some(line) = render(&event) {
            stream_write(&mut out, &line)?;
        }
    }

    let outcome = run.await?;
    if let RunEnd::Failed(e) = outcome.end {
        bail!("dispatch run {} failed: {e}", outcome.run_id);
    }
    Ok(())
}

fn render(event: &LoopEvent) -> Option<String> {
    match event {
        LoopEvent::TextDelta { delta } => Some(delta.clone()),
        LoopEvent::ToolCall {
            tool_name, args, ..
        } => Some(paint(DIM, &format!("\n-> {tool_name} {args}\n"))),
        LoopEvent::ToolResult(result) => match result.state {
            ToolState::Processing => None,
            ToolState::Complete => Some(paint(
                GREEN,
                &format!("<- {}: {}\n", result.tool_name, first_line(&result.payload)),
            )),
            ToolState::Error => Some(paint(
                RED,
                &format!("<- {} failed: {}\n", result.tool_name, result.payload),
            )),
        },
        LoopEvent::Finish { reason, steps, .. } => {
            Some(paint(DIM, &format!("\n[{reason} after {steps} step(s)]\n")))
        }
        LoopEvent::Error { message } => {
            note_error(message);
            None
        }
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexdesk_core::{FinishReason, ToolCall, ToolResult};
    use serde_json::json;

    #[test]
    fn processing_results_are_not_printed() {
        let call = ToolCall::new("c1", "intakeAgent", json!({}));
        assert!(render(&LoopEvent::ToolResult(ToolResult::processing(&call))).is_none());

        let done = ToolResult::complete(&call, "Intake record created\nsecond line");
        let line = crate::terminal_output::strip_ansi(&render(&LoopEvent::ToolResult(done)).unwrap());
        assert_eq!(line, "<- intakeAgent: Intake record created\n");
    }

    #[test]
    fn finish_shows_reason_and_steps() {
        let line = render(&LoopEvent::Finish {
            reason: FinishReason::StepBudgetExhausted,
            steps: 8,
            text: String::new(),
        })
        .unwrap();
        assert!(line.contains("step_budget_exhausted after 8 step(s)"));
    }
}
