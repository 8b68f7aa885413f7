//! Deterministic provider that plays back scripted model turns.
//!
//! Used for offline runs and tests. Each call to `stream` consumes the next
//! turn; a provider built with [`ScriptedProvider::repeating`] replays its
//! last turn forever.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use serde_json::Value;

use lexdesk_core::{
    CompletionChunk, CompletionRequest, CompletionStream, DeskError, LlmProvider, ToolCall,
};

const PROVIDER: &str = "scripted";

/// One scripted model turn.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTurn {
    chunks: Vec<CompletionChunk>,
    failure: Option<String>,
    stall: Option<Duration>,
}

impl ScriptedTurn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, delta: impl Into<String>) -> Self {
        self.chunks.push(CompletionChunk::TextDelta(delta.into()));
        self
    }

    /// Call id is assigned when the turn is played.
    pub fn tool_call(mut self, name: impl Into<String>, arguments: Value) -> Self {
        self.chunks
            .push(CompletionChunk::ToolCall(ToolCall::new("", name, arguments)));
        self
    }

    /// Break the stream with a model-service error after the scripted chunks.
    pub fn fail_with(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Wait before finishing the turn.
    pub fn stall(mut self, duration: Duration) -> Self {
        self.stall = Some(duration);
        self
    }
}

#[derive(Default)]
struct Script {
    turns: VecDeque<ScriptedTurn>,
    repeat: Option<ScriptedTurn>,
    played: usize,
    requests: Vec<CompletionRequest>,
}

pub struct ScriptedProvider {
    script: Mutex<Script>,
}

impl ScriptedProvider {
    pub fn new(turns: Vec<ScriptedTurn>) -> Self {
        Self {
            script: Mutex::new(Script {
                turns: turns.into(),
                ..Script::default()
            }),
        }
    }

    /// Replays `turn` on every call.
    pub fn repeating(turn: ScriptedTurn) -> Self {
        Self {
            script: Mutex::new(Script {
                repeat: Some(turn),
                ..Script::default()
            }),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.script
            .lock()
            .map(|s| s.requests.clone())
            .unwrap_or_default()
    }

    fn next_turn(&self, request: &CompletionRequest) -> Result<(usize, ScriptedTurn), DeskError> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| DeskError::model_service(PROVIDER, "script lock poisoned"))?;
        script.requests.push(request.clone());
        let turn = match script.turns.pop_front() {
            Some(turn) => turn,
            None => script
                .repeat
                .clone()
                .ok_or_else(|| DeskError::model_service(PROVIDER, "script exhausted"))?,
        };
        script.played += 1;
        Ok((script.played, turn))
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn stream(&self, request: &CompletionRequest) -> Result<CompletionStream, DeskError> {
        let (number, turn) = self.next_turn(request)?;
        let stream = stream! {
            let mut calls = 0;
            for chunk in turn.chunks {
                match chunk {
                    CompletionChunk::ToolCall(mut call) => {
                        calls += 1;
                        if call.id.is_empty() {
                            call.id = format!("call_{number}_{calls}");
                        }
                        yield Ok(CompletionChunk::ToolCall(call));
                    }
                    other => yield Ok(other),
                }
            }
            if let Some(duration) = turn.stall {
                tokio::time::sleep(duration).await;
            }
            match turn.failure {
                Some(message) => yield Err(DeskError::model_service(PROVIDER, message)),
                None => yield Ok(CompletionChunk::Done),
            }
        };
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "test".into(),
            messages: Vec::new(),
            tools: Vec::new(),
            max_tokens: 64,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn plays_turns_in_order_and_assigns_call_ids() {
        let provider = ScriptedProvider::new(vec![
            ScriptedTurn::new().tool_call("receptionist", json!({})),
            ScriptedTurn::new().text("done"),
        ]);

        let first: Vec<_> = provider.stream(&request()).await.unwrap().collect().await;
        match &first[0] {
            Ok(CompletionChunk::ToolCall(call)) => assert_eq!(call.id, "call_1_1"),
            other => panic!("unexpected chunk {other:?}"),
        }
        assert!(matches!(first.last(), Some(Ok(CompletionChunk::Done))));

        let second: Vec<_> = provider.stream(&request()).await.unwrap().collect().await;
        assert!(matches!(&second[0], Ok(CompletionChunk::TextDelta(t)) if t == "done"));

        assert!(provider.stream(&request()).await.is_err());
        assert_eq!(provider.requests().len(), 3);
    }

    #[tokio::test]
    async fn failure_ends_the_stream_with_an_error() {
        let provider = ScriptedProvider::repeating(ScriptedTurn::new().text("par").fail_with("boom"));
        for _ in 0..2 {
            let items: Vec<_> = provider.stream(&request()).await.unwrap().collect().await;
            assert_eq!(items.len(), 2);
            assert!(items[1].is_err());
        }
    }
}
