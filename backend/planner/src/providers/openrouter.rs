//! OpenAI-compatible streaming chat completions (OpenRouter by default).
//!
//! Tool calls arrive as fragments keyed by `index`; [`ChunkDecoder`] stitches
//! them together and emits each call only once the model finishes its turn.
//! A stream that ends before `finish_reason` or `[DONE]` is a model-service
//! failure.

use std::collections::BTreeMap;

use async_stream::try_stream;
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use lexdesk_core::{
    CompletionChunk, CompletionRequest, CompletionStream, DeskError, LlmProvider, Message, Role,
    ToolCall, ToolDefinition,
};

const PROVIDER: &str = "openrouter";

/// OpenRouter.ai (or any OpenAI-compatible endpoint) provider.
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

fn wire_message(message: &Message) -> Value {
    match message.role {
        Role::Assistant if !message.tool_calls.is_empty() => json!({
            "role": "assistant",
            "content": (!message.content.is_empty()).then(|| message.content.clone()),
            "tool_calls": message.tool_calls.iter().map(|call| json!({
                "id": call.id,
                "type": "function",
                "function": {
                    "name": call.name,
                    "arguments": call.arguments.to_string(),
                },
            })).collect::<Vec<_>>(),
        }),
        Role::Tool => json!({
            "role": "tool",
            "tool_call_id": message.tool_call_id,
            "content": message.content,
        }),
        role => json!({
            "role": role.to_string(),
            "content": message.content,
        }),
    }
}

fn wire_tool(definition: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": definition.name,
            "description": definition.description,
            "parameters": definition.input_schema.to_json_schema(),
        },
    })
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Option<Vec<StreamChoice>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<Delta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Deserialize)]
struct ToolCallDelta {
    #[serde(default)]
    index: usize,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<FunctionDelta>,
}

#[derive(Deserialize)]
struct FunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Default)]
struct PartialCall {
    id: Option<String>,
    name: String,
    arguments: String,
}

impl PartialCall {
    fn into_call(self) -> ToolCall {
        let id = self
            .id
            .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple()));
        // Unparseable arguments are kept as a string so validation rejects them.
        let arguments = if self.arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(&self.arguments).unwrap_or(Value::String(self.arguments))
        };
        ToolCall::new(id, self.name, arguments)
    }
}

/// Turns SSE `data` payloads into completion chunks.
#[derive(Default)]
pub struct ChunkDecoder {
    pending: BTreeMap<usize, PartialCall>,
    finished: bool,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Decode one SSE data payload.
    pub fn feed(&mut self, data: &str) -> Result<Vec<CompletionChunk>, DeskError> {
        let mut out = Vec::new();
        if self.finished {
            return Ok(out);
        }
        if data.trim() == "[DONE]" {
            self.flush(&mut out);
            return Ok(out);
        }

        let chunk: StreamChunk = serde_json::from_str(data).map_err(|e| {
            DeskError::model_service(PROVIDER, format!("unparseable stream chunk: {e}"))
        })?;
        if let Some(error) = chunk.error {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(DeskError::model_service(PROVIDER, message));
        }

        // Upstreams may send `null` for any of these.
        for choice in chunk.choices.unwrap_or_default() {
            let delta = choice.delta.unwrap_or_default();
            if let Some(text) = delta.content.filter(|t| !t.is_empty()) {
                out.push(CompletionChunk::TextDelta(text));
            }
            for delta in delta.tool_calls.unwrap_or_default() {
                let partial = self.pending.entry(delta.index).or_default();
                if let Some(id) = delta.id {
                    partial.id = Some(id);
                }
                if let Some(function) = delta.function {
                    if let Some(name) = function.name {
                        partial.name.push_str(&name);
                    }
                    if let Some(arguments) = function.arguments {
                        partial.arguments.push_str(&arguments);
                    }
                }
            }
            if let Some(reason) = choice.finish_reason {
                trace!(reason = %reason, "Model turn finished");
                self.flush(&mut out);
                break;
            }
        }
        Ok(out)
    }

    /// Call once the transport ends; errors when the turn never finished.
    pub fn finish(&mut self) -> Result<Vec<CompletionChunk>, DeskError> {
        if self.finished {
            Ok(Vec::new())
        } else {
            Err(DeskError::model_service(
                PROVIDER,
                "stream ended before the model finished its turn",
            ))
        }
    }

    fn flush(&mut self, out: &mut Vec<CompletionChunk>) {
        for (_, partial) in std::mem::take(&mut self.pending) {
            out.push(CompletionChunk::ToolCall(partial.into_call()));
        }
        out.push(CompletionChunk::Done);
        self.finished = true;
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn stream(&self, request: &CompletionRequest) -> Result<CompletionStream, DeskError> {
        let body = ChatRequest {
            model: request.model.clone(),
            messages: request.messages.iter().map(wire_message).collect(),
            tools: request.tools.iter().map(wire_tool).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: true,
        };

        debug!(
            model = %request.model,
            messages = body.messages.len(),
            tools = body.tools.len(),
            "Opening completion stream"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DeskError::model_service(PROVIDER, format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DeskError::model_service(
                PROVIDER,
                format!("returned {status}: {error_body}"),
            ));
        }

        let mut events = Box::pin(response.bytes_stream().eventsource());
        let stream = try_stream! {
            let mut decoder = ChunkDecoder::new();
            while let Some(event) = events.next().await {
                let event = event.map_err(|e| {
                    warn!(error = %e, "Completion stream broke");
                    DeskError::model_service(PROVIDER, format!("SSE stream error: {e}"))
                })?;
                for chunk in decoder.feed(&event.data)? {
                    yield chunk;
                }
                if decoder.is_finished() {
                    break;
                }
            }
            for chunk in decoder.finish()? {
                yield chunk;
            }
        };
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(chunks: &[CompletionChunk]) -> String {
        chunks
            .iter()
            .filter_map(|c| match c {
                CompletionChunk::TextDelta(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn null_fields_are_tolerated() {
        let mut decoder = ChunkDecoder::new();
        let chunks = decoder
            .feed(r#"{"choices":[{"delta":{"role":"assistant","content":"Hi","tool_calls":null},"finish_reason":null}]}"#)
            .unwrap();
        assert_eq!(chunks, vec![CompletionChunk::TextDelta("Hi".into())]);

        assert!(decoder.feed(r#"{"choices":[{"delta":null}]}"#).unwrap().is_empty());
        assert!(decoder.feed(r#"{"choices":null}"#).unwrap().is_empty());
        assert!(!decoder.is_finished());
    }

    #[test]
    fn text_deltas_pass_through() {
        let mut decoder = ChunkDecoder::new();
        let mut chunks = decoder
            .feed(r#"{"choices":[{"delta":{"content":"Hel"}}]}"#)
            .unwrap();
        chunks.extend(
            decoder
                .feed(r#"{"choices":[{"delta":{"content":"lo"},"finish_reason":"stop"}]}"#)
                .unwrap(),
        );
        assert_eq!(text(&chunks), "Hello");
        assert_eq!(chunks.last(), Some(&CompletionChunk::Done));
        assert!(decoder.finish().unwrap().is_empty());
    }

    #[test]
    fn tool_call_fragments_are_assembled_by_index() {
        let mut decoder = ChunkDecoder::new();
        let frames = [
            r#"{"choices":[{"delta":{"tool_calls":[{"index":1,"id":"call_b","function":{"name":"emailAgent","arguments":""}}]}}]}"#,
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"call_a","function":{"name":"intakeAgent","arguments":"{\"clientName\":"}}]}}]}"#,
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"\"John\"}"}}]}}]}"#,
            r#"{"choices":[{"delta":{"tool_calls":[{"index":1,"function":{"arguments":"{}"}}]}}]}"#,
        ];
        for frame in frames {
            assert!(decoder.feed(frame).unwrap().is_empty());
        }
        let chunks = decoder.feed("[DONE]").unwrap();
        assert_eq!(
            chunks,
            vec![
                CompletionChunk::ToolCall(ToolCall::new(
                    "call_a",
                    "intakeAgent",
                    json!({"clientName": "John"})
                )),
                CompletionChunk::ToolCall(ToolCall::new("call_b", "emailAgent", json!({}))),
                CompletionChunk::Done,
            ]
        );
    }

    #[test]
    fn malformed_arguments_stay_a_string() {
        let mut decoder = ChunkDecoder::new();
        let chunks = decoder
            .feed(r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"c","function":{"name":"callAgent","arguments":"{oops"}}]},"finish_reason":"tool_calls"}]}"#)
            .unwrap();
        match &chunks[0] {
            CompletionChunk::ToolCall(call) => {
                assert_eq!(call.arguments, Value::String("{oops".into()))
            }
            other => panic!("unexpected chunk {other:?}"),
        }
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let mut decoder = ChunkDecoder::new();
        decoder
            .feed(r#"{"choices":[{"delta":{"content":"partial"}}]}"#)
            .unwrap();
        let err = decoder.finish().unwrap_err();
        assert!(matches!(err, DeskError::ModelService { .. }));
    }

    #[test]
    fn error_payload_is_surfaced() {
        let mut decoder = ChunkDecoder::new();
        let err = decoder
            .feed(r#"{"error":{"message":"rate limited"}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn tool_messages_reference_their_call() {
        let call = ToolCall::new("call_1", "receptionist", json!({"action": "greet"}));
        let assistant = wire_message(&Message::assistant_with_calls("", vec![call]));
        assert_eq!(assistant["content"], Value::Null);
        assert_eq!(
            assistant["tool_calls"][0]["function"]["arguments"],
            r#"{"action":"greet"}"#
        );

        let mut tool = Message::system("ok");
        tool.role = Role::Tool;
        tool.tool_call_id = Some("call_1".into());
        assert_eq!(wire_message(&tool)["tool_call_id"], "call_1");
    }
}
