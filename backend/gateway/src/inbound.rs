//! Inbound request parsing for `POST /api/assistant`.
//!
//! Accepts `{messages: [{id?, role, content}]}` where `content` is a string
//! or a list of `{type: "text", text}` parts. Broken JSON is a 400; a body
//! that parses but has the wrong shape is a 422 naming the offending field.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::warn;

use lexdesk_core::{DeskError, Message};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    Syntax(String),
    Shape(String),
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::Syntax(_) => StatusCode::BAD_REQUEST,
            RequestError::Shape(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RequestError::Syntax(m) | RequestError::Shape(m) => m,
        }
    }
}

impl From<RequestError> for DeskError {
    fn from(err: RequestError) -> Self {
        DeskError::MalformedRequest(err.message().to_string())
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.status();
        let err = DeskError::from(self);
        warn!(status = status.as_u16(), error = %err, "Rejected assistant request");
        (status, Json(json!({ "error": err.to_string() }))).into_response()
    }
}

fn shape(message: impl Into<String>) -> RequestError {
    RequestError::Shape(message.into())
}

/// Parse and normalize the request body into conversation history.
pub fn parse_request(body: &[u8]) -> Result<Vec<Message>, RequestError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| RequestError::Syntax(format!("invalid JSON body: {e}")))?;

    let messages = value
        .get("messages")
        .and_then(Value::as_array)
        .ok_or_else(|| shape("messages: expected an array"))?;
    if messages.is_empty() {
        return Err(shape("messages: must not be empty"));
    }

    messages
        .iter()
        .enumerate()
        .map(|(index, entry)| normalize(index, entry))
        .collect()
}

fn normalize(index: usize, entry: &Value) -> Result<Message, RequestError> {
    let field = |name: &str| format!("messages[{index}].{name}");

    let role = entry
        .get("role")
        .and_then(Value::as_str)
        .ok_or_else(|| shape(format!("{}: expected a string", field("role"))))?;

    let content = match entry.get("content") {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(parts)) => {
            let mut text = String::new();
            for (part_index, part) in parts.iter().enumerate() {
                let part_field = field(&format!("content[{part_index}]"));
                match part.get("type").and_then(Value::as_str) {
                    Some("text") => {}
                    Some(other) => {
                        return Err(shape(format!(
                            "{part_field}: unsupported part type '{other}'"
                        )));
                    }
                    None => return Err(shape(format!("{part_field}.type: expected a string"))),
                }
                let fragment = part
                    .get("text")
                    .and_then(Value::as_str)
                    .ok_or_else(|| shape(format!("{part_field}.text: expected a string")))?;
                text.push_str(fragment);
            }
            text
        }
        _ => {
            return Err(shape(format!(
                "{}: expected a string or a list of text parts",
                field("content")
            )));
        }
    };
    if content.trim().is_empty() {
        return Err(shape(format!("{}: must not be empty", field("content"))));
    }

    let message = match role {
        "user" => Message::user(content),
        "assistant" => Message::assistant(content),
        other => {
            return Err(shape(format!(
                "{}: must be 'user' or 'assistant', got '{other}'",
                field("role")
            )));
        }
    };

    Ok(match entry.get("id").and_then(Value::as_str) {
        Some(id) => message.with_id(id),
        None => message,
    })
}
