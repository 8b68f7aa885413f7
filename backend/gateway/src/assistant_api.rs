//! `POST /api/assistant`: run the dispatch loop and stream it back.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use tokio::sync::mpsc;
use tracing::{info, instrument};

use lexdesk_agent::{Conversation, PromptBuilder};

use crate::inbound::{RequestError, parse_request};
use crate::server::GatewayState;
use crate::sse::event_stream;

const EVENT_BUFFER: usize = 64;

/// The run is spawned so that a client disconnect only stops further model
/// turns; tool handlers already started still finish.
#[instrument(skip_all)]
pub async fn post_assistant(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Response, RequestError> {
    let history = parse_request(&body)?;
    info!(messages = history.len(), "Assistant request accepted");

    let system = PromptBuilder::build(&state.firm_name, &state.runner.registry().definitions());
    let conversation = Conversation::with_history(system, history);

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let runner = state.runner.clone();
    tokio::spawn(async move {
        runner.run(conversation, tx).await;
    });

    Ok(event_stream(rx).into_response())
}
