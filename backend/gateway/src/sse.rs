//! SSE framing for dispatch events.
//!
//! The event name is the `LoopEvent` kind (`text-delta`, `tool-call`,
//! `tool-result`, `finish`, `error`); the data is the event as JSON.

use std::convert::Infallible;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use lexdesk_core::LoopEvent;

pub fn to_sse_event(event: &LoopEvent) -> Event {
    let data = serde_json::to_string(event)
        .unwrap_or_else(|e| serde_json::json!({ "type": "error", "message": e.to_string() }).to_string());
    Event::default().event(event.kind()).data(data)
}

/// Stream events from the dispatch loop until it drops its sender.
pub fn event_stream(
    rx: mpsc::Receiver<LoopEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = ReceiverStream::new(rx).map(|event| Ok(to_sse_event(&event)));
    Sse::new(stream).keep_alive(KeepAlive::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexdesk_core::FinishReason;

    #[test]
    fn event_name_matches_kind() {
        let event = LoopEvent::Finish {
            reason: FinishReason::Completed,
            steps: 2,
            text: "done".into(),
        };
        let rendered = format!("{:?}", to_sse_event(&event));
        assert!(rendered.contains("finish"));
    }
}
