//! Server-Sent Events for shell state changes

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;

use crate::AppState;

/// GET /events - SSE event stream
///
/// Streams every `WsrEvent`: session, feed, selection, notification,
/// marker and capture changes.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    wsr_common::sse::create_event_sse_stream("wsr-app", &state.event_bus)
}
