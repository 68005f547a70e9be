//! Axum route handlers for resume matching.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};
use tracing::debug;

use crate::errors::AppError;
use crate::matching::events::EventSink;
use crate::matching::MatchOutcome;
use crate::resume::upload::read_resume_upload;
use crate::state::AppState;

const EVENT_BUFFER: usize = 32;

// ────────────────────────────────────────────
// Match
// ────────────────────────────────────────────

/// POST /api/v1/match
///
/// Multipart upload (`resume` file, optional `max_days`, `limit`, `user_id`).
pub async fn handle_match(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MatchOutcome>, AppError> {
    let upload = read_resume_upload(multipart).await?;
    let outcome = state.matcher.match_upload(&upload, &EventSink::none()).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/match/stream
///
/// Same form as `/match`; progress and each match arrive as Server-Sent Events.
/// Upload validation errors are returned before the stream opens.
pub async fn handle_match_stream(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let upload = read_resume_upload(multipart).await?;
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);

    let matcher = Arc::clone(&state.matcher);
    tokio::spawn(async move {
        if let Err(e) = matcher.match_upload(&upload, &EventSink::new(tx)).await {
            debug!("Streamed match for '{}' ended with error: {e}", upload.filename);
        }
    });

    let stream = ReceiverStream::new(rx)
        .map(|event| Event::default().event(event.name()).json_data(&event));

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
