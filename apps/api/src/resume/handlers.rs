//! Axum route handlers for resume parsing.

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::errors::AppError;
use crate::models::resume::ParsedResume;
use crate::resume::upload::read_resume_upload;
use crate::state::AppState;

/// POST /api/v1/resumes/parse
///
/// Multipart upload (`resume` file field). Returns extracted skills and
/// metadata without matching.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ParsedResume>, AppError> {
    let upload = read_resume_upload(multipart).await?;
    let parsed = state.resume_parser.parse(&upload).await?;
    Ok(Json(parsed))
}
