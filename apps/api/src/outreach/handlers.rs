use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::jobs::repository;
use crate::outreach::{generate_email, EmailDraft};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub job_id: i64,
    #[serde(default)]
    pub resume_skills: Vec<String>,
    pub applicant_name: String,
}

/// POST /api/v1/outreach/email
pub async fn handle_generate_email(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<EmailDraft>, AppError> {
    let name = request.applicant_name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("applicant_name is required".to_string()));
    }

    let job = repository::get_job(state.cache.pool(), request.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", request.job_id)))?;

    Ok(Json(generate_email(&job, &request.resume_skills, name)))
}
