use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;

use crate::errors::AppError;

/// A resume file plus the optional form fields sent with it.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: String,
    pub bytes: Bytes,
    pub user_id: Option<String>,
    pub max_days: Option<i64>,
    pub limit: Option<usize>,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

fn parse_field<T: std::str::FromStr>(name: &str, raw: &str) -> Result<Option<T>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| AppError::Validation(format!("{name} must be a number, got '{raw}'")))
}

/// Reads the `resume` file field and the optional `user_id`, `max_days`
/// and `limit` text fields. Unknown fields are ignored.
pub async fn read_resume_upload(mut multipart: Multipart) -> Result<ResumeUpload, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut user_id = None;
    let mut max_days = None;
    let mut limit = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string).unwrap_or_default();
        match name.as_str() {
            "resume" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "resume".to_string());
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((filename, bytes));
            }
            "user_id" => {
                let text = field.text().await.map_err(multipart_error)?;
                user_id = Some(text.trim().to_string()).filter(|u| !u.is_empty());
            }
            "max_days" => {
                let text = field.text().await.map_err(multipart_error)?;
                max_days = parse_field::<i64>("max_days", &text)?;
            }
            "limit" => {
                let text = field.text().await.map_err(multipart_error)?;
                limit = parse_field::<usize>("limit", &text)?;
            }
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| AppError::Validation("resume file is required".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("resume file is empty".to_string()));
    }
    if max_days.is_some_and(|d| d < 0) {
        return Err(AppError::Validation("max_days cannot be negative".to_string()));
    }
    if limit == Some(0) {
        return Err(AppError::Validation("limit must be at least 1".to_string()));
    }

    Ok(ResumeUpload {
        filename,
        bytes,
        user_id,
        max_days,
        limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_accepts_blank_and_numbers() {
        assert_eq!(parse_field::<i64>("max_days", " ").unwrap(), None);
        assert_eq!(parse_field::<i64>("max_days", "14").unwrap(), Some(14));
        assert!(matches!(
            parse_field::<usize>("limit", "ten"),
            Err(AppError::Validation(_))
        ));
    }
}
