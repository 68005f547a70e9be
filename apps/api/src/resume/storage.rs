//! Optional archival of uploaded resumes to S3.

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::resume::ResumeError;

pub struct ResumeStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

/// Content type from the file extension.
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// `resumes/<user|anonymous>/<YYYYmmdd_HHMMSS>_<id8>_<clean filename>`.
pub fn storage_key(filename: &str, user_id: Option<&str>, now: DateTime<Utc>, id: Uuid) -> String {
    let clean: String = filename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let owner = user_id.filter(|u| !u.trim().is_empty()).unwrap_or("anonymous");
    let short_id = &id.simple().to_string()[..8];

    format!(
        "resumes/{owner}/{}_{short_id}_{clean}",
        now.format("%Y%m%d_%H%M%S")
    )
}

impl ResumeStorage {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Uploads the original file and returns its key.
    pub async fn archive(
        &self,
        bytes: Bytes,
        filename: &str,
        user_id: Option<&str>,
    ) -> Result<String, ResumeError> {
        let key = storage_key(filename, user_id, Utc::now(), Uuid::new_v4());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type(content_type_for(filename))
            .metadata("original_filename", filename)
            .metadata("user_id", user_id.unwrap_or("anonymous"))
            .send()
            .await
            .map_err(|e| ResumeError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Archived resume to s3://{}/{}", self.bucket, key);
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_storage_key_layout() {
        let now = Utc.with_ymd_and_hms(2025, 10, 21, 9, 30, 5).unwrap();
        let id = Uuid::parse_str("0123abcd-0000-4000-8000-000000000000").unwrap();

        let key = storage_key("My Resume (final).pdf", Some("user-42"), now, id);
        assert_eq!(key, "resumes/user-42/20251021_093005_0123abcd_MyResumefinal.pdf");

        let key = storage_key("cv.pdf", None, now, id);
        assert!(key.starts_with("resumes/anonymous/"));
    }

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type_for("resume.PDF"), "application/pdf");
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        assert_eq!(content_type_for("no_extension"), "application/octet-stream");
    }
}
