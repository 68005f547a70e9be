use bytes::Bytes;
use serde::Deserialize;
use tracing::{info, warn};

use crate::llm_client::{prompts::json_system, LlmClient};
use crate::models::resume::ParsedResume;
use crate::resume::metadata::extract_resume_metadata;
use crate::resume::prompts::{RESUME_SKILLS_PERSONA, RESUME_SKILLS_PROMPT_TEMPLATE};
use crate::resume::storage::ResumeStorage;
use crate::resume::upload::ResumeUpload;
use crate::resume::ResumeError;
use crate::skills::inference::{extract_known_skills, merge_unique};

/// Resume text sent to the LLM is cut to this many characters.
const MAX_PROMPT_CHARS: usize = 12_000;

#[derive(Debug, Deserialize)]
struct ResumeSkillsResponse {
    #[serde(default)]
    skills: Vec<String>,
}

/// Plain text of an uploaded resume. PDFs are decoded on a blocking thread.
pub async fn extract_text(bytes: Bytes, filename: &str) -> Result<String, ResumeError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await?
            .map_err(|e| ResumeError::Pdf(e.to_string()))?,
        "txt" | "md" => String::from_utf8_lossy(&bytes).into_owned(),
        "" => return Err(ResumeError::UnsupportedFormat("file has no extension".to_string())),
        other => return Err(ResumeError::UnsupportedFormat(format!(".{other}"))),
    };

    if text.trim().is_empty() {
        return Err(ResumeError::EmptyText);
    }
    Ok(text)
}

/// "machine learning" becomes "Machine Learning"; anything with a capital is kept.
fn title_case(skill: &str) -> String {
    if skill.chars().any(char::is_uppercase) {
        return skill.to_string();
    }
    skill
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_skills<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let titled: Vec<String> = raw.iter().map(|s| title_case(s.as_ref().trim())).collect();
    let mut skills = Vec::new();
    merge_unique(&mut skills, &titled);
    skills
}

pub struct ResumeParser {
    llm: Option<LlmClient>,
    storage: Option<ResumeStorage>,
}

impl ResumeParser {
    pub fn new(llm: Option<LlmClient>, storage: Option<ResumeStorage>) -> Self {
        Self { llm, storage }
    }

    /// Skills from the LLM, or the keyword list when the LLM is off, fails
    /// or finds nothing.
    pub async fn extract_skills(&self, text: &str) -> Vec<String> {
        if let Some(llm) = &self.llm {
            let excerpt: String = text.chars().take(MAX_PROMPT_CHARS).collect();
            let prompt = RESUME_SKILLS_PROMPT_TEMPLATE.replace("{resume_text}", &excerpt);

            match llm
                .call_json::<ResumeSkillsResponse>(&prompt, &json_system(RESUME_SKILLS_PERSONA))
                .await
            {
                Ok(response) if !response.skills.is_empty() => {
                    return normalize_skills(&response.skills);
                }
                Ok(_) => warn!("LLM found no resume skills, using keyword extraction"),
                Err(e) => warn!("Resume skill extraction failed, using keyword extraction: {e}"),
            }
        }
        normalize_skills(&extract_known_skills(text))
    }

    pub async fn parse(&self, upload: &ResumeUpload) -> Result<ParsedResume, ResumeError> {
        let text = extract_text(upload.bytes.clone(), &upload.filename).await?;
        let skills = self.extract_skills(&text).await;
        let metadata = extract_resume_metadata(&skills, &text);
        info!(
            "Parsed resume '{}': {} chars, {} skills",
            upload.filename,
            text.len(),
            skills.len()
        );

        let storage_key = match &self.storage {
            Some(storage) => match storage
                .archive(upload.bytes.clone(), &upload.filename, upload.user_id.as_deref())
                .await
            {
                Ok(key) => Some(key),
                Err(e) => {
                    warn!("Resume archival skipped: {e}");
                    None
                }
            },
            None => None,
        };

        Ok(ParsedResume {
            filename: upload.filename.clone(),
            text,
            skills,
            metadata,
            storage_key,
        })
    }
}
