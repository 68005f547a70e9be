use dashmap::DashMap;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::llm_client::{prompts::json_system, LlmClient};
use crate::skills::inference::{
    extract_known_skills, infer_skills_from_role_type, infer_skills_from_title, merge_unique,
    MAX_JOB_SKILLS,
};
use crate::skills::prompts::{JOB_SKILLS_PERSONA, JOB_SKILLS_PROMPT_TEMPLATE};

/// Descriptions shorter than this skip the LLM.
const MIN_DESCRIPTION_CHARS: usize = 50;

/// Memo entries kept before the memo is reset; roughly two full README scrapes.
const MEMO_CAPACITY: usize = 20_000;

const GENERIC_SKILLS: &[&str] = &["programming", "algorithms", "data structures"];

#[derive(Debug, Deserialize)]
struct JobSkillsResponse {
    #[serde(default)]
    required_skills: Vec<String>,
    #[serde(default)]
    role_type: Option<String>,
}

/// Extracts required skills for a listing, memoised per (title, description, company).
pub struct JobSkillExtractor {
    llm: Option<LlmClient>,
    use_llm: bool,
    memo: DashMap<String, Vec<String>>,
    memo_capacity: usize,
}

impl JobSkillExtractor {
    pub fn new(llm: Option<LlmClient>, use_llm: bool) -> Self {
        Self {
            llm,
            use_llm,
            memo: DashMap::new(),
            memo_capacity: MEMO_CAPACITY,
        }
    }

    fn memo_key(title: &str, description: &str, company: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update([0x1f]);
        hasher.update(description.as_bytes());
        hasher.update([0x1f]);
        hasher.update(company.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Skills named by the LLM, padded with role inference when the answer
    /// is thin. Falls back to keyword extraction when the LLM is off or fails.
    pub async fn extract(&self, title: &str, description: &str, company: &str) -> Vec<String> {
        let key = Self::memo_key(title, description, company);
        if let Some(hit) = self.memo.get(&key) {
            return hit.clone();
        }

        let skills = match (&self.llm, self.use_llm) {
            (Some(llm), true) if description.trim().chars().count() >= MIN_DESCRIPTION_CHARS => {
                match Self::ask_llm(llm, title, description, company).await {
                    Ok(skills) => skills,
                    Err(e) => {
                        warn!("Job skill extraction failed for '{title}', using keywords: {e}");
                        Self::keyword_fallback(title, description)
                    }
                }
            }
            _ => Self::keyword_fallback(title, description),
        };

        if self.memo.len() >= self.memo_capacity {
            debug!("Skill memo reached {} entries, resetting", self.memo.len());
            self.memo.clear();
        }
        self.memo.insert(key, skills.clone());
        skills
    }

    /// Title inference first, then LLM skills when it found more than two.
    pub async fn skills_for_listing(
        &self,
        title: &str,
        description: &str,
        company: &str,
    ) -> Vec<String> {
        let mut skills = infer_skills_from_title(title);
        let extracted = self.extract(title, description, company).await;

        if extracted.len() > 2 {
            merge_unique(&mut skills, &extracted);
            skills.truncate(MAX_JOB_SKILLS);
        }
        skills
    }

    async fn ask_llm(
        llm: &LlmClient,
        title: &str,
        description: &str,
        company: &str,
    ) -> Result<Vec<String>, crate::llm_client::LlmError> {
        let prompt = JOB_SKILLS_PROMPT_TEMPLATE
            .replace("{company}", company)
            .replace("{title}", title)
            .replace("{description}", description);

        let response: JobSkillsResponse = llm
            .call_json(&prompt, &json_system(JOB_SKILLS_PERSONA))
            .await?;

        let mut skills = Vec::new();
        merge_unique(&mut skills, &response.required_skills);

        let generic_only = skills
            .iter()
            .all(|s| GENERIC_SKILLS.contains(&s.to_lowercase().as_str()));
        if skills.len() < 3 || generic_only {
            debug!(
                "LLM skills for '{title}' too thin (role: {}), padding with role inference",
                response.role_type.as_deref().unwrap_or("unknown")
            );
            merge_unique(&mut skills, &infer_skills_from_role_type(title));
        }

        Ok(skills)
    }

    fn keyword_fallback(title: &str, description: &str) -> Vec<String> {
        extract_known_skills(&format!("{title} {description}"))
    }
}
