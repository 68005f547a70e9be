use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::llm_client::{prompts::json_system, LlmClient};
use crate::matching::prompts::{PROFILE_PERSONA, PROFILE_PROMPT_TEMPLATE};

const MAX_PROMPT_CHARS: usize = 8_000;
const FALLBACK_TOP_SKILLS: usize = 8;

/// Summary of a candidate used to brief the ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub top_skills: Vec<String>,
    pub experience_level: String,
    pub career_direction: String,
    pub specialization_areas: Vec<String>,
    pub learning_indicators: Option<String>,
    pub leadership_potential: Option<String>,
    pub adaptability_score: Option<String>,
    pub preferred_industries: Vec<String>,
    pub work_style: Option<String>,
    pub growth_trajectory: Option<String>,
    pub confidence_level: String,
}

impl Default for CandidateProfile {
    fn default() -> Self {
        Self {
            top_skills: Vec::new(),
            experience_level: "student".to_string(),
            career_direction: "general".to_string(),
            specialization_areas: Vec::new(),
            learning_indicators: None,
            leadership_potential: None,
            adaptability_score: None,
            preferred_industries: Vec::new(),
            work_style: None,
            growth_trajectory: None,
            confidence_level: "low".to_string(),
        }
    }
}

impl CandidateProfile {
    /// Profile built from the skill list alone.
    pub fn fallback(skills: &[String]) -> Self {
        Self {
            top_skills: skills.iter().take(FALLBACK_TOP_SKILLS).cloned().collect(),
            ..Default::default()
        }
    }

    /// Multi-line brief for the ranking prompt.
    pub fn summary(&self) -> String {
        format!(
            "Experience Level: {}\nCareer Direction: {}\nTop Skills: {}\nSpecializations: {}\n\
             Learning Style: {}\nGrowth Potential: {}",
            self.experience_level,
            self.career_direction,
            self.top_skills.join(", "),
            self.specialization_areas.join(", "),
            self.learning_indicators.as_deref().unwrap_or("adaptable"),
            self.growth_trajectory.as_deref().unwrap_or("steady learner"),
        )
    }
}

/// Profiles kept before the memo is reset.
const MEMO_CAPACITY: usize = 1_000;

/// Analyses a candidate once per distinct resume.
pub struct CandidateProfiler {
    llm: Option<LlmClient>,
    memo: DashMap<String, Arc<CandidateProfile>>,
}

impl CandidateProfiler {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self {
            llm,
            memo: DashMap::new(),
        }
    }

    fn memo_key(skills: &[String], text: &str) -> String {
        let mut hasher = Sha256::new();
        for skill in skills {
            hasher.update(skill.as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update([0x1e]);
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// LLM profile of the candidate. Without an LLM, or when it fails, a
    /// low-confidence profile from the skill list; fallbacks are not memoised.
    pub async fn analyze(&self, skills: &[String], text: &str) -> Arc<CandidateProfile> {
        let Some(llm) = &self.llm else {
            return Arc::new(CandidateProfile::fallback(skills));
        };

        let key = Self::memo_key(skills, text);
        if let Some(hit) = self.memo.get(&key) {
            return Arc::clone(&hit);
        }

        let excerpt: String = text.chars().take(MAX_PROMPT_CHARS).collect();
        let prompt = PROFILE_PROMPT_TEMPLATE
            .replace("{skills}", &skills.join(", "))
            .replace("{resume_text}", &excerpt);

        match llm
            .call_json::<CandidateProfile>(&prompt, &json_system(PROFILE_PERSONA))
            .await
        {
            Ok(mut profile) => {
                if profile.top_skills.is_empty() {
                    profile.top_skills = CandidateProfile::fallback(skills).top_skills;
                }
                info!(
                    "Candidate profile: {} {} ({} confidence)",
                    profile.experience_level, profile.career_direction, profile.confidence_level
                );
                let profile = Arc::new(profile);
                if self.memo.len() >= MEMO_CAPACITY {
                    self.memo.clear();
                }
                self.memo.insert(key, Arc::clone(&profile));
                profile
            }
            Err(e) => {
                warn!("Candidate profiling failed, using skill list: {e}");
                Arc::new(CandidateProfile::fallback(skills))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::test_support::{client_for, message_body};

    fn skills(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Skill{i}")).collect()
    }

    #[tokio::test]
    async fn test_without_llm_uses_fallback() {
        let profiler = CandidateProfiler::new(None);
        let profile = profiler.analyze(&skills(12), "text").await;

        assert_eq!(profile.top_skills.len(), 8);
        assert_eq!(profile.experience_level, "student");
        assert_eq!(profile.career_direction, "general");
        assert_eq!(profile.confidence_level, "low");
    }

    #[tokio::test]
    async fn test_llm_profile_is_memoised() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(message_body(
                r#"{"top_skills": ["Python", "SQL"], "experience_level": "student",
                    "career_direction": "data", "confidence_level": "high"}"#,
            ))
            .expect(1)
            .create_async()
            .await;

        let profiler = CandidateProfiler::new(Some(client_for(&server)));
        let first = profiler.analyze(&skills(3), "resume").await;
        let second = profiler.analyze(&skills(3), "resume").await;

        assert_eq!(first.career_direction, "data");
        assert_eq!(first, second);
        assert!(first.summary().contains("Top Skills: Python, SQL"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(400)
            .with_body(r#"{"error": {"message": "bad request"}}"#)
            .create_async()
            .await;

        let profiler = CandidateProfiler::new(Some(client_for(&server)));
        let profile = profiler.analyze(&skills(2), "resume").await;
        assert_eq!(profile.confidence_level, "low");
        assert_eq!(profile.top_skills, skills(2));
    }
}
