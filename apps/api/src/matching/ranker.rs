use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::llm_client::{prompts::json_system, LlmClient, LlmError};
use crate::matching::prefilter::ScoredJob;
use crate::matching::profile::CandidateProfile;
use crate::matching::prompts::{RANKING_PERSONA, RANKING_PROMPT_TEMPLATE};
use crate::matching::{MatchedJob, RankedBy};

/// Skills listed per job in the ranking prompt.
const PROMPT_SKILLS_PER_JOB: usize = 5;

// ────────────────────────────────────────────
// Trait
// ────────────────────────────────────────────

/// Orders pre-filtered jobs for a candidate and keeps the best `limit`.
#[async_trait]
pub trait JobRanker: Send + Sync {
    async fn rank(
        &self,
        profile: &CandidateProfile,
        candidates: Vec<ScoredJob>,
        limit: usize,
    ) -> Vec<MatchedJob>;
}

// ────────────────────────────────────────────
// Heuristic ranker
// ────────────────────────────────────────────

/// Orders by the combined skill and metadata score.
pub struct HeuristicRanker;

fn heuristic_description(scored: &ScoredJob) -> String {
    let matched: Vec<&str> = scored
        .matched_skills
        .iter()
        .map(|m| m.job_skill.as_str())
        .collect();
    format!(
        "Matched skills: {} ({} of {})\n{}",
        matched.join(", "),
        matched.len(),
        scored.job.required_skills.len(),
        scored.metadata_description
    )
}

fn heuristic_match(scored: ScoredJob) -> MatchedJob {
    MatchedJob {
        match_score: scored.combined_score,
        match_description: heuristic_description(&scored),
        skill_score: scored.skill_score,
        metadata_score: scored.metadata_score,
        matched_skills: scored.matched_skills,
        job: scored.job,
        ranked_by: RankedBy::Heuristic,
    }
}

impl HeuristicRanker {
    pub fn rank_sync(candidates: Vec<ScoredJob>, limit: usize) -> Vec<MatchedJob> {
        let mut matches: Vec<MatchedJob> = candidates.into_iter().map(heuristic_match).collect();
        matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        matches.truncate(limit);
        matches
    }
}

#[async_trait]
impl JobRanker for HeuristicRanker {
    async fn rank(
        &self,
        _profile: &CandidateProfile,
        candidates: Vec<ScoredJob>,
        limit: usize,
    ) -> Vec<MatchedJob> {
        Self::rank_sync(candidates, limit)
    }
}

// ────────────────────────────────────────────
// LLM ranker
// ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RankingResponse {
    #[serde(default)]
    rankings: Vec<Ranking>,
    #[serde(default)]
    overall_analysis: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Ranking {
    job_index: Option<i64>,
    #[serde(default)]
    compatibility_score: f64,
    reasoning: Option<String>,
    growth_potential: Option<String>,
    skill_development: Option<String>,
    career_impact: Option<String>,
}

impl Ranking {
    fn describe(&self, score: u32, location: &str) -> String {
        let location = if location.trim().is_empty() {
            "Not specified"
        } else {
            location
        };
        format!(
            "Compatibility Score: {score}/100\n\nWhy This Role Fits You:\n{}\n\n\
             Growth Opportunities:\n- Skill Development: {}\n- Career Impact: {}\n\
             - Growth Potential: {}\n\nLocation: {location}",
            self.reasoning.as_deref().unwrap_or("Good skill alignment"),
            self.skill_development.as_deref().unwrap_or("Various technical skills"),
            self.career_impact.as_deref().unwrap_or("Valuable experience"),
            self.growth_potential.as_deref().unwrap_or("Good"),
        )
    }
}

/// Numbered job lines, 1-based, the way the ranking prompt refers to them.
fn job_lines(candidates: &[ScoredJob]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            let job = &scored.job;
            let mut line = format!("{}. {} - {}", i + 1, job.company, job.title);
            if !job.required_skills.is_empty() {
                let skills: Vec<&str> = job
                    .required_skills
                    .iter()
                    .take(PROMPT_SKILLS_PER_JOB)
                    .map(String::as_str)
                    .collect();
                line.push_str(&format!(" | Skills: {}", skills.join(", ")));
            }
            if !job.location.is_empty() {
                line.push_str(&format!(" | Location: {}", job.location));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Maps 1-based rankings back onto candidates. Out-of-range and repeated
/// indices are dropped; the rest is sorted by compatibility score.
fn apply_rankings(
    rankings: Vec<Ranking>,
    candidates: Vec<ScoredJob>,
    limit: usize,
) -> Vec<MatchedJob> {
    let mut slots: Vec<Option<ScoredJob>> = candidates.into_iter().map(Some).collect();
    let mut seen = HashSet::new();
    let mut matches = Vec::new();

    for ranking in rankings {
        if matches.len() == limit {
            break;
        }
        let Some(index) = ranking
            .job_index
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| i.checked_sub(1))
            .filter(|i| *i < slots.len())
        else {
            continue;
        };
        if !seen.insert(index) {
            continue;
        }
        let Some(scored) = slots[index].take() else {
            continue;
        };

        let score = ranking.compatibility_score.clamp(0.0, 100.0).round() as u32;
        matches.push(MatchedJob {
            match_score: score,
            match_description: ranking.describe(score, &scored.job.location),
            skill_score: scored.skill_score,
            metadata_score: scored.metadata_score,
            matched_skills: scored.matched_skills,
            job: scored.job,
            ranked_by: RankedBy::Llm,
        });
    }

    matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    matches
}

/// Deep ranking by the LLM, falling back to [`HeuristicRanker`] when the
/// call fails or yields no usable ranking.
pub struct LlmJobRanker {
    llm: LlmClient,
}

impl LlmJobRanker {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    async fn ask(
        &self,
        profile: &CandidateProfile,
        candidates: &[ScoredJob],
        limit: usize,
    ) -> Result<RankingResponse, LlmError> {
        let prompt = RANKING_PROMPT_TEMPLATE
            .replace("{candidate}", &profile.summary())
            .replace("{jobs}", &job_lines(candidates))
            .replace("{limit}", &limit.to_string());
        self.llm
            .call_json(&prompt, &json_system(RANKING_PERSONA))
            .await
    }
}

#[async_trait]
impl JobRanker for LlmJobRanker {
    async fn rank(
        &self,
        profile: &CandidateProfile,
        candidates: Vec<ScoredJob>,
        limit: usize,
    ) -> Vec<MatchedJob> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let response = match self.ask(profile, &candidates, limit).await {
            Ok(response) => response,
            Err(e) => {
                warn!("LLM ranking failed, using heuristic ranking: {e}");
                return HeuristicRanker::rank_sync(candidates, limit);
            }
        };

        if let Some(analysis) = &response.overall_analysis {
            info!("LLM ranking analysis: {analysis}");
        }

        if !response.rankings.iter().any(|r| {
            r.job_index
                .is_some_and(|i| i >= 1 && (i as usize) <= candidates.len())
        }) {
            warn!("LLM ranking referenced no listed job, using heuristic ranking");
            return HeuristicRanker::rank_sync(candidates, limit);
        }

        let matches = apply_rankings(response.rankings, candidates, limit);
        info!("LLM ranked {} jobs", matches.len());
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::test_support::{client_for, message_body};
    use crate::matching::prefilter::score_job;
    use crate::models::job::test_support::job;
    use crate::models::resume::ResumeMetadata;

    fn candidates() -> Vec<ScoredJob> {
        let resume = vec!["Python".to_string(), "SQL".to_string()];
        vec![
            score_job(job(1, "Acme", "Data Intern", &["Python", "SQL"]), &resume, &ResumeMetadata::default()),
            score_job(job(2, "Beta", "Backend Intern", &["Python", "Go"]), &resume, &ResumeMetadata::default()),
            score_job(job(3, "Gamma", "Platform Intern", &["Python", "Go", "Rust", "C"]), &resume, &ResumeMetadata::default()),
        ]
    }

    fn ranking(index: i64, score: f64) -> Ranking {
        Ranking {
            job_index: Some(index),
            compatibility_score: score,
            reasoning: Some("Fits".to_string()),
            growth_potential: None,
            skill_development: None,
            career_impact: None,
        }
    }

    #[tokio::test]
    async fn test_heuristic_orders_by_combined_score_and_limits() {
        let matches = HeuristicRanker
            .rank(&CandidateProfile::default(), candidates(), 2)
            .await;

        let ids: Vec<i64> = matches.iter().map(|m| m.job.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(matches.iter().all(|m| m.ranked_by == RankedBy::Heuristic));
        assert!(matches[0].match_description.starts_with("Matched skills: Python, SQL (2 of 2)"));
    }

    #[test]
    fn test_job_lines_are_one_based() {
        let lines = job_lines(&candidates());
        assert!(lines.starts_with("1. Acme - Data Intern | Skills: Python, SQL | Location: New York, NY"));
        assert!(lines.contains("\n3. Gamma - Platform Intern"));
    }

    #[test]
    fn test_apply_rankings_maps_indices_and_drops_bad_ones() {
        let rankings = vec![
            ranking(2, 70.0),
            ranking(0, 99.0),
            ranking(7, 99.0),
            ranking(2, 60.0),
            ranking(1, 91.4),
        ];
        let matches = apply_rankings(rankings, candidates(), 10);

        let ids: Vec<i64> = matches.iter().map(|m| m.job.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(matches[0].match_score, 91);
        assert!(matches[0].match_description.starts_with("Compatibility Score: 91/100"));
        assert!(matches[0].match_description.ends_with("Location: New York, NY"));
        assert_eq!(matches[0].ranked_by, RankedBy::Llm);
    }

    #[tokio::test]
    async fn test_llm_ranker_uses_model_order() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(message_body(
                r#"{"rankings": [
                    {"job_index": 3, "compatibility_score": 88, "reasoning": "Growth"},
                    {"job_index": 1, "compatibility_score": 80}
                ], "overall_analysis": "Backend leaning"}"#,
            ))
            .create_async()
            .await;

        let ranker = LlmJobRanker::new(client_for(&server));
        let matches = ranker.rank(&CandidateProfile::default(), candidates(), 5).await;

        let ids: Vec<i64> = matches.iter().map(|m| m.job.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(matches[0].match_score, 88);
    }

    #[tokio::test]
    async fn test_llm_ranker_falls_back_on_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_body(r#"{"error": {"message": "invalid key"}}"#)
            .create_async()
            .await;

        let ranker = LlmJobRanker::new(client_for(&server));
        let matches = ranker.rank(&CandidateProfile::default(), candidates(), 5).await;

        assert_eq!(matches.len(), 3);
        assert!(matches.iter().all(|m| m.ranked_by == RankedBy::Heuristic));
    }
}
