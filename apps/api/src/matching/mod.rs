//! Resume-to-job matching: heuristic pre-filter, candidate profiling and ranking.

pub mod events;
pub mod handlers;
pub mod metadata;
pub mod pipeline;
pub mod prefilter;
pub mod profile;
pub mod prompts;
pub mod ranker;

use serde::Serialize;

use crate::models::job::Job;
use crate::skills::SkillMatch;

pub use pipeline::{MatchOutcome, MatchPipeline};
pub use ranker::{HeuristicRanker, JobRanker, LlmJobRanker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankedBy {
    Llm,
    Heuristic,
}

/// A job recommended for a resume.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedJob {
    #[serde(flatten)]
    pub job: Job,
    /// 0 to 100.
    pub match_score: u32,
    pub skill_score: u32,
    pub metadata_score: u32,
    pub matched_skills: Vec<SkillMatch>,
    pub match_description: String,
    pub ranked_by: RankedBy,
}
