//! Skill inference, extraction and matching shared by listings, resumes and ranking.

pub mod extractor;
pub mod inference;
pub mod prompts;
pub mod similarity;

pub use extractor::JobSkillExtractor;
pub use similarity::{match_skills, SkillMatch, DEFAULT_MATCH_THRESHOLD};
