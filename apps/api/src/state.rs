use std::sync::Arc;

use crate::config::Config;
use crate::jobs::cache::JobCache;
use crate::jobs::refresh::RefreshService;
use crate::matching::MatchPipeline;
use crate::resume::ResumeParser;
use crate::skills::JobSkillExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Hybrid Redis/SQLite listing cache.
    pub cache: Arc<JobCache>,
    pub refresher: Arc<RefreshService>,
    /// Shared with the scraper so page-detail lookups hit the same memo.
    pub skills: Arc<JobSkillExtractor>,
    pub resume_parser: Arc<ResumeParser>,
    pub matcher: Arc<MatchPipeline>,
}
