use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::jobs::cache::JobCache;
use crate::listings::dates::filter_jobs_by_date;
use crate::matching::events::{EventSink, MatchEvent, MatchStage};
use crate::matching::prefilter::prefilter;
use crate::matching::profile::CandidateProfiler;
use crate::matching::ranker::JobRanker;
use crate::matching::{MatchedJob, RankedBy};
use crate::models::resume::ParsedResume;
use crate::resume::upload::ResumeUpload;
use crate::resume::ResumeParser;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MatchOptions {
    /// Only jobs posted within this many days; unknown ages are kept.
    pub max_days: Option<i64>,
    /// Number of matches wanted, capped at the configured match limit.
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MatchOutcome {
    pub resume: ParsedResume,
    pub matches: Vec<MatchedJob>,
    /// Jobs considered after the date filter.
    pub total_candidates: usize,
    pub ranked_by: RankedBy,
}

pub struct MatchPipeline {
    cache: Arc<JobCache>,
    parser: Arc<ResumeParser>,
    profiler: CandidateProfiler,
    ranker: Arc<dyn JobRanker>,
    prefilter_limit: usize,
    match_limit: usize,
}

impl MatchPipeline {
    pub fn new(
        cache: Arc<JobCache>,
        parser: Arc<ResumeParser>,
        profiler: CandidateProfiler,
        ranker: Arc<dyn JobRanker>,
        prefilter_limit: usize,
        match_limit: usize,
    ) -> Self {
        Self {
            cache,
            parser,
            profiler,
            ranker,
            prefilter_limit,
            match_limit,
        }
    }

    /// Parses the upload, then runs the match. Parse failures are also
    /// reported to the sink as an `error` event.
    pub async fn match_upload(
        &self,
        upload: &ResumeUpload,
        sink: &EventSink,
    ) -> Result<MatchOutcome, AppError> {
        sink.emit(MatchEvent::stage(MatchStage::ParsingResume, "Reading your resume"))
            .await;

        let resume = match self.parser.parse(upload).await {
            Ok(resume) => resume,
            Err(e) => {
                let err = AppError::from(e);
                sink.emit(MatchEvent::Error {
                    message: err.public_message(),
                })
                .await;
                return Err(err);
            }
        };

        let options = MatchOptions {
            max_days: upload.max_days,
            limit: upload.limit,
        };
        Ok(self.run(resume, options, sink).await)
    }

    /// load → date filter → pre-filter → profile → rank.
    pub async fn run(&self, resume: ParsedResume, options: MatchOptions, sink: &EventSink) -> MatchOutcome {
        let limit = options
            .limit
            .unwrap_or(self.match_limit)
            .clamp(1, self.match_limit.max(1));

        sink.emit(MatchEvent::stage(MatchStage::LoadingJobs, "Loading internship listings"))
            .await;
        let jobs = self.cache.jobs_for_matching(None).await;
        let jobs = filter_jobs_by_date(jobs, options.max_days, Utc::now().date_naive());
        let total_candidates = jobs.len();
        sink.emit(MatchEvent::JobsLoaded {
            count: total_candidates,
        })
        .await;

        sink.emit(MatchEvent::stage(
            MatchStage::Prefiltering,
            "Scoring listings against your skills",
        ))
        .await;
        let candidates = prefilter(
            jobs,
            &resume.skills,
            &resume.metadata,
            self.prefilter_limit.max(limit),
        );
        sink.emit(MatchEvent::Prefiltered {
            count: candidates.len(),
        })
        .await;

        let matches = if candidates.is_empty() {
            Vec::new()
        } else {
            sink.emit(MatchEvent::stage(MatchStage::Profiling, "Analyzing your profile"))
                .await;
            let profile = self.profiler.analyze(&resume.skills, &resume.text).await;

            sink.emit(MatchEvent::stage(MatchStage::Ranking, "Ranking the best fits"))
                .await;
            self.ranker.rank(&profile, candidates, limit).await
        };

        let ranked_by = if matches.iter().any(|m| m.ranked_by == RankedBy::Llm) {
            RankedBy::Llm
        } else {
            RankedBy::Heuristic
        };

        for (i, matched) in matches.iter().enumerate() {
            sink.emit(MatchEvent::Match {
                rank: i + 1,
                job: Box::new(matched.clone()),
            })
            .await;
        }
        sink.emit(MatchEvent::Done {
            total: matches.len(),
            ranked_by,
        })
        .await;

        info!(
            "Matched '{}': {} candidates, {} matches ({:?})",
            resume.filename,
            total_candidates,
            matches.len(),
            ranked_by
        );

        MatchOutcome {
            resume,
            matches,
            total_candidates,
            ranked_by,
        }
    }
}
