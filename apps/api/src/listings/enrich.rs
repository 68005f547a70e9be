use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::models::job::ScrapedJob;
use crate::skills::JobSkillExtractor;

/// Concurrent skill extractions per batch.
const ENRICH_CONCURRENCY: usize = 8;

pub const DEFAULT_JOB_SKILLS: &[&str] = &["Programming", "Software Development"];

/// Attaches `required_skills` to every listing, preserving order.
pub async fn enrich_skills(
    mut jobs: Vec<ScrapedJob>,
    extractor: Arc<JobSkillExtractor>,
) -> Vec<ScrapedJob> {
    let semaphore = Arc::new(Semaphore::new(ENRICH_CONCURRENCY));
    let mut tasks = JoinSet::new();

    for (idx, job) in jobs.iter().enumerate() {
        let extractor = Arc::clone(&extractor);
        let semaphore = Arc::clone(&semaphore);
        let (title, description, company) =
            (job.title.clone(), job.description.clone(), job.company.clone());

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let skills = extractor
                .skills_for_listing(&title, &description, &company)
                .await;
            (idx, skills)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, skills)) => jobs[idx].required_skills = skills,
            Err(e) => warn!("Skill extraction task failed: {e}"),
        }
    }

    for job in jobs.iter_mut().filter(|j| j.required_skills.is_empty()) {
        job.required_skills = DEFAULT_JOB_SKILLS.iter().map(|s| s.to_string()).collect();
    }

    info!("Attached skills to {} listings", jobs.len());
    jobs
}
