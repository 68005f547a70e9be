//! Listing refresh: scrape, store, and the background schedule driving it.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::jobs::cache::JobCache;
use crate::jobs::repository;
use crate::listings::{ListingScraper, ScrapeMode, ScrapeOptions};
use crate::models::cache::StoreSummary;

const CLEANUP_EVERY: Duration = Duration::from_secs(7 * 24 * 3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Manual,
    Scheduled,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub success: bool,
    pub mode: ScrapeMode,
    pub cache_type: &'static str,
    pub jobs_found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreSummary>,
    pub message: String,
}

fn cache_type(mode: ScrapeMode, trigger: RefreshTrigger) -> &'static str {
    match (trigger, mode) {
        (RefreshTrigger::Scheduled, _) => "scheduled",
        (RefreshTrigger::Manual, ScrapeMode::Full) => "full_manual",
        (RefreshTrigger::Manual, ScrapeMode::Incremental) => "incremental_manual",
        (RefreshTrigger::Manual, ScrapeMode::Smart) => "manual_refresh",
    }
}

pub struct RefreshService {
    cache: Arc<JobCache>,
    scraper: Arc<ListingScraper>,
}

impl RefreshService {
    pub fn new(cache: Arc<JobCache>, scraper: Arc<ListingScraper>) -> Self {
        Self { cache, scraper }
    }

    pub fn cache(&self) -> &JobCache {
        &self.cache
    }

    /// Scrapes with `options` and stores whatever came back.
    /// A full refresh drops the Redis copy first.
    pub async fn refresh(&self, options: ScrapeOptions, trigger: RefreshTrigger) -> RefreshReport {
        let cache_type = cache_type(options.mode, trigger);
        info!("Refreshing listings ({cache_type}, max_days={:?})", options.max_days);

        if options.mode == ScrapeMode::Full {
            self.cache.clear().await;
        }

        let jobs = self.scraper.scrape(options, self.cache.as_ref()).await;
        if jobs.is_empty() {
            let message = match options.mode {
                ScrapeMode::Full => "No jobs found during scrape".to_string(),
                _ => "No new jobs found".to_string(),
            };
            warn!("{message}");
            return RefreshReport {
                success: options.mode != ScrapeMode::Full,
                mode: options.mode,
                cache_type,
                jobs_found: 0,
                store: None,
                message,
            };
        }

        let store = self.cache.set_cached_jobs(&jobs, cache_type).await;
        RefreshReport {
            success: store.database_success || store.redis_success,
            mode: options.mode,
            cache_type,
            jobs_found: jobs.len(),
            message: format!(
                "Stored {} jobs: {} new, {} updated",
                jobs.len(),
                store.new_jobs,
                store.updated_jobs
            ),
            store: Some(store),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RefreshSchedule {
    pub every: Duration,
    pub metadata_retention_days: i64,
}

/// Runs a smart refresh immediately and then every `schedule.every`, and
/// purges old cache metadata once a week, until `shutdown` flips to true.
pub async fn refresh_scheduler(
    service: Arc<RefreshService>,
    schedule: RefreshSchedule,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut refresh_interval = interval(schedule.every);
    refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut cleanup_interval = interval_at(Instant::now() + CLEANUP_EVERY, CLEANUP_EVERY);
    cleanup_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        "Background refresh started: every {}h, metadata kept {} days",
        schedule.every.as_secs() / 3600,
        schedule.metadata_retention_days
    );

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("Background refresh shutting down");
                    break;
                }
            }

            _ = refresh_interval.tick() => {
                let report = service
                    .refresh(ScrapeOptions::default(), RefreshTrigger::Scheduled)
                    .await;
                info!("Scheduled refresh finished: {}", report.message);
            }

            _ = cleanup_interval.tick() => {
                let pool = service.cache().pool();
                if let Err(e) =
                    repository::cleanup_old_metadata(pool, schedule.metadata_retention_days).await
                {
                    error!("Cache metadata cleanup failed: {e:#}");
                }
            }
        }
    }
}
