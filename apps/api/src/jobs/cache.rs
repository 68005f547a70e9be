//! Hybrid listing cache: Redis for fast reads with a TTL, SQLite as the
//! persistent store. Redis problems are logged and never fail a call.

use std::collections::HashSet;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::jobs::hash::job_hash;
use crate::jobs::repository;
use crate::listings::KnownListings;
use crate::models::cache::{
    CacheInfo, DatabaseInfo, HybridInfo, HybridStatus, OperationStatus, RedisInfo, RedisStatus,
    StoreSummary,
};
use crate::models::job::{Job, ScrapedJob};

pub const JOBS_KEY: &str = "internship_jobs_cache";
pub const LAST_SCRAPE_KEY: &str = "last_scrape_time";

const REDIS_CONNECT_TIMEOUT: StdDuration = StdDuration::from_secs(2);
const ALL_ROWS: i64 = i64::MAX;

#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub ttl_hours: u64,
    pub full_scrape_after_hours: i64,
    pub inactive_after_days: i64,
}

impl From<&Config> for CacheSettings {
    fn from(config: &Config) -> Self {
        Self {
            ttl_hours: config.cache_ttl_hours,
            full_scrape_after_hours: config.full_scrape_after_hours,
            inactive_after_days: config.inactive_after_days,
        }
    }
}

pub struct JobCache {
    pool: SqlitePool,
    redis: Option<redis::Client>,
    settings: CacheSettings,
}

impl JobCache {
    pub fn new(pool: SqlitePool, redis: Option<redis::Client>, settings: CacheSettings) -> Self {
        Self {
            pool,
            redis,
            settings,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn redis_conn(&self) -> Option<MultiplexedConnection> {
        let client = self.redis.as_ref()?;
        match tokio::time::timeout(REDIS_CONNECT_TIMEOUT, client.get_multiplexed_async_connection())
            .await
        {
            Ok(Ok(conn)) => Some(conn),
            Ok(Err(e)) => {
                debug!("Redis unavailable: {e}");
                None
            }
            Err(_) => {
                debug!("Redis connection timed out");
                None
            }
        }
    }

    async fn write_redis_jobs(&self, conn: &mut MultiplexedConnection, jobs: &[Job]) -> bool {
        let payload = match serde_json::to_string(jobs) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to serialise jobs for Redis: {e}");
                return false;
            }
        };

        let ttl_seconds = self.settings.ttl_hours * 3600;
        match conn.set_ex::<_, _, ()>(JOBS_KEY, payload, ttl_seconds).await {
            Ok(()) => {
                debug!("Cached {} jobs in Redis for {}h", jobs.len(), self.settings.ttl_hours);
                true
            }
            Err(e) => {
                warn!("Failed to write jobs to Redis: {e}");
                false
            }
        }
    }

    /// Redis first, then SQLite (warming Redis). `None` when nothing is stored.
    pub async fn get_cached_jobs(&self) -> Option<Vec<Job>> {
        let mut conn = self.redis_conn().await;

        if let Some(conn) = conn.as_mut() {
            match conn.get::<_, Option<String>>(JOBS_KEY).await {
                Ok(Some(raw)) => match serde_json::from_str::<Vec<Job>>(&raw) {
                    Ok(jobs) => {
                        info!("Retrieved {} jobs from Redis cache", jobs.len());
                        return Some(jobs);
                    }
                    Err(e) => {
                        warn!("Corrupt Redis cache entry, deleting: {e}");
                        if let Err(e) = conn.del::<_, ()>(JOBS_KEY).await {
                            warn!("Failed to delete corrupt Redis entry: {e}");
                        }
                    }
                },
                Ok(None) => debug!("Redis cache miss"),
                Err(e) => warn!("Redis read failed, falling back to database: {e}"),
            }
        }

        let jobs = match repository::get_active_jobs(&self.pool, ALL_ROWS, 0).await {
            Ok(jobs) => jobs,
            Err(e) => {
                error!("Failed to read jobs from database: {e:#}");
                return None;
            }
        };
        if jobs.is_empty() {
            return None;
        }

        info!("Retrieved {} jobs from database", jobs.len());
        if let Some(conn) = conn.as_mut() {
            self.write_redis_jobs(conn, &jobs).await;
        }
        Some(jobs)
    }

    /// Up to `limit` cached jobs, or all when `limit` is `None`.
    pub async fn jobs_for_matching(&self, limit: Option<usize>) -> Vec<Job> {
        let mut jobs = self.get_cached_jobs().await.unwrap_or_default();
        if let Some(limit) = limit {
            jobs.truncate(limit);
        }
        jobs
    }

    /// Upserts into SQLite, records the operation, then refreshes Redis
    /// from the active rows.
    pub async fn set_cached_jobs(&self, jobs: &[ScrapedJob], cache_type: &str) -> StoreSummary {
        let mut summary = StoreSummary {
            total_jobs: jobs.len(),
            ..Default::default()
        };

        let inactive_after = Duration::days(self.settings.inactive_after_days);
        let upsert = match repository::bulk_upsert_jobs(&self.pool, jobs, inactive_after).await {
            Ok(upsert) => {
                summary.database_success = true;
                summary.new_jobs = upsert.new_jobs;
                summary.updated_jobs = upsert.updated_jobs;
                Ok(upsert)
            }
            Err(e) => {
                error!("Database upsert failed: {e:#}");
                Err(format!("{e:#}"))
            }
        };

        if let Some(mut conn) = self.redis_conn().await {
            if summary.database_success {
                match repository::get_active_jobs(&self.pool, ALL_ROWS, 0).await {
                    Ok(active) => {
                        summary.redis_success = self.write_redis_jobs(&mut conn, &active).await
                    }
                    Err(e) => error!("Failed to reload active jobs for Redis: {e:#}"),
                }
            }
            if summary.redis_success {
                let now = Utc::now().to_rfc3339();
                if let Err(e) = conn.set::<_, _, ()>(LAST_SCRAPE_KEY, now).await {
                    warn!("Failed to record last scrape time: {e}");
                }
            }
        }

        let status = match (summary.database_success, summary.redis_success) {
            (true, true) => OperationStatus::Success,
            (false, false) => OperationStatus::Failed,
            _ => OperationStatus::Partial,
        };

        let details = match &upsert {
            Ok(upsert) => json!({
                "redis_success": summary.redis_success,
                "updated_jobs": upsert.updated_jobs,
                "inactive_jobs": upsert.inactive_jobs,
            }),
            Err(message) => json!({
                "redis_success": summary.redis_success,
                "error": message,
            }),
        };
        if let Err(e) = repository::record_cache_operation(
            &self.pool,
            cache_type,
            jobs.len() as i64,
            summary.new_jobs as i64,
            status,
            &details,
        )
        .await
        {
            warn!("Failed to record cache operation: {e:#}");
        }

        info!(
            "Stored {} jobs ({cache_type}): status {}, {} new, {} updated",
            summary.total_jobs,
            status.as_str(),
            summary.new_jobs,
            summary.updated_jobs
        );
        summary
    }

    pub async fn cache_info(&self) -> CacheInfo {
        let redis = self.redis_info().await;

        let database = match repository::get_database_stats(&self.pool).await {
            Ok(stats) => DatabaseInfo {
                status: "active".to_string(),
                message: format!("{} active jobs in database", stats.active_jobs),
                stats: Some(stats),
            },
            Err(e) => DatabaseInfo {
                status: "error".to_string(),
                stats: None,
                message: format!("Database error: {e}"),
            },
        };

        let redis_ok = matches!(redis.status, RedisStatus::Active | RedisStatus::Empty);
        let database_ok = database.stats.is_some();
        let status = match (redis_ok, database_ok) {
            (true, true) => HybridStatus::Optimal,
            (false, true) => HybridStatus::DatabaseOnly,
            (true, false) => HybridStatus::RedisOnly,
            (false, false) => HybridStatus::Unavailable,
        };

        CacheInfo {
            redis,
            database,
            hybrid: HybridInfo {
                status,
                message: status.message().to_string(),
            },
        }
    }

    async fn redis_info(&self) -> RedisInfo {
        let unavailable = || RedisInfo {
            status: RedisStatus::Unavailable,
            job_count: None,
            ttl_seconds: None,
            hours_remaining: None,
            message: "Redis not available".to_string(),
        };
        let Some(mut conn) = self.redis_conn().await else {
            return unavailable();
        };

        let raw = match conn.get::<_, Option<String>>(JOBS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                return RedisInfo {
                    status: RedisStatus::Empty,
                    job_count: None,
                    ttl_seconds: None,
                    hours_remaining: None,
                    message: "No cached jobs in Redis".to_string(),
                }
            }
            Err(e) => {
                return RedisInfo {
                    message: format!("Redis error: {e}"),
                    status: RedisStatus::Error,
                    ..unavailable()
                }
            }
        };

        let ttl: i64 = conn.ttl(JOBS_KEY).await.unwrap_or(-1);
        match serde_json::from_str::<Vec<Job>>(&raw) {
            Ok(jobs) => RedisInfo {
                status: RedisStatus::Active,
                job_count: Some(jobs.len()),
                ttl_seconds: Some(ttl),
                hours_remaining: (ttl > 0).then(|| (ttl as f64 / 3600.0 * 100.0).round() / 100.0),
                message: format!("{} jobs cached in Redis", jobs.len()),
            },
            Err(e) => RedisInfo {
                message: format!("Corrupt Redis cache entry: {e}"),
                status: RedisStatus::Error,
                ..unavailable()
            },
        }
    }

    /// Removes the Redis keys. SQLite is left untouched.
    pub async fn clear(&self) -> bool {
        let Some(mut conn) = self.redis_conn().await else {
            warn!("Cannot clear cache: Redis not available");
            return false;
        };
        match conn.del::<_, i64>(vec![JOBS_KEY, LAST_SCRAPE_KEY]).await {
            Ok(removed) => {
                info!("Cleared {removed} Redis cache keys");
                true
            }
            Err(e) => {
                warn!("Failed to clear Redis cache: {e}");
                false
            }
        }
    }

    async fn last_scrape(&self, conn: &mut MultiplexedConnection) -> LastScrape {
        let raw: Option<String> = match conn.get(LAST_SCRAPE_KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read last scrape time: {e}");
                return LastScrape::Unreadable;
            }
        };
        match raw {
            None => LastScrape::Never,
            Some(raw) => match DateTime::parse_from_rfc3339(&raw) {
                Ok(t) => LastScrape::At(t.with_timezone(&Utc)),
                Err(e) => {
                    warn!("Unparsable last scrape time '{raw}': {e}");
                    LastScrape::Unreadable
                }
            },
        }
    }
}

/// What Redis knows about the last successful store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastScrape {
    Never,
    At(DateTime<Utc>),
    Unreadable,
}

/// Only a missing or stale scrape clock forces a full scrape; an unreadable
/// one keeps the incremental path.
fn incremental_allowed(last: LastScrape, now: DateTime<Utc>, full_after_hours: i64) -> bool {
    match last {
        LastScrape::Unreadable => true,
        LastScrape::Never => {
            info!("No previous scrape recorded, doing a full scrape");
            false
        }
        LastScrape::At(at) => {
            let age = now - at;
            let stale = Duration::try_hours(full_after_hours).map_or(false, |limit| age > limit);
            if stale {
                info!("Last scrape was {}h ago, doing a full scrape", age.num_hours());
            }
            !stale
        }
    }
}

#[async_trait]
impl KnownListings for JobCache {
    /// Incremental unless the last full scrape is missing or too old.
    /// Without Redis there is no scrape clock, so incremental is assumed.
    async fn should_do_incremental(&self) -> bool {
        let Some(mut conn) = self.redis_conn().await else {
            return true;
        };
        let last = self.last_scrape(&mut conn).await;
        incremental_allowed(last, Utc::now(), self.settings.full_scrape_after_hours)
    }

    async fn filter_new_jobs(&self, jobs: Vec<ScrapedJob>) -> anyhow::Result<Vec<ScrapedJob>> {
        let mut seen = HashSet::new();
        let hashed: Vec<(String, ScrapedJob)> = jobs
            .into_iter()
            .map(|job| {
                let hash = job_hash(&job.company, &job.title, &job.location, &job.apply_link);
                (hash, job)
            })
            .filter(|(hash, _)| seen.insert(hash.clone()))
            .collect();

        let hashes: Vec<String> = hashed.iter().map(|(hash, _)| hash.clone()).collect();
        let existing = repository::existing_hashes(&self.pool, &hashes).await?;

        Ok(hashed
            .into_iter()
            .filter(|(hash, _)| !existing.contains(hash))
            .map(|(_, job)| job)
            .collect())
    }
}
