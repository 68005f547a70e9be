//! SQLite persistence for listings and cache-operation history.

use std::collections::{BTreeMap, HashSet};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use tracing::info;

use crate::jobs::hash::job_hash;
use crate::models::cache::{CacheOperation, DatabaseStats, OperationStatus, UpsertSummary};
use crate::models::job::{Job, ListingMetadata, ScrapedJob};

/// Placeholders per `IN (...)` lookup, below SQLite's bound-parameter limit.
const HASH_CHUNK_SIZE: usize = 500;

const JOB_COLUMNS: &str = "id, job_hash, company, title, location, apply_link, description, \
     required_skills, job_requirements, source, metadata, date_posted, posted_on, \
     first_seen, last_seen, is_active";

#[derive(Debug, FromRow)]
struct JobRow {
    id: i64,
    job_hash: String,
    company: String,
    title: String,
    location: String,
    apply_link: String,
    description: String,
    required_skills: Json<Vec<String>>,
    job_requirements: String,
    source: String,
    metadata: Json<ListingMetadata>,
    date_posted: Option<String>,
    posted_on: Option<NaiveDate>,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
    is_active: bool,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Job {
            id: row.id,
            job_hash: row.job_hash,
            company: row.company,
            title: row.title,
            location: row.location,
            apply_link: row.apply_link,
            description: row.description,
            required_skills: row.required_skills.0,
            job_requirements: row.job_requirements,
            source: row.source,
            metadata: row.metadata.0,
            date_posted: row.date_posted,
            posted_on: row.posted_on,
            first_seen: row.first_seen,
            last_seen: row.last_seen,
            is_active: row.is_active,
        }
    }
}

/// Inserts unseen listings, refreshes `last_seen` on known ones and marks
/// listings not seen within `inactive_after` as inactive. All in one transaction.
pub async fn bulk_upsert_jobs(
    pool: &SqlitePool,
    jobs: &[ScrapedJob],
    inactive_after: Duration,
) -> Result<UpsertSummary> {
    let now = Utc::now();
    let mut summary = UpsertSummary::default();
    let mut tx = pool.begin().await?;

    for job in jobs {
        let hash = job_hash(&job.company, &job.title, &job.location, &job.apply_link);

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM jobs WHERE job_hash = ?1")
            .bind(&hash)
            .fetch_optional(&mut *tx)
            .await?;

        match existing {
            Some(id) => {
                sqlx::query(
                    "UPDATE jobs SET last_seen = ?1, updated_at = ?1, is_active = 1 WHERE id = ?2",
                )
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                summary.updated_jobs += 1;
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO jobs
                        (job_hash, company, title, location, apply_link, description,
                         required_skills, job_requirements, source, metadata, date_posted,
                         posted_on, first_seen, last_seen, created_at, updated_at, is_active)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13, ?13, ?13, 1)
                    "#,
                )
                .bind(&hash)
                .bind(&job.company)
                .bind(&job.title)
                .bind(&job.location)
                .bind(&job.apply_link)
                .bind(&job.description)
                .bind(Json(&job.required_skills))
                .bind(&job.job_requirements)
                .bind(&job.source)
                .bind(Json(&job.metadata))
                .bind(&job.date_posted)
                .bind(job.posted_on)
                .bind(now)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert job {} / {}", job.company, job.title))?;
                summary.new_jobs += 1;
            }
        }
        summary.total_processed += 1;
    }

    let cutoff = now - inactive_after;
    summary.inactive_jobs =
        sqlx::query("UPDATE jobs SET is_active = 0, updated_at = ?1 WHERE is_active = 1 AND last_seen < ?2")
            .bind(now)
            .bind(cutoff)
            .execute(&mut *tx)
            .await?
            .rows_affected();

    tx.commit().await?;

    info!(
        "Upserted {} jobs: {} new, {} updated, {} marked inactive",
        summary.total_processed, summary.new_jobs, summary.updated_jobs, summary.inactive_jobs
    );
    Ok(summary)
}

/// Active jobs, most recently seen first.
pub async fn get_active_jobs(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Job>> {
    let rows: Vec<JobRow> = sqlx::query_as(&format!(
        "SELECT {JOB_COLUMNS} FROM jobs WHERE is_active = 1 \
         ORDER BY last_seen DESC, id DESC LIMIT ?1 OFFSET ?2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .context("Failed to fetch active jobs")?;

    Ok(rows.into_iter().map(Job::from).collect())
}

pub async fn get_job(pool: &SqlitePool, id: i64) -> Result<Option<Job>> {
    let row: Option<JobRow> =
        sqlx::query_as(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(Job::from))
}

/// `now - window`, or an error when the window leaves chrono's range.
fn window_start(window: Option<Duration>) -> Result<DateTime<Utc>> {
    window
        .and_then(|w| Utc::now().checked_sub_signed(w))
        .ok_or_else(|| anyhow!("time window out of range"))
}

/// Active jobs first seen within the last `hours`, newest first.
pub async fn get_new_jobs_since(pool: &SqlitePool, hours: i64) -> Result<Vec<Job>> {
    let since = window_start(Duration::try_hours(hours))?;
    let rows: Vec<JobRow> = sqlx::query_as(&format!(
        "SELECT {JOB_COLUMNS} FROM jobs WHERE is_active = 1 AND first_seen >= ?1 \
         ORDER BY first_seen DESC, id DESC"
    ))
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Job::from).collect())
}

/// The subset of `hashes` already stored.
pub async fn existing_hashes(pool: &SqlitePool, hashes: &[String]) -> Result<HashSet<String>> {
    let mut found = HashSet::new();

    for chunk in hashes.chunks(HASH_CHUNK_SIZE) {
        let mut qb = sqlx::QueryBuilder::new("SELECT job_hash FROM jobs WHERE job_hash IN (");
        let mut separated = qb.separated(", ");
        for hash in chunk {
            separated.push_bind(hash);
        }
        separated.push_unseparated(")");

        let rows: Vec<(String,)> = qb.build_query_as().fetch_all(pool).await?;
        found.extend(rows.into_iter().map(|(hash,)| hash));
    }

    Ok(found)
}

pub async fn get_database_stats(pool: &SqlitePool) -> Result<DatabaseStats> {
    let (total_jobs, active_jobs): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN is_active = 1 THEN 1 ELSE 0 END), 0) FROM jobs",
    )
    .fetch_one(pool)
    .await?;

    let sources: Vec<(String, i64)> = sqlx::query_as(
        "SELECT source, COUNT(*) FROM jobs WHERE is_active = 1 GROUP BY source ORDER BY source",
    )
    .fetch_all(pool)
    .await?;

    let since = Utc::now() - Duration::hours(24);
    let new_jobs_24h: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE first_seen >= ?1")
        .bind(since)
        .fetch_one(pool)
        .await?;

    let latest_cache: Option<CacheOperation> = sqlx::query_as(
        "SELECT id, cache_type, last_updated, job_count, new_jobs_added, status, details \
         FROM cache_metadata ORDER BY last_updated DESC, id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(DatabaseStats {
        total_jobs,
        active_jobs,
        inactive_jobs: total_jobs - active_jobs,
        sources: sources.into_iter().collect::<BTreeMap<_, _>>(),
        new_jobs_24h,
        latest_cache,
    })
}

pub async fn record_cache_operation(
    pool: &SqlitePool,
    cache_type: &str,
    job_count: i64,
    new_jobs_added: i64,
    status: OperationStatus,
    details: &Value,
) -> Result<i64> {
    let id = sqlx::query(
        "INSERT INTO cache_metadata (cache_type, last_updated, job_count, new_jobs_added, status, details) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(cache_type)
    .bind(Utc::now())
    .bind(job_count)
    .bind(new_jobs_added)
    .bind(status.as_str())
    .bind(Json(details))
    .execute(pool)
    .await
    .context("Failed to record cache operation")?
    .last_insert_rowid();

    Ok(id)
}

/// Deletes cache-operation rows older than `days`. Returns the number removed.
pub async fn cleanup_old_metadata(pool: &SqlitePool, days: i64) -> Result<u64> {
    let cutoff = window_start(Duration::try_days(days))?;
    let removed = sqlx::query("DELETE FROM cache_metadata WHERE last_updated < ?1")
        .bind(cutoff)
        .execute(pool)
        .await?
        .rows_affected();

    if removed > 0 {
        info!("Removed {removed} cache metadata rows older than {days} days");
    }
    Ok(removed)
}
