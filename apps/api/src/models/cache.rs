use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Success,
    Partial,
    Failed,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Success => "success",
            OperationStatus::Partial => "partial",
            OperationStatus::Failed => "failed",
        }
    }
}

/// One row of `cache_metadata`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CacheOperation {
    pub id: i64,
    pub cache_type: String,
    pub last_updated: DateTime<Utc>,
    pub job_count: i64,
    pub new_jobs_added: i64,
    pub status: String,
    pub details: Json<Value>,
}

/// Outcome of a bulk upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UpsertSummary {
    pub new_jobs: u64,
    pub updated_jobs: u64,
    pub inactive_jobs: u64,
    pub total_processed: u64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct DatabaseStats {
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub inactive_jobs: i64,
    /// Active jobs per source.
    pub sources: BTreeMap<String, i64>,
    pub new_jobs_24h: i64,
    pub latest_cache: Option<CacheOperation>,
}

/// Result of writing a batch through the hybrid cache.
#[derive(Debug, Clone, Serialize, Default)]
pub struct StoreSummary {
    pub database_success: bool,
    pub redis_success: bool,
    pub new_jobs: u64,
    pub updated_jobs: u64,
    pub total_jobs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedisStatus {
    Active,
    Empty,
    Unavailable,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedisInfo {
    pub status: RedisStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_remaining: Option<f64>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseInfo {
    /// `active` or `error`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<DatabaseStats>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HybridStatus {
    Optimal,
    DatabaseOnly,
    RedisOnly,
    Unavailable,
}

impl HybridStatus {
    pub fn message(&self) -> &'static str {
        match self {
            HybridStatus::Optimal => "Both Redis and Database available",
            HybridStatus::DatabaseOnly => "Database available, Redis unavailable",
            HybridStatus::RedisOnly => "Redis available, Database unavailable",
            HybridStatus::Unavailable => "Both Redis and Database unavailable",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HybridInfo {
    pub status: HybridStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheInfo {
    pub redis: RedisInfo,
    pub database: DatabaseInfo,
    pub hybrid: HybridInfo,
}
