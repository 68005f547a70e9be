use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

use anyhow::{ensure, Context, Result};

/// Raw README of the community-maintained internship list.
pub const DEFAULT_LISTINGS_URL: &str =
    "https://raw.githubusercontent.com/SimplifyJobs/Summer2026-Internships/dev/README.md";

const HOURS_PER_YEAR: u64 = 24 * 365;

/// Application configuration loaded from environment variables.
/// Every key has a default; malformed values fail startup with the key name.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    /// Unset disables every LLM call; heuristic fallbacks take over.
    pub anthropic_api_key: Option<String>,
    /// Messages-compatible endpoint override (proxies, gateways).
    pub anthropic_api_url: Option<String>,
    pub listings_url: String,
    pub cache_ttl_hours: u64,
    pub full_scrape_after_hours: i64,
    pub inactive_after_days: i64,
    pub metadata_retention_days: i64,
    pub enable_background_refresh: bool,
    pub refresh_interval_hours: u64,
    pub max_scrape_results: usize,
    pub enable_llm_job_skills: bool,
    pub enable_llm_ranking: bool,
    pub prefilter_limit: usize,
    pub match_limit: usize,
    pub max_upload_bytes: usize,
    /// Unset disables resume archival.
    pub s3_bucket: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_region: String,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let optional = |key: &str| -> Option<String> {
            lookup(key).filter(|v| !v.trim().is_empty())
        };

        Ok(Config {
            database_url: text("DATABASE_URL", "sqlite://jobs.db?mode=rwc"),
            redis_url: text("REDIS_URL", "redis://127.0.0.1:6379"),
            anthropic_api_key: optional("ANTHROPIC_API_KEY"),
            anthropic_api_url: optional("ANTHROPIC_API_URL"),
            listings_url: text("LISTINGS_URL", DEFAULT_LISTINGS_URL),
            cache_ttl_hours: parse_in(&lookup, "CACHE_TTL_HOURS", 4, 1..=HOURS_PER_YEAR)?,
            full_scrape_after_hours: parse_in(
                &lookup,
                "FULL_SCRAPE_AFTER_HOURS",
                24,
                1..=HOURS_PER_YEAR as i64,
            )?,
            inactive_after_days: parse_in(&lookup, "INACTIVE_AFTER_DAYS", 3, 1..=3650)?,
            metadata_retention_days: parse_in(&lookup, "METADATA_RETENTION_DAYS", 30, 1..=3650)?,
            enable_background_refresh: parse_or(&lookup, "ENABLE_BACKGROUND_REFRESH", true)?,
            refresh_interval_hours: parse_in(
                &lookup,
                "REFRESH_INTERVAL_HOURS",
                4,
                1..=HOURS_PER_YEAR,
            )?,
            max_scrape_results: parse_or(&lookup, "MAX_SCRAPE_RESULTS", 10_000)?,
            enable_llm_job_skills: parse_or(&lookup, "ENABLE_LLM_JOB_SKILLS", false)?,
            enable_llm_ranking: parse_or(&lookup, "ENABLE_LLM_RANKING", true)?,
            prefilter_limit: parse_or(&lookup, "PREFILTER_LIMIT", 30)?,
            match_limit: parse_or(&lookup, "MATCH_LIMIT", 10)?,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            s3_bucket: optional("S3_BUCKET"),
            s3_endpoint: optional("S3_ENDPOINT"),
            aws_region: text("AWS_REGION", "us-east-1"),
            aws_access_key_id: optional("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: optional("AWS_SECRET_ACCESS_KEY"),
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: text("RUST_LOG", "info"),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

/// `parse_or`, then rejects values outside `range`.
fn parse_in<F, T>(lookup: &F, key: &str, default: T, range: RangeInclusive<T>) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = parse_or(lookup, key, default)?;
    ensure!(
        range.contains(&value),
        "Environment variable '{key}' must be between {} and {}, got {value}",
        range.start(),
        range.end()
    );
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cache_ttl_hours, 4);
        assert_eq!(config.inactive_after_days, 3);
        assert_eq!(config.prefilter_limit, 30);
        assert_eq!(config.match_limit, 10);
        assert!(config.anthropic_api_key.is_none());
        assert!(config.s3_bucket.is_none());
        assert!(config.enable_background_refresh);
        assert!(!config.enable_llm_job_skills);
        assert_eq!(config.listings_url, DEFAULT_LISTINGS_URL);
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("CACHE_TTL_HOURS", "12"),
            ("ENABLE_LLM_RANKING", "false"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("S3_BUCKET", "resumes"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.cache_ttl_hours, 12);
        assert!(!config.enable_llm_ranking);
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.s3_bucket.as_deref(), Some("resumes"));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("ANTHROPIC_API_KEY", "  "), ("PORT", "")]).unwrap();
        assert!(config.anthropic_api_key.is_none());
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_number_names_the_key() {
        let err = config_from(&[("PREFILTER_LIMIT", "lots")]).unwrap_err();
        assert!(err.to_string().contains("PREFILTER_LIMIT"));
    }

    #[test]
    fn test_zero_cache_ttl_is_rejected() {
        let err = config_from(&[("CACHE_TTL_HOURS", "0")]).unwrap_err();
        assert!(err.to_string().contains("CACHE_TTL_HOURS"));
    }

    #[test]
    fn test_out_of_range_windows_are_rejected() {
        assert!(config_from(&[("INACTIVE_AFTER_DAYS", "0")]).is_err());
        assert!(config_from(&[("METADATA_RETENTION_DAYS", "99999999999")]).is_err());
        assert!(config_from(&[("FULL_SCRAPE_AFTER_HOURS", "-1")]).is_err());
        assert!(config_from(&[("REFRESH_INTERVAL_HOURS", "0")]).is_err());
        assert!(config_from(&[("CACHE_TTL_HOURS", "8760")]).is_ok());
    }
}
