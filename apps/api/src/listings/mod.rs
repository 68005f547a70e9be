//! Internship listings: README fetch, table parsing, filtering and enrichment.

pub mod dates;
pub mod enrich;
pub mod github;
pub mod job_page;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::job::ScrapedJob;
use crate::skills::JobSkillExtractor;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeMode {
    #[default]
    Smart,
    Full,
    Incremental,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScrapeOptions {
    #[serde(default)]
    pub mode: ScrapeMode,
    #[serde(default)]
    pub max_days: Option<i64>,
}

/// What the scraper needs to know about listings that are already stored.
#[async_trait]
pub trait KnownListings: Send + Sync {
    /// Whether a smart scrape may skip listings that are already stored.
    async fn should_do_incremental(&self) -> bool;

    /// Drops listings whose content hash is already stored.
    async fn filter_new_jobs(&self, jobs: Vec<ScrapedJob>) -> anyhow::Result<Vec<ScrapedJob>>;
}

pub struct ListingScraper {
    client: Client,
    listings_url: String,
    max_results: usize,
    skills: Arc<JobSkillExtractor>,
}

impl ListingScraper {
    pub fn new(
        listings_url: impl Into<String>,
        max_results: usize,
        skills: Arc<JobSkillExtractor>,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(concat!("internmatch-api/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            listings_url: listings_url.into(),
            max_results,
            skills,
        })
    }

    /// Fetches and parses the README, then applies the date and incremental
    /// filters before attaching skills. Fetch failures yield no listings.
    pub async fn scrape(
        &self,
        options: ScrapeOptions,
        known: &dyn KnownListings,
    ) -> Vec<ScrapedJob> {
        let content = match github::fetch_readme(&self.client, &self.listings_url).await {
            Ok(content) => content,
            Err(e) => {
                error!("Failed to fetch listings from {}: {e}", self.listings_url);
                return Vec::new();
            }
        };

        let today = Utc::now().date_naive();
        let parsed = github::parse_internship_table(&content, self.max_results, today);
        let mut jobs = dates::filter_jobs_by_date(parsed, options.max_days, today);

        let incremental = match options.mode {
            ScrapeMode::Full => false,
            ScrapeMode::Incremental => true,
            ScrapeMode::Smart => known.should_do_incremental().await,
        };
        info!(
            "Scrape mode {:?}: {} listings after date filter, incremental={incremental}",
            options.mode,
            jobs.len()
        );

        if incremental {
            let all = jobs.clone();
            jobs = match known.filter_new_jobs(jobs).await {
                Ok(new_jobs) => {
                    info!("Incremental scrape kept {} of {} listings", new_jobs.len(), all.len());
                    new_jobs
                }
                Err(e) => {
                    warn!("Incremental filter failed, keeping all listings: {e}");
                    all
                }
            };
        }

        if jobs.is_empty() {
            return jobs;
        }
        enrich::enrich_skills(jobs, Arc::clone(&self.skills)).await
    }
}
