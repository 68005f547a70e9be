mod config;
mod db;
mod errors;
mod jobs;
mod listings;
mod llm_client;
mod matching;
mod models;
mod outreach;
mod resume;
mod routes;
mod skills;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::jobs::cache::{CacheSettings, JobCache};
use crate::jobs::refresh::{refresh_scheduler, RefreshSchedule, RefreshService};
use crate::listings::ListingScraper;
use crate::llm_client::LlmClient;
use crate::matching::profile::CandidateProfiler;
use crate::matching::{HeuristicRanker, JobRanker, LlmJobRanker, MatchPipeline};
use crate::resume::storage::ResumeStorage;
use crate::resume::ResumeParser;
use crate::routes::build_router;
use crate::skills::JobSkillExtractor;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting InternMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis (connections are opened lazily; failures degrade to SQLite)
    let redis = match redis::Client::open(config.redis_url.clone()) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("Invalid REDIS_URL, running on SQLite only: {e}");
            None
        }
    };

    // Initialize LLM client
    let llm = match &config.anthropic_api_key {
        Some(key) => {
            let mut client = LlmClient::new(key.clone())?;
            if let Some(url) = &config.anthropic_api_url {
                client = client.with_endpoint(url.clone());
            }
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set, using heuristic skills and ranking");
            None
        }
    };

    // Initialize S3 resume archival
    let storage = match &config.s3_bucket {
        Some(bucket) => {
            let s3 = build_s3_client(&config).await;
            info!("Resume archival enabled (bucket: {bucket})");
            Some(ResumeStorage::new(s3, bucket.clone()))
        }
        None => None,
    };

    let cache = Arc::new(JobCache::new(db, redis, CacheSettings::from(&config)));
    let skills = Arc::new(JobSkillExtractor::new(
        llm.clone(),
        config.enable_llm_job_skills,
    ));
    let scraper = Arc::new(ListingScraper::new(
        config.listings_url.clone(),
        config.max_scrape_results,
        Arc::clone(&skills),
    )?);
    let refresher = Arc::new(RefreshService::new(Arc::clone(&cache), scraper));
    let resume_parser = Arc::new(ResumeParser::new(llm.clone(), storage));

    // Ranker: LLM deep ranking when enabled and configured, else heuristic
    let ranker: Arc<dyn JobRanker> = match (&llm, config.enable_llm_ranking) {
        (Some(llm), true) => Arc::new(LlmJobRanker::new(llm.clone())),
        _ => Arc::new(HeuristicRanker),
    };
    let matcher = Arc::new(MatchPipeline::new(
        Arc::clone(&cache),
        Arc::clone(&resume_parser),
        CandidateProfiler::new(llm),
        ranker,
        config.prefilter_limit,
        config.match_limit,
    ));

    // Background refresh
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = if config.enable_background_refresh {
        let schedule = RefreshSchedule {
            every: Duration::from_secs(config.refresh_interval_hours * 3600),
            metadata_retention_days: config.metadata_retention_days,
        };
        Some(tokio::spawn(refresh_scheduler(
            Arc::clone(&refresher),
            schedule,
            shutdown_rx,
        )))
    } else {
        info!("Background refresh disabled");
        None
    };

    let state = AppState {
        config: config.clone(),
        cache,
        refresher,
        skills,
        resume_parser,
        matcher,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = scheduler {
        let _ = handle.await;
    }

    Ok(())
}

/// S3 client for AWS, or any S3-compatible endpoint when `S3_ENDPOINT` is set.
/// Static credentials are used only when both keys are present.
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));

    if let (Some(key_id), Some(secret)) = (&config.aws_access_key_id, &config.aws_secret_access_key) {
        loader = loader.credentials_provider(Credentials::new(
            key_id,
            secret,
            None,
            None,
            "internmatch-static",
        ));
    }
    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    let s3_config = loader.load().await;
    let mut builder = aws_sdk_s3::config::Builder::from(&s3_config);
    if config.s3_endpoint.is_some() {
        builder = builder.force_path_style(true);
    }
    aws_sdk_s3::Client::from_conf(builder.build())
}
