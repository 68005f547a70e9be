pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::matching::handlers as matching;
use crate::outreach::handlers as outreach;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Listings
        .route("/api/v1/jobs", get(jobs::handle_list_jobs))
        .route("/api/v1/jobs/new", get(jobs::handle_new_jobs))
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .route("/api/v1/jobs/:id/details", get(jobs::handle_job_details))
        // Cache
        .route(
            "/api/v1/cache",
            get(jobs::handle_cache_info).delete(jobs::handle_clear_cache),
        )
        .route("/api/v1/cache/refresh", post(jobs::handle_refresh))
        // Resumes and matching
        .route("/api/v1/resumes/parse", post(resume::handle_parse_resume))
        .route("/api/v1/match", post(matching::handle_match))
        .route("/api/v1/match/stream", post(matching::handle_match_stream))
        // Outreach
        .route("/api/v1/outreach/email", post(outreach::handle_generate_email))
        .layer(upload_limit)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::db::test_support::temp_pool;
    use crate::jobs::cache::{CacheSettings, JobCache};
    use crate::jobs::refresh::RefreshService;
    use crate::listings::ListingScraper;
    use crate::matching::profile::CandidateProfiler;
    use crate::matching::{HeuristicRanker, MatchPipeline};
    use crate::resume::ResumeParser;
    use crate::skills::JobSkillExtractor;

    const BOUNDARY: &str = "internmatch-test";

    async fn test_state() -> (AppState, TempDir) {
        let config = Config::from_lookup(|_| None).unwrap();
        let (pool, dir) = temp_pool().await;
        let cache = Arc::new(JobCache::new(pool, None, CacheSettings::from(&config)));
        let skills = Arc::new(JobSkillExtractor::new(None, false));
        let scraper = Arc::new(
            ListingScraper::new(
                "http://127.0.0.1:1/README.md".to_string(),
                config.max_scrape_results,
                Arc::clone(&skills),
            )
            .unwrap(),
        );
        let resume_parser = Arc::new(ResumeParser::new(None, None));
        let matcher = Arc::new(MatchPipeline::new(
            Arc::clone(&cache),
            Arc::clone(&resume_parser),
            CandidateProfiler::new(None),
            Arc::new(HeuristicRanker),
            config.prefilter_limit,
            config.match_limit,
        ));

        let state = AppState {
            refresher: Arc::new(RefreshService::new(Arc::clone(&cache), scraper)),
            config,
            cache,
            skills,
            resume_parser,
            matcher,
        };
        (state, dir)
    }

    fn multipart(parts: &[(&str, Option<&str>, &str)]) -> Body {
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match filename {
                Some(f) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                     Content-Type: text/plain\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        Body::from(body)
    }

    fn upload_request(uri: &str, body: Body) -> Request<Body> {
        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(body)
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_version() {
        let (state, _dir) = test_state().await;
        let response = build_router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_upload_without_resume_is_rejected() {
        let (state, _dir) = test_state().await;
        let request = upload_request("/api/v1/match", multipart(&[("limit", None, "5")]));
        let response = build_router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "resume file is required");
    }

    #[tokio::test]
    async fn test_parse_resume_returns_skills() {
        let (state, _dir) = test_state().await;
        let request = upload_request(
            "/api/v1/resumes/parse",
            multipart(&[("resume", Some("cv.txt"), "Student. Python, SQL and Docker.")]),
        );
        let response = build_router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["filename"], "cv.txt");
        assert_eq!(body["skills"], serde_json::json!(["Python", "SQL", "Docker"]));
        assert!(body.get("text").is_none());
    }

    #[tokio::test]
    async fn test_match_with_empty_cache_returns_no_matches() {
        let (state, _dir) = test_state().await;
        let request = upload_request(
            "/api/v1/match",
            multipart(&[("resume", Some("cv.md"), "Python developer")]),
        );
        let response = build_router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["total_candidates"], 0);
        assert_eq!(body["matches"], serde_json::json!([]));
        assert_eq!(body["ranked_by"], "heuristic");
    }

    #[tokio::test]
    async fn test_email_for_unknown_job_is_not_found() {
        let (state, _dir) = test_state().await;
        let request = Request::post("/api/v1/outreach/email")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"job_id": 42, "resume_skills": ["Python"], "applicant_name": "Sam"}"#,
            ))
            .unwrap();
        let response = build_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_jobs_listing_rejects_oversized_page() {
        let (state, _dir) = test_state().await;
        let response = build_router(state)
            .oneshot(Request::get("/api/v1/jobs?limit=501").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_new_jobs_rejects_out_of_range_hours() {
        let (state, _dir) = test_state().await;
        let router = build_router(state);

        for uri in ["/api/v1/jobs/new?hours=0", "/api/v1/jobs/new?hours=10000000000"] {
            let response = router
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            let body = json_body(response).await;
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }

        let response = router
            .oneshot(Request::get("/api/v1/jobs/new?hours=8760").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
