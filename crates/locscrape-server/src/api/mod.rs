mod extract;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use locscrape_scraper::{extract_with_report, Extraction, FetchError, PageFetcher};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::form;
use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};
use crate::results::ResultStore;

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<PageFetcher>,
    pub results: ResultStore,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(crate) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = error_status(&self.error.code);
        (status, Json(self)).into_response()
    }
}

pub(crate) fn error_status(code: &str) -> StatusCode {
    match code {
        "not_found" => StatusCode::NOT_FOUND,
        "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
        "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
        "fetch_failed" => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error code for a failed page fetch. Bad input URLs are the caller's fault;
/// everything else is an upstream failure.
pub(crate) fn fetch_error_code(error: &FetchError) -> &'static str {
    match error {
        FetchError::InvalidUrl { .. } => "validation_error",
        _ => "fetch_failed",
    }
}

/// Run extraction off the async runtime. `scraper::Html` is `!Send`, so the
/// whole parse-and-extract happens inside the blocking task.
pub(crate) async fn run_extraction(html: String) -> Result<Extraction, tokio::task::JoinError> {
    tokio::task::spawn_blocking(move || extract_with_report(&html)).await
}

pub(crate) fn map_join_error(request_id: String, error: &tokio::task::JoinError) -> ApiError {
    tracing::error!(error = %error, "extraction task failed");
    ApiError::new(request_id, "internal_error", "extraction failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn scrape_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/", get(form::index).post(form::scrape))
        .route("/api/v1/extract", post(extract::extract))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/download.csv", get(form::download_csv));

    Router::new()
        .merge(public_routes)
        .merge(scrape_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData { status: "ok" },
        meta: ResponseMeta::new(req_id.0),
    })
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(30, Duration::from_secs(60))
}


#[cfg(test)]
mod tests {
    use super::test_support::{body_string, get, test_app, test_state};
    use super::*;
    use tower::ServiceExt;

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn fetch_failures_map_to_bad_gateway() {
        let error = FetchError::FallbackDisabled {
            url: "https://example.com".to_owned(),
            direct: "unexpected HTTP status 500".to_owned(),
        };
        assert_eq!(error_status(fetch_error_code(&error)), StatusCode::BAD_GATEWAY);

        let invalid = FetchError::InvalidUrl {
            url: "nope".to_owned(),
            reason: "relative URL without a base".to_owned(),
        };
        assert_eq!(error_status(fetch_error_code(&invalid)), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = test_app(test_state())
            .oneshot(get("/api/v1/health"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let json: serde_json::Value =
            serde_json::from_str(&body_string(response).await).expect("json");
        assert_eq!(json["data"]["status"], "ok");
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn run_extraction_returns_report() {
        let report = run_extraction(test_support::store_page())
            .await
            .expect("join");
        assert_eq!(report.records.len(), 5);
        assert_eq!(
            report.signature.map(|s| s.css_selector()).as_deref(),
            Some(".store")
        );
    }
}
