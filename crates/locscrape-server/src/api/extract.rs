use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension, Json,
};
use locscrape_scraper::{Extraction, LocationRecord, PageSource};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    fetch_error_code, map_join_error, run_extraction, ApiError, ApiResponse, AppState,
    ResponseMeta,
};
use crate::middleware::RequestId;

/// Either a URL to fetch or an HTML document supplied inline.
#[derive(Debug, Deserialize)]
pub(super) struct ExtractRequest {
    url: Option<String>,
    html: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct CandidateItem {
    selector: String,
    count: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct ExtractData {
    result_id: Uuid,
    url: Option<String>,
    source: Option<PageSource>,
    signature: Option<String>,
    candidates: Vec<CandidateItem>,
    count: usize,
    records: Vec<LocationRecord>,
}

impl ExtractData {
    fn new(
        result_id: Uuid,
        url: Option<String>,
        source: Option<PageSource>,
        extraction: Extraction,
    ) -> Self {
        let candidates = extraction
            .candidates
            .candidates()
            .iter()
            .map(|c| CandidateItem {
                selector: c.signature.css_selector(),
                count: c.count,
            })
            .collect();
        Self {
            result_id,
            url,
            source,
            signature: extraction.signature.map(|s| s.css_selector()),
            candidates,
            count: extraction.records.len(),
            records: extraction.records,
        }
    }
}

pub(super) async fn extract(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ExtractRequest>,
) -> Response {
    let (html, url, source) = match (body.url, body.html) {
        (Some(_), Some(_)) => {
            return ApiError::new(
                req_id.0,
                "validation_error",
                "provide either url or html, not both",
            )
            .into_response();
        }
        (None, Some(html)) => (html, None, None),
        (Some(url), None) if !url.trim().is_empty() => {
            match state.fetcher.fetch_html(&url).await {
                Ok(page) => (page.html, Some(page.url), Some(page.source)),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "extract: fetch failed");
                    return ApiError::new(req_id.0, fetch_error_code(&e), e.to_string())
                        .into_response();
                }
            }
        }
        _ => {
            return ApiError::new(req_id.0, "validation_error", "url or html is required")
                .into_response();
        }
    };

    let extraction = match run_extraction(html).await {
        Ok(extraction) => extraction,
        Err(e) => return map_join_error(req_id.0, &e).into_response(),
    };

    let result_id = state.results.insert(extraction.records.clone()).await;
    tracing::info!(
        %result_id,
        url = url.as_deref().unwrap_or("<inline>"),
        count = extraction.records.len(),
        "extract: stored result"
    );

    Json(ApiResponse {
        data: ExtractData::new(result_id, url, source, extraction),
        meta: ResponseMeta::new(req_id.0),
    })
    .into_response()
}
