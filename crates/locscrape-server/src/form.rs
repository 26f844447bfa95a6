//! Browser-facing form UI: submit a URL, see the records, download a CSV.

use axum::{
    extract::{Form, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Extension,
};
use locscrape_scraper::{to_csv_string, LocationRecord};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{error_status, fetch_error_code, map_join_error, run_extraction, ApiError, AppState};
use crate::middleware::RequestId;

pub(crate) const CSV_FILENAME: &str = "store_locations.csv";

#[derive(Debug, Deserialize)]
pub(crate) struct ScrapeForm {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DownloadQuery {
    id: Option<String>,
}

enum Outcome<'a> {
    Empty,
    Scraped {
        result_id: Uuid,
        records: &'a [LocationRecord],
    },
    Failed(&'a str),
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_page(url: &str, outcome: &Outcome<'_>) -> String {
    let result = match outcome {
        Outcome::Empty => String::new(),
        Outcome::Failed(message) => {
            format!(
                "<p class=\"error\">Could not scrape that page: {}</p>\n",
                escape_html(message)
            )
        }
        Outcome::Scraped { result_id, records } => {
            let json = serde_json::to_string_pretty(records).unwrap_or_else(|e| {
                tracing::error!(error = %e, "failed to render records as JSON");
                "[]".to_owned()
            });
            format!(
                "<h3>Scraped {count} locations</h3>\n\
                 <a href=\"/download.csv?id={result_id}\" target=\"_blank\">Download as CSV</a>\n\
                 <pre>{json}</pre>\n",
                count = records.len(),
                json = escape_html(&json),
            )
        }
    };

    format!(
        "<!doctype html>\n\
         <title>Location Scraper</title>\n\
         <h2>Smart Location Scraper</h2>\n\
         <form method=\"post\">\n\
         \x20 <label for=\"url\">Enter URL to Scrape:</label><br>\n\
         \x20 <input id=\"url\" name=\"url\" size=\"80\" value=\"{url}\"><br><br>\n\
         \x20 <input type=\"submit\" value=\"Scrape\">\n\
         </form>\n\
         {result}",
        url = escape_html(url),
    )
}

pub(crate) async fn index() -> Html<String> {
    Html(render_page("", &Outcome::Empty))
}

pub(crate) async fn scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Form(form): Form<ScrapeForm>,
) -> Response {
    let url = form.url.unwrap_or_default().trim().to_owned();
    if url.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Html(render_page("", &Outcome::Failed("enter a URL to scrape"))),
        )
            .into_response();
    }

    let page = match state.fetcher.fetch_html(&url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "form: fetch failed");
            let message = e.to_string();
            return (
                error_status(fetch_error_code(&e)),
                Html(render_page(&url, &Outcome::Failed(&message))),
            )
                .into_response();
        }
    };

    let records = match run_extraction(page.html).await {
        Ok(extraction) => extraction.records,
        Err(e) => return map_join_error(req_id.0, &e).into_response(),
    };

    let result_id = state.results.insert(records.clone()).await;
    tracing::info!(
        %result_id,
        url = %url,
        source = page.source.as_str(),
        count = records.len(),
        "form: scraped page"
    );

    Html(render_page(
        &url,
        &Outcome::Scraped {
            result_id,
            records: &records,
        },
    ))
    .into_response()
}

pub(crate) async fn download_csv(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let Some(raw_id) = query.id.filter(|id| !id.trim().is_empty()) else {
        return ApiError::new(req_id.0, "bad_request", "query parameter `id` is required")
            .into_response();
    };
    let Ok(id) = Uuid::parse_str(raw_id.trim()) else {
        return ApiError::new(req_id.0, "validation_error", "`id` must be a result id")
            .into_response();
    };
    let Some(records) = state.results.get(id).await else {
        return ApiError::new(req_id.0, "not_found", format!("no stored result {id}"))
            .into_response();
    };

    tracing::debug!(result_id = %id, rows = records.len(), "serving CSV download");
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILENAME}\""),
            ),
        ],
        to_csv_string(&records),
    )
        .into_response()
}

#[cfg(test)]
#[path = "form_test.rs"]
mod tests;
