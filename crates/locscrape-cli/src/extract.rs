//! Command handlers: extract from URLs, parse local files, inspect candidates.

use std::path::Path;

use futures::stream::{self, StreamExt};
use locscrape_scraper::{
    extract_with_report, Extraction, FetchSettings, LocationRecord, PageFetcher,
};

use crate::output::emit;
use crate::OutputFormat;

/// Result of processing a single URL.
struct UrlOutcome {
    url: String,
    /// Which fetch strategy produced the page.
    source: Option<&'static str>,
    /// Winning container selector, if any candidate produced records.
    selector: Option<String>,
    records: Vec<LocationRecord>,
    /// Human-readable error description when the URL failed.
    error: Option<String>,
}

impl UrlOutcome {
    fn failed(url: &str, error: String) -> Self {
        Self {
            url: url.to_owned(),
            source: None,
            selector: None,
            records: Vec::new(),
            error: Some(error),
        }
    }
}

async fn extract_in_background(html: String) -> anyhow::Result<Extraction> {
    tokio::task::spawn_blocking(move || extract_with_report(&html))
        .await
        .map_err(|e| anyhow::anyhow!("extraction task failed: {e}"))
}

async fn process_url(fetcher: &PageFetcher, url: &str) -> UrlOutcome {
    let page = match fetcher.fetch_html(url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!(url, error = %e, "fetch failed");
            return UrlOutcome::failed(url, e.to_string());
        }
    };

    match extract_in_background(page.html).await {
        Ok(extraction) => UrlOutcome {
            url: page.url,
            source: Some(page.source.as_str()),
            selector: extraction.signature.map(|s| s.css_selector()),
            records: extraction.records,
            error: None,
        },
        Err(e) => UrlOutcome::failed(url, format!("{e:#}")),
    }
}

/// Fetch every URL (bounded concurrency, input order preserved), extract,
/// and emit all records together.
///
/// # Errors
///
/// Returns an error only if every URL failed, or if the output cannot be
/// written. Per-URL failures are reported and skipped.
pub(crate) async fn run_extract(
    config: &locscrape_core::AppConfig,
    urls: &[String],
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let fetcher = PageFetcher::new(FetchSettings::from_app_config(config))
        .map_err(|e| anyhow::anyhow!("failed to build page fetcher: {e}"))?;
    let max_concurrent = config.max_concurrent_fetches.max(1);

    eprintln!("Extracting locations from {} page(s)...", urls.len());

    let outcomes: Vec<UrlOutcome> = stream::iter(urls)
        .map(|url| process_url(&fetcher, url))
        .buffered(max_concurrent)
        .collect()
        .await;

    let mut records: Vec<LocationRecord> = Vec::new();
    let mut failed: usize = 0;

    for outcome in outcomes {
        if let Some(err_msg) = &outcome.error {
            failed += 1;
            eprintln!("  \u{2717} {} {err_msg}", outcome.url);
            continue;
        }
        eprintln!(
            "  \u{2713} {} {:>4} locations  [{}, {}]",
            outcome.url,
            outcome.records.len(),
            outcome.source.unwrap_or("none"),
            outcome.selector.as_deref().unwrap_or("no repeated block"),
        );
        records.extend(outcome.records);
    }

    if failed == urls.len() {
        anyhow::bail!("all {failed} URLs failed");
    }

    emit(&records, format, output)
}

/// Read a saved page. Bytes that are not UTF-8 are replaced, not rejected.
fn read_html(path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Extract locations from a saved HTML file.
pub(crate) async fn run_parse(
    path: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let html = read_html(path)?;
    let extraction = extract_in_background(html).await?;
    tracing::info!(
        file = %path.display(),
        count = extraction.records.len(),
        "parsed local file"
    );
    emit(&extraction.records, format, output)
}

pub(crate) fn format_candidates(extraction: &Extraction) -> String {
    if extraction.candidates.is_empty() {
        return "no class signature repeats often enough to be a listing\n".to_owned();
    }
    let mut out = String::new();
    for (rank, candidate) in extraction.candidates.candidates().iter().enumerate() {
        let selected = extraction.signature.as_ref() == Some(&candidate.signature);
        out.push_str(&format!(
            "{:>2}. {:<40} {:>5}{}\n",
            rank + 1,
            candidate.signature.css_selector(),
            candidate.count,
            if selected { "  <- selected" } else { "" },
        ));
    }
    out
}

/// Print the ranked candidates for a saved HTML file, marking the winner.
pub(crate) async fn run_candidates(path: &Path) -> anyhow::Result<()> {
    let html = read_html(path)?;
    let extraction = extract_in_background(html).await?;
    print!("{}", format_candidates(&extraction));
    Ok(())
}
