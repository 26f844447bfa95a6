//! Page acquisition: direct HTTP first, headless browser as a fallback.
//!
//! Many locator pages ship an empty shell and fill in the listings with
//! JavaScript. A direct response that fails or is suspiciously small is
//! therefore retried through a headless browser's `--dump-dom` output.

use std::time::Duration;

use reqwest::{header, Client, StatusCode, Url};
use serde::Serialize;

use crate::error::FetchError;
use crate::retry::retry_with_backoff;

/// Default argument template for Chromium-family browsers. `{url}` is
/// replaced with the page URL.
pub const DEFAULT_BROWSER_ARGS: [&str; 4] = ["--headless", "--disable-gpu", "--dump-dom", "{url}"];

/// Which strategy produced a page body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSource {
    Direct,
    Browser,
}

impl PageSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PageSource::Direct => "direct",
            PageSource::Browser => "browser",
        }
    }
}

/// A fetched HTML document.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub html: String,
    pub source: PageSource,
}

/// Runs an external headless browser and captures the rendered DOM.
#[derive(Debug, Clone)]
pub struct BrowserRenderer {
    program: String,
    args: Vec<String>,
    timeout_secs: u64,
}

impl BrowserRenderer {
    #[must_use]
    pub fn new(program: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            args: DEFAULT_BROWSER_ARGS.iter().map(|a| (*a).to_owned()).collect(),
            timeout_secs,
        }
    }

    /// Replace the argument template. Each `{url}` is substituted at render time.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Render `url` and return the browser's stdout.
    ///
    /// # Errors
    ///
    /// - [`FetchError::RenderTimeout`]: the browser did not exit in time (it is killed).
    /// - [`FetchError::Render`]: spawn failure, non-zero exit, or empty output.
    pub async fn render(&self, url: &str) -> Result<String, FetchError> {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(self.args.iter().map(|arg| arg.replace("{url}", url)))
            .kill_on_drop(true);

        let output = tokio::time::timeout(Duration::from_secs(self.timeout_secs), command.output())
            .await
            .map_err(|_| FetchError::RenderTimeout {
                url: url.to_owned(),
                timeout_secs: self.timeout_secs,
            })?
            .map_err(|e| FetchError::Render {
                url: url.to_owned(),
                reason: format!("could not run {}: {e}", self.program),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::Render {
                url: url.to_owned(),
                reason: format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            });
        }

        let html = String::from_utf8_lossy(&output.stdout).into_owned();
        if html.trim().is_empty() {
            return Err(FetchError::Render {
                url: url.to_owned(),
                reason: "browser produced no output".to_owned(),
            });
        }
        Ok(html)
    }
}

/// Settings for [`PageFetcher`].
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Direct bodies must be longer than this many characters.
    pub min_content_chars: usize,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    /// `None` disables the browser fallback.
    pub browser: Option<BrowserRenderer>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "Mozilla/5.0".to_owned(),
            min_content_chars: 1000,
            max_retries: 2,
            backoff_base_ms: 250,
            browser: Some(BrowserRenderer::new("chromium", 30)),
        }
    }
}

impl FetchSettings {
    #[must_use]
    pub fn from_app_config(config: &locscrape_core::AppConfig) -> Self {
        Self {
            timeout_secs: config.fetch_timeout_secs,
            user_agent: config.user_agent.clone(),
            min_content_chars: config.min_content_chars,
            max_retries: config.fetch_max_retries,
            backoff_base_ms: config.fetch_backoff_base_ms,
            browser: config
                .browser
                .as_ref()
                .map(|b| BrowserRenderer::new(b.binary.clone(), b.timeout_secs)),
        }
    }
}

/// Fetches locator pages, falling back to a headless browser.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    min_content_chars: usize,
    max_retries: u32,
    backoff_base_ms: u64,
    browser: Option<BrowserRenderer>,
}

impl PageFetcher {
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.timeout_secs.min(10)))
            .user_agent(settings.user_agent)
            .build()?;
        Ok(Self {
            client,
            min_content_chars: settings.min_content_chars,
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
            browser: settings.browser,
        })
    }

    /// Fetch the HTML for `url`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`]: not an absolute `http`/`https` URL.
    /// - [`FetchError::FallbackDisabled`]: direct fetch failed and no browser is configured.
    /// - [`FetchError::AllStrategiesFailed`]: direct fetch and browser rendering both failed.
    pub async fn fetch_html(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let url = validate_url(url)?;

        let direct_err = match self.fetch_direct(&url).await {
            Ok(html) => {
                tracing::debug!(url = %url, chars = html.len(), "fetched page directly");
                return Ok(FetchedPage {
                    url,
                    html,
                    source: PageSource::Direct,
                });
            }
            Err(err) => err,
        };

        let Some(browser) = &self.browser else {
            tracing::warn!(url = %url, error = %direct_err, "direct fetch failed; no browser fallback");
            return Err(FetchError::FallbackDisabled {
                url,
                direct: direct_err.to_string(),
            });
        };

        tracing::info!(
            url = %url,
            error = %direct_err,
            browser = browser.program(),
            "direct fetch unusable; rendering with headless browser"
        );
        match browser.render(&url).await {
            Ok(html) => Ok(FetchedPage {
                url,
                html,
                source: PageSource::Browser,
            }),
            Err(browser_err) => Err(FetchError::AllStrategiesFailed {
                url,
                direct: direct_err.to_string(),
                browser: browser_err.to_string(),
            }),
        }
    }

    async fn fetch_direct(&self, url: &str) -> Result<String, FetchError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self
                .client
                .get(url)
                .header(header::ACCEPT, "text/html,application/xhtml+xml")
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(FetchError::RateLimited {
                    url: url.to_owned(),
                });
            }
            if !status.is_success() {
                return Err(FetchError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_owned(),
                });
            }
            Ok(response.text().await?)
        })
        .await?;

        let chars = body.chars().count();
        if chars <= self.min_content_chars {
            return Err(FetchError::ContentTooShort {
                url: url.to_owned(),
                chars,
                min_chars: self.min_content_chars,
            });
        }
        Ok(body)
    }
}

fn validate_url(raw: &str) -> Result<String, FetchError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|e| FetchError::InvalidUrl {
        url: trimmed.to_owned(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_owned()),
        other => Err(FetchError::InvalidUrl {
            url: trimmed.to_owned(),
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_url_accepts_http_and_https() {
        assert_eq!(
            validate_url(" https://example.com/stores ").unwrap(),
            "https://example.com/stores"
        );
        assert!(validate_url("http://example.com").is_ok());
    }

    #[test]
    fn validate_url_rejects_other_schemes() {
        assert!(matches!(
            validate_url("file:///etc/passwd"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            validate_url("example.com/stores"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn default_settings_match_documented_defaults() {
        let settings = FetchSettings::default();
        assert_eq!(settings.min_content_chars, 1000);
        assert_eq!(settings.user_agent, "Mozilla/5.0");
        assert_eq!(
            settings.browser.as_ref().map(BrowserRenderer::program),
            Some("chromium")
        );
    }

    #[test]
    fn page_source_labels() {
        assert_eq!(PageSource::Direct.as_str(), "direct");
        assert_eq!(PageSource::Browser.as_str(), "browser");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn renderer_substitutes_url_into_args() {
        let renderer = BrowserRenderer::new("echo", 5).with_args(["<p>{url}</p>"]);
        let html = renderer.render("https://example.com/stores").await.unwrap();
        assert_eq!(html.trim(), "<p>https://example.com/stores</p>");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn renderer_reports_non_zero_exit() {
        let renderer = BrowserRenderer::new("false", 5).with_args(Vec::<String>::new());
        let err = renderer.render("https://example.com").await.unwrap_err();
        assert!(matches!(err, FetchError::Render { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn renderer_reports_missing_binary() {
        let renderer = BrowserRenderer::new("locscrape-no-such-browser", 5);
        let err = renderer.render("https://example.com").await.unwrap_err();
        assert!(matches!(err, FetchError::Render { .. }), "got {err:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn renderer_times_out() {
        let renderer = BrowserRenderer::new("sleep", 1).with_args(["5"]);
        let err = renderer.render("https://example.com").await.unwrap_err();
        assert!(matches!(err, FetchError::RenderTimeout { timeout_secs: 1, .. }), "got {err:?}");
    }
}
