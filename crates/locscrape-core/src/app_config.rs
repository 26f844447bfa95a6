use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Headless browser used when a direct fetch returns nothing usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Executable name or path, e.g. `chromium` or `/usr/bin/google-chrome`.
    pub binary: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    /// Direct responses at or below this many characters fall through to the browser.
    pub min_content_chars: usize,
    pub fetch_max_retries: u32,
    pub fetch_backoff_base_ms: u64,
    /// `None` disables the rendering fallback.
    pub browser: Option<BrowserConfig>,
    pub result_cache_capacity: usize,
    pub max_concurrent_fetches: usize,
}
