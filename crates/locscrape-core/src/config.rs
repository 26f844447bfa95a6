use crate::app_config::{AppConfig, BrowserConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but its value is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files; useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but its value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// development config. Parsing is decoupled from the process environment so
/// tests can use a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("LOCSCRAPE_ENV", "development"))?;

    let bind_addr = parse_addr("LOCSCRAPE_BIND_ADDR", "127.0.0.1:5001")?;
    let log_level = or_default("LOCSCRAPE_LOG_LEVEL", "info");

    let fetch_timeout_secs = parse_u64("LOCSCRAPE_FETCH_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("LOCSCRAPE_USER_AGENT", "Mozilla/5.0");
    let min_content_chars = or_default("LOCSCRAPE_MIN_CONTENT_CHARS", "1000")
        .parse::<usize>()
        .map_err(|e| invalid("LOCSCRAPE_MIN_CONTENT_CHARS", e.to_string()))?;
    let fetch_max_retries = parse_u32("LOCSCRAPE_FETCH_MAX_RETRIES", "2")?;
    let fetch_backoff_base_ms = parse_u64("LOCSCRAPE_FETCH_BACKOFF_BASE_MS", "250")?;

    let browser_binary = or_default("LOCSCRAPE_BROWSER_BIN", "chromium");
    let browser_timeout_secs = parse_u64("LOCSCRAPE_BROWSER_TIMEOUT_SECS", "30")?;
    let browser = if browser_binary.trim().is_empty() {
        None
    } else {
        Some(BrowserConfig {
            binary: browser_binary.trim().to_string(),
            timeout_secs: browser_timeout_secs,
        })
    };

    let result_cache_capacity = parse_positive_usize("LOCSCRAPE_RESULT_CACHE_CAPACITY", "64")?;
    let max_concurrent_fetches = parse_positive_usize("LOCSCRAPE_MAX_CONCURRENT_FETCHES", "4")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        fetch_timeout_secs,
        user_agent,
        min_content_chars,
        fetch_max_retries,
        fetch_backoff_base_ms,
        browser,
        result_cache_capacity,
        max_concurrent_fetches,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LOCSCRAPE_ENV".to_string(),
            reason: format!("expected development, test or production; got {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
