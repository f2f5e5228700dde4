//! Environment-driven `Config` resolution.

use bravepipe_core::{validate_url, Config, Error, Result};
use std::time::Duration;

fn env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_ms(key: &str, default: Duration) -> Result<Duration> {
    match env(key) {
        None => Ok(default),
        Some(s) => s
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| Error::NotConfigured(format!("{key} must be an integer (milliseconds)"))),
    }
}

pub fn brave_api_key_from_env() -> Option<String> {
    env("BRAVEPIPE_BRAVE_API_KEY").or_else(|| env("BRAVE_API_KEY"))
}

/// Build the process-wide `Config`. Fails fast when the API key is missing or a
/// value does not parse.
pub fn config_from_env() -> Result<Config> {
    let key = brave_api_key_from_env().ok_or_else(|| {
        Error::NotConfigured("missing BRAVEPIPE_BRAVE_API_KEY (or BRAVE_API_KEY)".to_string())
    })?;
    apply_env_overrides(Config::new(key))
}

/// Layer every non-credential `BRAVEPIPE_*` override onto `cfg`.
pub fn apply_env_overrides(mut cfg: Config) -> Result<Config> {
    if let Some(endpoint) = env("BRAVEPIPE_BRAVE_ENDPOINT") {
        if !validate_url(&endpoint) {
            return Err(Error::InvalidUrl(format!(
                "BRAVEPIPE_BRAVE_ENDPOINT is not an http(s) URL: {endpoint}"
            )));
        }
        cfg.brave_endpoint = endpoint;
    }
    cfg.search_timeout = env_ms("BRAVEPIPE_SEARCH_TIMEOUT_MS", cfg.search_timeout)?;
    cfg.fetch_timeout = env_ms("BRAVEPIPE_FETCH_TIMEOUT_MS", cfg.fetch_timeout)?;
    if let Some(s) = env("BRAVEPIPE_MAX_CHARS") {
        cfg.max_document_chars = s
            .parse::<usize>()
            .map_err(|_| Error::NotConfigured("BRAVEPIPE_MAX_CHARS must be an integer".to_string()))?;
    }
    if let Some(s) = env("BRAVEPIPE_MAX_BODY_BYTES") {
        cfg.max_body_bytes = s.parse::<usize>().map_err(|_| {
            Error::NotConfigured("BRAVEPIPE_MAX_BODY_BYTES must be an integer".to_string())
        })?;
    }
    // Present-but-empty disables the parameter; absent keeps the default.
    if let Ok(lang) = std::env::var("BRAVEPIPE_SEARCH_LANG") {
        let lang = lang.trim().to_string();
        cfg.search_lang = (!lang.is_empty()).then_some(lang);
    }
    if let Some(ua) = env("BRAVEPIPE_USER_AGENT") {
        cfg.user_agent = ua;
    }
    Ok(cfg)
}
