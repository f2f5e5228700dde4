//! Tool entry points shared by the CLI and the MCP server.
//!
//! Both tools return plain text: every failure is rendered into a fixed,
//! human-readable sentence here, so callers never see a fault.

use bravepipe_core::{
    format_results, validate_search, Config, ErrorKind, Executor, Failure, Result,
};
use bravepipe_local::{BraveSearch, DocumentFetcher, HttpExecutor};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_COUNT: i64 = 10;
pub const DEFAULT_OFFSET: i64 = 0;

pub const INVALID_URL: &str = "Invalid URL format";
pub const UNEXPECTED_SEARCH_FORMAT: &str = "Error: Unexpected response format from search API";

#[derive(Clone)]
pub struct Toolbox {
    config: Arc<Config>,
    search: BraveSearch,
    fetcher: DocumentFetcher,
}

impl Toolbox {
    pub fn new(config: Arc<Config>, executor: Arc<dyn Executor>) -> Self {
        Self {
            search: BraveSearch::new(executor.clone(), config.clone()),
            fetcher: DocumentFetcher::new(executor, config.clone()),
            config,
        }
    }

    /// Wire the reqwest executor. Fails only if the HTTP client cannot be built.
    pub fn from_config(config: Config) -> Result<Self> {
        let executor = HttpExecutor::new()?;
        Ok(Self::new(Arc::new(config), Arc::new(executor)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Brave web search rendered as numbered result blocks.
    pub async fn search(
        &self,
        query: &str,
        count: Option<i64>,
        offset: Option<i64>,
        search_lang: Option<String>,
    ) -> String {
        let params = match validate_search(
            query,
            count.unwrap_or(DEFAULT_COUNT),
            offset.unwrap_or(DEFAULT_OFFSET),
            search_lang,
        ) {
            Ok(p) => p,
            Err(f) => {
                tracing::warn!(query, "rejected search arguments: {}", f.detail);
                return search_error_message(&f);
            }
        };
        match self.search.search(&params).await {
            Ok(hits) => format_results(&hits, params.offset),
            Err(f) => search_error_message(&f),
        }
    }

    /// Fetch `url` and return its visible text.
    pub async fn fetch_document(&self, url: &str) -> String {
        match self.fetcher.fetch(url).await {
            Ok(doc) => doc.text,
            Err(f) => fetch_error_message(&f, self.config.fetch_timeout),
        }
    }
}

fn status_line(f: &Failure) -> String {
    let status = f.status.map(|s| s.to_string()).unwrap_or_default();
    let reason = f.reason.as_deref().unwrap_or("");
    format!("{status} {reason}").trim().to_string()
}

pub fn search_error_message(f: &Failure) -> String {
    let msg = match f.kind {
        ErrorKind::UnexpectedFormat => return UNEXPECTED_SEARCH_FORMAT.to_string(),
        ErrorKind::ValidationError => format!("Invalid request - {}", f.detail),
        ErrorKind::Timeout => "Request to search API timed out".to_string(),
        ErrorKind::NetworkError => format!("Failed to connect to search API: {}", f.detail),
        ErrorKind::AuthError => "API authentication failed - check your BRAVE_API_KEY".to_string(),
        ErrorKind::PermissionError => {
            "Permission denied - check API key or subscription plan".to_string()
        }
        ErrorKind::RateLimited => "Rate limit exceeded - please wait before trying again".to_string(),
        ErrorKind::UpstreamServerError => format!("Brave API server error: {}", status_line(f)),
        ErrorKind::ClientError => format!(
            "API client error: {} - {}",
            f.status.unwrap_or_default(),
            f.detail
        ),
        ErrorKind::ParseError => "Invalid JSON response received from API".to_string(),
    };
    format!("Search error: {msg}")
}

pub fn fetch_error_message(f: &Failure, fetch_timeout: Duration) -> String {
    match f.kind {
        ErrorKind::ValidationError => INVALID_URL.to_string(),
        ErrorKind::Timeout => format!(
            "Error fetching website: Request timed out after {} seconds",
            fetch_timeout.as_secs_f64()
        ),
        ErrorKind::NetworkError => format!("Error connecting to website: {}", f.detail),
        ErrorKind::ParseError | ErrorKind::UnexpectedFormat => {
            format!("Error processing website content: {}", f.detail)
        }
        ErrorKind::AuthError
        | ErrorKind::PermissionError
        | ErrorKind::RateLimited
        | ErrorKind::ClientError
        | ErrorKind::UpstreamServerError => {
            format!("Error fetching website: HTTP {}", status_line(f))
        }
    }
}
