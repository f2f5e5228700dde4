use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod classify;
pub mod format;
pub mod params;
pub mod validate;

pub use classify::{classify, classify_status, upstream_message};
pub use format::{format_results, NO_RESULTS};
pub use params::QueryParams;
pub use validate::{validate_search, validate_url, SearchParams, MAX_RESULTS_PER_REQUEST};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
    #[error("http client: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub const DEFAULT_BRAVE_ENDPOINT: &str = "https://api.search.brave.com/res/v1";
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_DOCUMENT_CHARS: usize = 10_000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 5_000_000;

/// Startup configuration. Built once, then shared read-only.
#[derive(Clone)]
pub struct Config {
    pub brave_api_key: String,
    /// Base API URL; the web search endpoint is `<brave_endpoint>/web/search`.
    pub brave_endpoint: String,
    pub search_timeout: Duration,
    pub fetch_timeout: Duration,
    pub max_document_chars: usize,
    /// Response bodies are cut to this many bytes before decoding.
    pub max_body_bytes: usize,
    /// Sent as `search_lang` unless a call overrides it. `None` omits the parameter.
    pub search_lang: Option<String>,
    pub user_agent: String,
}

impl Config {
    pub fn new(brave_api_key: impl Into<String>) -> Self {
        Self {
            brave_api_key: brave_api_key.into(),
            brave_endpoint: DEFAULT_BRAVE_ENDPOINT.to_string(),
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_document_chars: DEFAULT_MAX_DOCUMENT_CHARS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            search_lang: Some("en".to_string()),
            user_agent: default_user_agent(),
        }
    }

    pub fn web_search_url(&self) -> String {
        format!("{}/web/search", self.brave_endpoint.trim_end_matches('/'))
    }

    /// Diagnostics view: secrets are reported as booleans only.
    pub fn redacted(&self) -> serde_json::Value {
        serde_json::json!({
            "brave_api_key": !self.brave_api_key.trim().is_empty(),
            "brave_endpoint": self.brave_endpoint,
            "search_timeout_ms": self.search_timeout.as_millis() as u64,
            "fetch_timeout_ms": self.fetch_timeout.as_millis() as u64,
            "max_document_chars": self.max_document_chars,
            "max_body_bytes": self.max_body_bytes,
            "search_lang": self.search_lang,
            "user_agent": self.user_agent,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("brave_api_key", &"<redacted>")
            .field("brave_endpoint", &self.brave_endpoint)
            .field("search_timeout", &self.search_timeout)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("max_document_chars", &self.max_document_chars)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("search_lang", &self.search_lang)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

pub fn default_user_agent() -> String {
    format!(
        "Mozilla/5.0 (compatible; bravepipe/{})",
        env!("CARGO_PKG_VERSION")
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectPolicy {
    /// Follow redirects; total wall time is still bounded by the request timeout.
    Follow,
    /// Hand 3xx responses back to the caller.
    None,
}

/// A single outbound GET. Built per call and never mutated after `build`-style chaining.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: url::Url,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
    pub redirect: RedirectPolicy,
    /// `None` reads the whole body.
    pub max_body_bytes: Option<usize>,
}

impl OutboundRequest {
    pub fn get(url: url::Url, timeout: Duration) -> Self {
        Self {
            url,
            headers: Vec::new(),
            timeout,
            redirect: RedirectPolicy::None,
            max_body_bytes: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn redirect(mut self, policy: RedirectPolicy) -> Self {
        self.redirect = policy;
        self
    }

    pub fn max_body_bytes(mut self, cap: usize) -> Self {
        self.max_body_bytes = Some(cap);
        self
    }
}

/// Closed failure taxonomy. Every failure path ends in exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    ValidationError,
    Timeout,
    NetworkError,
    AuthError,
    PermissionError,
    RateLimited,
    ClientError,
    UpstreamServerError,
    ParseError,
    UnexpectedFormat,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::AuthError => "auth_error",
            ErrorKind::PermissionError => "permission_error",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::ClientError => "client_error",
            ErrorKind::UpstreamServerError => "upstream_server_error",
            ErrorKind::ParseError => "parse_error",
            ErrorKind::UnexpectedFormat => "unexpected_format",
        }
    }

    /// True for kinds that carry an HTTP status from the upstream.
    pub fn is_http_status(self) -> bool {
        matches!(
            self,
            ErrorKind::AuthError
                | ErrorKind::PermissionError
                | ErrorKind::RateLimited
                | ErrorKind::ClientError
                | ErrorKind::UpstreamServerError
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure. `Display` renders the operator-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub detail: String,
    pub status: Option<u16>,
    pub reason: Option<String>,
}

impl Failure {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            status: None,
            reason: None,
        }
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, detail)
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("after {} seconds", after.as_secs_f64()),
        )
    }

    pub fn network(cause: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkError, cause)
    }

    pub fn parse(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError, detail)
    }

    pub fn unexpected_format(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnexpectedFormat, detail)
    }

    pub fn with_status(mut self, status: u16, reason: impl Into<String>) -> Self {
        self.status = Some(status);
        self.reason = Some(reason.into());
        self
    }

    fn status_code(&self) -> u16 {
        self.status.unwrap_or(0)
    }

    /// Fixed message template per kind.
    pub fn message(&self) -> String {
        match self.kind {
            ErrorKind::ValidationError => format!("invalid input: {}", self.detail),
            ErrorKind::Timeout => "request timed out".to_string(),
            ErrorKind::NetworkError => format!("failed to connect: {}", self.detail),
            ErrorKind::AuthError => "authentication failed".to_string(),
            ErrorKind::PermissionError => "permission denied".to_string(),
            ErrorKind::RateLimited => "rate limit exceeded".to_string(),
            ErrorKind::UpstreamServerError => format!("server error: {}", self.status_code()),
            ErrorKind::ClientError => {
                format!("client error: {} - {}", self.status_code(), self.detail)
            }
            ErrorKind::ParseError | ErrorKind::UnexpectedFormat => {
                "invalid/unexpected response format".to_string()
            }
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for Failure {}

/// Result of one outbound call. Exactly one arm holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundOutcome {
    Success { status: u16, body: String },
    Failure(Failure),
}

impl OutboundOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, OutboundOutcome::Success { .. })
    }
}

/// Issues exactly one outbound call per `execute`. Implementations never panic or
/// return transport faults; every failure is folded into `OutboundOutcome::Failure`.
#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, req: &OutboundRequest) -> OutboundOutcome;
}

pub const NO_TITLE: &str = "No title available";
pub const NO_URL: &str = "No URL available";
pub const NO_DESCRIPTION: &str = "No description available";

/// One search result. Defaults are applied once, when projecting upstream JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub description: String,
}

impl SearchHit {
    /// Project an upstream result object. Missing, null, or non-string fields fall
    /// back to their defaults independently.
    pub fn from_json(v: &serde_json::Value) -> Self {
        let field = |k: &str, default: &str| {
            v.get(k)
                .and_then(|x| x.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            title: field("title", NO_TITLE),
            url: field("url", NO_URL),
            description: field("description", NO_DESCRIPTION),
        }
    }
}

/// Cleaned document text for a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedDocument {
    /// Cleaned text, including the truncation marker when `truncated`.
    pub text: String,
    pub truncated: bool,
    /// Character count of the cleaned text before truncation.
    pub source_chars: usize,
}
