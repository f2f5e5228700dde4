use bravepipe_core::{
    classify_status, Error, Executor, Failure, OutboundOutcome, OutboundRequest, RedirectPolicy,
    Result,
};
use futures_util::StreamExt;
use std::time::Duration;

pub mod config;
pub mod extract;
pub mod fetch;
pub mod search;

pub use config::{apply_env_overrides, brave_api_key_from_env, config_from_env};
pub use extract::extract;
pub use fetch::DocumentFetcher;
pub use search::BraveSearch;

/// reqwest-backed executor. One client per redirect policy, since reqwest fixes
/// the policy at client construction.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    follow: reqwest::Client,
    manual: reqwest::Client,
}

impl HttpExecutor {
    pub fn new() -> Result<Self> {
        let follow = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::default())
            // Per-request timeouts (OutboundRequest.timeout) bound the whole call;
            // this only stops a dead TCP/TLS handshake from holding a slot.
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        let manual = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self { follow, manual })
    }

    fn client(&self, policy: RedirectPolicy) -> &reqwest::Client {
        match policy {
            RedirectPolicy::Follow => &self.follow,
            RedirectPolicy::None => &self.manual,
        }
    }
}

/// Short, stable cause for a transport error. The full error goes to the log only.
fn transport_cause(e: &reqwest::Error) -> &'static str {
    if e.is_connect() {
        "connection failed"
    } else if e.is_redirect() {
        "too many redirects"
    } else if e.is_body() || e.is_decode() {
        "failed to read response body"
    } else if e.is_builder() {
        "invalid request"
    } else if e.is_request() {
        "request failed"
    } else {
        "transport error"
    }
}

fn transport_failure(e: &reqwest::Error, req: &OutboundRequest) -> Failure {
    if e.is_timeout() {
        tracing::error!(url = %req.url, timeout_ms = req.timeout.as_millis() as u64, "request timed out: {e}");
        return Failure::timeout(req.timeout);
    }
    tracing::error!(url = %req.url, "transport error: {e}");
    Failure::network(transport_cause(e))
}

/// Bytes of a non-success body kept for the upstream error message.
const ERROR_BODY_MAX_BYTES: usize = 4 * 1024;

/// Read at most `max_bytes` of the body. The flag is true when the body was cut.
async fn read_capped(
    resp: reqwest::Response,
    max_bytes: usize,
) -> std::result::Result<(Vec<u8>, bool), reqwest::Error> {
    let mut bytes = Vec::new();
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > max_bytes {
            let can_take = max_bytes.saturating_sub(bytes.len());
            bytes.extend_from_slice(&chunk[..can_take]);
            return Ok((bytes, true));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok((bytes, false))
}

fn decode_body(mut bytes: Vec<u8>, truncated: bool) -> String {
    if truncated {
        // Drop a trailing code point split by the byte cap.
        if let Err(e) = std::str::from_utf8(&bytes) {
            if e.error_len().is_none() {
                bytes.truncate(e.valid_up_to());
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[async_trait::async_trait]
impl Executor for HttpExecutor {
    async fn execute(&self, req: &OutboundRequest) -> OutboundOutcome {
        tracing::debug!(url = %req.url, redirect = ?req.redirect, "outbound GET");
        let mut rb = self
            .client(req.redirect)
            .get(req.url.clone())
            .timeout(req.timeout);
        for (k, v) in &req.headers {
            rb = rb.header(k.as_str(), v.as_str());
        }

        let resp = match rb.send().await {
            Ok(r) => r,
            Err(e) => return OutboundOutcome::Failure(transport_failure(&e, req)),
        };
        let status = resp.status();

        if status.is_success() {
            let cap = req.max_body_bytes.unwrap_or(usize::MAX);
            return match read_capped(resp, cap).await {
                Ok((bytes, truncated)) => {
                    if truncated {
                        tracing::warn!(url = %req.url, max_body_bytes = cap, "response body cut at byte cap");
                    }
                    OutboundOutcome::Success {
                        status: status.as_u16(),
                        body: decode_body(bytes, truncated),
                    }
                }
                Err(e) => OutboundOutcome::Failure(transport_failure(&e, req)),
            };
        }

        // The body only feeds the client-error message; an unreadable one is not fatal.
        let body = match read_capped(resp, ERROR_BODY_MAX_BYTES).await {
            Ok((bytes, truncated)) => decode_body(bytes, truncated),
            Err(_) => String::new(),
        };
        let reason = status.canonical_reason().unwrap_or("");
        let failure = classify_status(status.as_u16(), reason, &body);
        tracing::warn!(
            url = %req.url,
            status = status.as_u16(),
            kind = %failure.kind,
            "upstream returned non-success status"
        );
        OutboundOutcome::Failure(failure)
    }
}
