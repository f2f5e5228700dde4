//! Maps raw failures onto the closed `ErrorKind` taxonomy.

use crate::{ErrorKind, Failure, OutboundOutcome};

/// Upstream error text shown to callers is cut to this many characters.
pub const MAX_UPSTREAM_MESSAGE_CHARS: usize = 100;

/// Classify an outcome. Failures carry their kind; a `Success` only reaches the
/// classifier when its body did not parse as expected, so it maps to `ParseError`.
pub fn classify(outcome: &OutboundOutcome) -> ErrorKind {
    match outcome {
        OutboundOutcome::Failure(f) => f.kind,
        OutboundOutcome::Success { .. } => ErrorKind::ParseError,
    }
}

/// Classify a non-2xx response. Total over all status codes: 401, 403 and 429 are
/// special-cased, everything at or above 500 is a server error, and every other
/// non-success status (including a 3xx that was not followed) is a client error.
pub fn classify_status(status: u16, reason: &str, body: &str) -> Failure {
    let kind = match status {
        401 => ErrorKind::AuthError,
        403 => ErrorKind::PermissionError,
        429 => ErrorKind::RateLimited,
        s if s >= 500 => ErrorKind::UpstreamServerError,
        _ => ErrorKind::ClientError,
    };
    let detail = match kind {
        ErrorKind::ClientError => upstream_message(body),
        _ => format!("HTTP {status} {reason}").trim_end().to_string(),
    };
    Failure::new(kind, detail).with_status(status, reason)
}

/// Best-effort upstream error text: a top-level JSON `message` string when present,
/// otherwise the raw body. Trimmed and cut to `MAX_UPSTREAM_MESSAGE_CHARS`.
pub fn upstream_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
    let raw = from_json.unwrap_or_else(|| body.to_string());
    raw.trim().chars().take(MAX_UPSTREAM_MESSAGE_CHARS).collect()
}
