//! Caller input checks. Nothing here touches the network.

use crate::Failure;
use serde::{Deserialize, Serialize};

/// Upstream cap on results per search call, enforced client-side.
pub const MAX_RESULTS_PER_REQUEST: u32 = 20;

/// True iff `candidate` is an absolute `http`/`https` URL with a non-empty host.
///
/// Never fails: unparseable input is simply invalid.
pub fn validate_url(candidate: &str) -> bool {
    // Same leading/trailing C0-or-space trim the URL parser applies.
    let candidate = candidate.trim_matches(|c: char| c <= ' ');
    let Ok(parsed) = url::Url::parse(candidate) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    // The url crate accepts `http:example.com`; require an explicit authority.
    let Some((scheme, rest)) = candidate.split_once(':') else {
        return false;
    };
    if !scheme.eq_ignore_ascii_case(parsed.scheme()) || !rest.starts_with("//") {
        return false;
    }
    parsed.host_str().is_some_and(|h| !h.is_empty())
}

/// Validated search arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub count: u32,
    pub offset: u32,
    pub search_lang: Option<String>,
}

/// Reject (never clamp) out-of-range search arguments.
pub fn validate_search(
    query: &str,
    count: i64,
    offset: i64,
    search_lang: Option<String>,
) -> Result<SearchParams, Failure> {
    if query.trim().is_empty() {
        return Err(Failure::validation("search query cannot be empty"));
    }
    if count < 1 || count > i64::from(MAX_RESULTS_PER_REQUEST) {
        return Err(Failure::validation(format!(
            "count must be between 1 and {MAX_RESULTS_PER_REQUEST}"
        )));
    }
    if offset < 0 {
        return Err(Failure::validation("offset must be non-negative"));
    }
    let offset = u32::try_from(offset).map_err(|_| Failure::validation("offset is too large"))?;
    let search_lang = search_lang
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    Ok(SearchParams {
        query: query.to_string(),
        count: count as u32,
        offset,
        search_lang,
    })
}
