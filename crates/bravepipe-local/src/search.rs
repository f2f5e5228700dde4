use bravepipe_core::{
    Config, Executor, Failure, OutboundOutcome, OutboundRequest, QueryParams, RedirectPolicy,
    SearchHit, SearchParams,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Deserialize)]
struct BraveWebSearchResponse {
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    // Kept untyped: each element is projected field-by-field into a SearchHit.
    results: Option<Vec<serde_json::Value>>,
}

/// Parse a Brave web-search body into hits.
///
/// - not JSON at all -> `ParseError`
/// - JSON without an object `web` holding a `results` array -> `UnexpectedFormat`
pub fn parse_web_results(body: &str) -> Result<Vec<SearchHit>, Failure> {
    let v: serde_json::Value =
        serde_json::from_str(body).map_err(|e| Failure::parse(e.to_string()))?;
    let parsed: BraveWebSearchResponse = serde_json::from_value(v)
        .map_err(|e| Failure::unexpected_format(e.to_string()))?;
    let results = parsed
        .web
        .ok_or_else(|| Failure::unexpected_format("missing `web`"))?
        .results
        .ok_or_else(|| Failure::unexpected_format("missing `web.results`"))?;
    Ok(results.iter().map(SearchHit::from_json).collect())
}

/// Brave web search over an injected executor.
#[derive(Clone)]
pub struct BraveSearch {
    executor: Arc<dyn Executor>,
    config: Arc<Config>,
}

impl BraveSearch {
    pub fn new(executor: Arc<dyn Executor>, config: Arc<Config>) -> Self {
        Self { executor, config }
    }

    pub fn request(&self, p: &SearchParams) -> Result<OutboundRequest, Failure> {
        let mut url = url::Url::parse(&self.config.web_search_url())
            .map_err(|e| Failure::network(format!("invalid search endpoint: {e}")))?;
        let search_lang = p
            .search_lang
            .clone()
            .or_else(|| self.config.search_lang.clone());
        QueryParams::new()
            .set("q", &p.query)
            .set("count", p.count)
            .set("offset", p.offset)
            .set_opt("search_lang", search_lang)
            .apply_to(&mut url);
        Ok(OutboundRequest::get(url, self.config.search_timeout)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", self.config.brave_api_key.as_str())
            .redirect(RedirectPolicy::None)
            .max_body_bytes(self.config.max_body_bytes))
    }

    pub async fn search(&self, p: &SearchParams) -> Result<Vec<SearchHit>, Failure> {
        let t0 = Instant::now();
        tracing::info!(query = %p.query, count = p.count, offset = p.offset, "performing search");
        let req = self.request(p)?;
        let body = match self.executor.execute(&req).await {
            OutboundOutcome::Success { body, .. } => body,
            OutboundOutcome::Failure(f) => {
                tracing::warn!(query = %p.query, kind = %f.kind, "search failed: {f}");
                return Err(f);
            }
        };
        let hits = parse_web_results(&body).inspect_err(|f| {
            let preview: String = body.chars().take(200).collect();
            tracing::warn!(query = %p.query, kind = %f.kind, detail = %f.detail, "unusable search response: {preview}");
        })?;
        tracing::info!(
            query = %p.query,
            results = hits.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "search completed"
        );
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bravepipe_core::{validate_search, ErrorKind};
    use std::sync::Mutex;

    /// Returns a canned outcome and records what it was asked to send.
    struct Scripted {
        outcome: OutboundOutcome,
        seen: Mutex<Vec<OutboundRequest>>,
    }

    #[async_trait::async_trait]
    impl Executor for Scripted {
        async fn execute(&self, req: &OutboundRequest) -> OutboundOutcome {
            self.seen.lock().unwrap().push(req.clone());
            self.outcome.clone()
        }
    }

    fn scripted(outcome: OutboundOutcome) -> Arc<Scripted> {
        Arc::new(Scripted {
            outcome,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn ok(body: serde_json::Value) -> OutboundOutcome {
        OutboundOutcome::Success {
            status: 200,
            body: body.to_string(),
        }
    }

    #[test]
    fn parses_minimal_brave_shape() {
        let js = r#"
        {
          "web": {
            "results": [
              {"url":"https://example.com","title":"Example","description":"Hello"},
              {"title":"No url or description"}
            ]
          }
        }
        "#;
        let hits = parse_web_results(js).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://example.com");
        assert_eq!(hits[0].description, "Hello");
        assert_eq!(hits[1].url, "No URL available");
        assert_eq!(hits[1].description, "No description available");
    }

    #[test]
    fn shape_errors_are_distinguished() {
        assert_eq!(parse_web_results("<html>").unwrap_err().kind, ErrorKind::ParseError);
        for body in [
            r#"{}"#,
            r#"{"query":{"original":"x"}}"#,
            r#"{"web":{}}"#,
            r#"{"web":"nope"}"#,
            r#"{"web":{"results":{"a":1}}}"#,
        ] {
            assert_eq!(
                parse_web_results(body).unwrap_err().kind,
                ErrorKind::UnexpectedFormat,
                "body={body}"
            );
        }
        assert!(parse_web_results(r#"{"web":{"results":[]}}"#).unwrap().is_empty());
    }

    #[tokio::test]
    async fn builds_request_with_credential_and_params() {
        let ex = scripted(ok(serde_json::json!({"web": {"results": []}})));
        let mut cfg = Config::new("secret-token");
        cfg.brave_endpoint = "http://127.0.0.1:9/res/v1/".to_string();
        let s = BraveSearch::new(ex.clone(), Arc::new(cfg));
        let p = validate_search("rust lang", 5, 10, None).unwrap();
        assert!(s.search(&p).await.unwrap().is_empty());

        let seen = ex.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let req = &seen[0];
        assert_eq!(req.url.path(), "/res/v1/web/search");
        assert_eq!(
            req.url.query(),
            Some("q=rust+lang&count=5&offset=10&search_lang=en")
        );
        assert_eq!(req.redirect, RedirectPolicy::None);
        assert_eq!(req.max_body_bytes, Some(5_000_000));
        assert_eq!(req.timeout, std::time::Duration::from_secs(10));
        assert!(req
            .headers
            .contains(&("Accept".to_string(), "application/json".to_string())));
        assert!(req.headers.contains(&(
            "X-Subscription-Token".to_string(),
            "secret-token".to_string()
        )));
    }

    #[tokio::test]
    async fn call_level_search_lang_overrides_config() {
        let ex = scripted(ok(serde_json::json!({"web": {"results": []}})));
        let s = BraveSearch::new(ex.clone(), Arc::new(Config::new("k")));
        let p = validate_search("q", 1, 0, Some("de".to_string())).unwrap();
        s.search(&p).await.unwrap();
        let query = ex.seen.lock().unwrap()[0].url.query().unwrap_or("").to_string();
        assert!(query.ends_with("search_lang=de"), "{query}");
    }

    #[tokio::test]
    async fn executor_failures_pass_through() {
        let f = Failure::new(ErrorKind::RateLimited, "HTTP 429").with_status(429, "Too Many Requests");
        let s = BraveSearch::new(
            scripted(OutboundOutcome::Failure(f.clone())),
            Arc::new(Config::new("k")),
        );
        let p = validate_search("q", 1, 0, None).unwrap();
        assert_eq!(s.search(&p).await.unwrap_err(), f);
    }
}
