use crate::extract;
use bravepipe_core::{
    validate_url, Config, ExtractedDocument, Executor, Failure, OutboundOutcome, OutboundRequest,
    RedirectPolicy,
};
use std::sync::Arc;
use std::time::Instant;

/// Fetch an arbitrary web page and reduce it to clean text.
#[derive(Clone)]
pub struct DocumentFetcher {
    executor: Arc<dyn Executor>,
    config: Arc<Config>,
}

impl DocumentFetcher {
    pub fn new(executor: Arc<dyn Executor>, config: Arc<Config>) -> Self {
        Self { executor, config }
    }

    /// Validate `url` and build the outbound request. Invalid input never reaches the network.
    pub fn request(&self, url: &str) -> Result<OutboundRequest, Failure> {
        if !validate_url(url) {
            return Err(Failure::validation(format!("invalid URL: {url}")));
        }
        let parsed = url::Url::parse(url).map_err(|e| Failure::validation(e.to_string()))?;
        Ok(OutboundRequest::get(parsed, self.config.fetch_timeout)
            .header("User-Agent", self.config.user_agent.as_str())
            .redirect(RedirectPolicy::Follow)
            .max_body_bytes(self.config.max_body_bytes))
    }

    pub async fn fetch(&self, url: &str) -> Result<ExtractedDocument, Failure> {
        let t0 = Instant::now();
        let req = self.request(url).inspect_err(|_| {
            tracing::warn!(url, "invalid URL format provided");
        })?;
        tracing::info!(url, "fetching document");
        let body = match self.executor.execute(&req).await {
            OutboundOutcome::Success { body, .. } => body,
            OutboundOutcome::Failure(f) => {
                tracing::warn!(url, kind = %f.kind, "document fetch failed: {f}");
                return Err(f);
            }
        };

        // HTML parsing is CPU-bound; keep it off the async workers.
        let max_chars = self.config.max_document_chars;
        let doc = tokio::task::spawn_blocking(move || extract::extract(&body, max_chars))
            .await
            .map_err(|e| {
                tracing::error!(url, "extraction task failed: {e}");
                Failure::parse(format!("extraction task failed: {e}"))
            })?;

        if doc.truncated {
            tracing::info!(url, max_chars, "content truncated");
        }
        tracing::info!(
            url,
            chars = doc.text.chars().count(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "fetched and cleaned document"
        );
        Ok(doc)
    }
}
