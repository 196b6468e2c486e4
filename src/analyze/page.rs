// src/analyze/page.rs
// =============================================================================
// The Analyzer: fetch, parse, resolve, verify, assemble.
//
// Failure policy:
// - If the page cannot be fetched or parsed, the caller gets an AnalysisError
//   and nothing else. There is no partial result for a page we never saw.
// - If a link cannot be reached, that is part of the result. It shows up in
//   broken_links and still counts as internal or external.
//
// Cancellation:
// - The caller may pass a CancellationToken, and the config may set an
//   overall deadline. Whichever fires first stops the analysis.
// - During the page fetch, stopping is a fetch failure.
// - During link checking, stopping ends the checks early and every link that
//   has not been checked yet is reported with status code 0.
// =============================================================================

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::checker::{classify, parse_document, probe_all, resolve, PendingLink, VerifyOptions};
use crate::client::{HttpClient, ReqwestClient};
use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, FetchError};
use crate::model::{LinkRecord, PageAnalysis};

/// Analyzes pages with an injected HTTP client.
///
/// Holds no state between calls; one Analyzer can serve any number of
/// concurrent `analyze` calls.
#[derive(Debug, Clone)]
pub struct Analyzer<C = ReqwestClient> {
    client: C,
    config: AnalyzerConfig,
}

impl Analyzer<ReqwestClient> {
    /// Analyzer backed by a real reqwest client built from `config`.
    pub fn from_config(config: AnalyzerConfig) -> Result<Self, reqwest::Error> {
        let client = ReqwestClient::new(&config)?;
        Ok(Analyzer { client, config })
    }
}

// Why the analysis stopped early
#[derive(Debug, Clone, Copy)]
enum Halt {
    Cancelled,
    DeadlineExpired,
}

impl<C: HttpClient> Analyzer<C> {
    pub fn new(client: C, config: AnalyzerConfig) -> Self {
        Analyzer { client, config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Analyzes the page at `page_address`.
    pub async fn analyze(&self, page_address: &str) -> Result<PageAnalysis, AnalysisError> {
        self.analyze_with_cancel(page_address, &CancellationToken::new())
            .await
    }

    /// Same as `analyze`, but stops when `cancel` is triggered.
    pub async fn analyze_with_cancel(
        &self,
        page_address: &str,
        cancel: &CancellationToken,
    ) -> Result<PageAnalysis, AnalysisError> {
        let deadline = self.config.deadline().map(|budget| Instant::now() + budget);
        let page = parse_page_address(page_address)?;

        info!(url = %page, "analyzing page");

        // biased: a stop request wins even if the body is already there
        let body = tokio::select! {
            biased;
            halt = halted(cancel, deadline) => Err(match halt {
                Halt::Cancelled => FetchError::Cancelled { address: page.to_string() },
                Halt::DeadlineExpired => FetchError::Timeout { address: page.to_string() },
            }),
            result = self.client.get_page(&page) => result,
        };
        let body = body.inspect_err(|e| warn!(url = %page, error = %e, "page fetch failed"))?;

        let parsed = parse_document(&body, &page)
            .inspect_err(|e| warn!(url = %page, error = %e, "page parse failed"))?;

        // host_str() is Some, parse_page_address checked it
        let page_host = page.host_str().unwrap_or_default();

        let mut pending = Vec::with_capacity(parsed.hrefs.len());
        let mut kinds = Vec::with_capacity(parsed.hrefs.len());
        for href in &parsed.hrefs {
            if let Some(address) = resolve(href, &parsed.base) {
                kinds.push(classify(&address, page_host));
                pending.push(PendingLink {
                    index: pending.len(),
                    address,
                });
            }
        }
        debug!(
            found = parsed.hrefs.len(),
            resolved = pending.len(),
            "resolved page links"
        );

        let options = VerifyOptions {
            concurrency: self.config.concurrency,
            per_request_timeout: self.config.probe_timeout(),
        };
        let mut verdicts =
            probe_all(&self.client, &pending, &options, halted(cancel, deadline)).await;

        // Back into document order
        verdicts.sort_by_key(|v| v.index);

        let links: Vec<LinkRecord> = verdicts
            .into_iter()
            .map(|v| LinkRecord {
                kind: kinds[v.index],
                inaccessible: !v.is_accessible(),
                status_code: v.status_code,
                address: v.address,
            })
            .collect();

        let analysis = PageAnalysis::assemble(page.to_string(), parsed.metadata, links);

        info!(
            url = %page,
            internal = analysis.internal_link_count,
            external = analysis.external_link_count,
            inaccessible = analysis.inaccessible_count,
            "analysis complete"
        );

        Ok(analysis)
    }
}

fn parse_page_address(page_address: &str) -> Result<Url, FetchError> {
    let invalid = |reason: &str| FetchError::InvalidAddress {
        address: page_address.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(page_address.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("only http and https pages can be analyzed"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("address has no host"));
    }
    Ok(url)
}

// Resolves when the caller cancels or the deadline passes
async fn halted(cancel: &CancellationToken, deadline: Option<Instant>) -> Halt {
    match deadline {
        Some(at) => tokio::select! {
            _ = cancel.cancelled() => Halt::Cancelled,
            _ = tokio::time::sleep_until(at) => Halt::DeadlineExpired,
        },
        None => {
            cancel.cancelled().await;
            Halt::Cancelled
        }
    }
}
