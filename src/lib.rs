// src/lib.rs
// =============================================================================
// page-analyzer: analyze one web page.
//
// Give it a page address and it returns a PageAnalysis:
// - document version, title, heading counts, login form presence
// - how many links are internal and external
// - which links are broken, in the order they appear on the page
//
// The HTTP client is passed in (see `HttpClient`), so a host can share its
// own client and tests can use a fake one.
//
// Modules:
// - analyze: the Analyzer, which runs the whole thing
// - checker: parsing, link resolution, link checking
// - client: the HttpClient trait and its reqwest implementation
// - model: the result types
// - config, error: settings and error types
// =============================================================================

pub mod analyze;
pub mod checker;
pub mod client;
pub mod config;
pub mod error;
pub mod model;

#[cfg(test)]
mod testing;

pub use analyze::Analyzer;
pub use client::{HttpClient, ReqwestClient};
pub use config::AnalyzerConfig;
pub use error::{AnalysisError, ConfigError, FetchError, ParseError, ProbeError};
pub use model::{
    DocumentVersion, HeadingCounts, LinkCheckResult, LinkKind, LinkRecord, PageAnalysis,
    PageMetadata,
};
pub use tokio_util::sync::CancellationToken;
