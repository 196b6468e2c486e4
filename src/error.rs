// src/error.rs
// =============================================================================
// Error types for the analysis engine.
//
// There are two classes of failure:
// - Page-level (FetchError, ParseError): the page itself could not be
//   analyzed. These abort the analysis and reach the caller as AnalysisError.
// - Link-level (ProbeError): one link could not be reached. These never reach
//   the caller as errors; the verifier turns them into status code 0.
//
// We use `thiserror` here (library code) and `anyhow` only in main.rs.
// =============================================================================

use thiserror::Error;

/// The one error `Analyzer::analyze` can return.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The target page could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid page address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("request to {address} failed: {reason}")]
    Network { address: String, reason: String },

    #[error("request to {address} timed out")]
    Timeout { address: String },

    #[error("{address} responded with HTTP {status}")]
    Status { address: String, status: u16 },

    #[error("could not read body of {address}: {reason}")]
    Body { address: String, reason: String },

    #[error("body of {address} exceeds {limit} bytes")]
    TooLarge { address: String, limit: usize },

    #[error("analysis of {address} was cancelled")]
    Cancelled { address: String },
}

/// The fetched body is not a text document.
#[derive(Debug, Error)]
#[error("body is not an HTML document: {reason}")]
pub struct ParseError {
    pub reason: String,
}

/// A single existence probe got no usable response.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProbeError::Timeout
        } else if error.is_connect() {
            ProbeError::Connect(error.to_string())
        } else {
            ProbeError::Other(error.to_string())
        }
    }
}

/// A PAGE_ANALYZER_* environment variable held a value we could not use.
#[derive(Debug, Error)]
#[error("invalid value '{value}' for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}
