// src/client.rs
// =============================================================================
// The network capability the analyzer depends on.
//
// The analyzer never builds its own HTTP client. It is handed something that
// implements `HttpClient`, which can:
// - GET a page and hand back the whole body
// - probe a link with HEAD and hand back only the status code
//
// `ReqwestClient` is the real implementation. Tests pass in fakes with
// scripted responses instead.
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::config::AnalyzerConfig;
use crate::error::{FetchError, ProbeError};

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Full GET of the page to analyze. Non-2xx responses are errors.
    async fn get_page(&self, url: &Url) -> Result<Vec<u8>, FetchError>;

    /// Lightweight existence check. Any response is Ok, whatever its status.
    async fn probe(&self, url: &Url) -> Result<u16, ProbeError>;
}

/// reqwest-backed HttpClient
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
    page_timeout: Duration,
    probe_timeout: Duration,
    max_body_bytes: usize,
}

impl ReqwestClient {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, reqwest::Error> {
        // One client for everything, so probes share the connection pool
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(ReqwestClient {
            client,
            page_timeout: config.page_timeout(),
            probe_timeout: config.probe_timeout(),
            max_body_bytes: config.max_body_bytes,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get_page(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let address = url.to_string();

        let mut response = self
            .client
            .get(url.clone())
            .timeout(self.page_timeout)
            .send()
            .await
            .map_err(|e| fetch_error(&address, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                address,
                status: status.as_u16(),
            });
        }

        // Read chunk by chunk so an endless body cannot eat all our memory
        let mut body = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if body.len() + chunk.len() > self.max_body_bytes {
                        return Err(FetchError::TooLarge {
                            address,
                            limit: self.max_body_bytes,
                        });
                    }
                    body.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) if e.is_timeout() => return Err(FetchError::Timeout { address }),
                Err(e) => {
                    return Err(FetchError::Body {
                        address,
                        reason: e.to_string(),
                    })
                }
            }
        }

        Ok(body)
    }

    async fn probe(&self, url: &Url) -> Result<u16, ProbeError> {
        let response = self
            .client
            .head(url.clone())
            .timeout(self.probe_timeout)
            .send()
            .await?;

        Ok(response.status().as_u16())
    }
}

fn fetch_error(address: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            address: address.to_string(),
        }
    } else {
        FetchError::Network {
            address: address.to_string(),
            reason: error.to_string(),
        }
    }
}
