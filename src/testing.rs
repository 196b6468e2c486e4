// src/testing.rs
// Scripted HttpClient for unit tests. No sockets are opened.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

use crate::client::HttpClient;
use crate::error::{FetchError, ProbeError};

#[derive(Debug, Clone)]
pub enum Scripted {
    /// Respond with this status after `delay`
    Status(u16, Duration),
    /// Connection refused
    Refused,
    /// Never answer
    Hang,
}

#[derive(Default)]
pub struct FakeClient {
    pages: HashMap<String, Result<String, ()>>,
    probes: HashMap<String, Scripted>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub requested: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn unreachable_page(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), Err(()));
        self
    }

    pub fn link(mut self, url: &str, response: Scripted) -> Self {
        self.probes.insert(url.to_string(), response);
        self
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        self.link(url, Scripted::Status(status, Duration::ZERO))
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requested.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl HttpClient for FakeClient {
    async fn get_page(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        match self.pages.get(url.as_str()) {
            Some(Ok(body)) => Ok(body.clone().into_bytes()),
            Some(Err(())) | None => Err(FetchError::Network {
                address: url.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }

    async fn probe(&self, url: &Url) -> Result<u16, ProbeError> {
        self.requested.lock().unwrap().push(url.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = match self.probes.get(url.as_str()).cloned() {
            Some(Scripted::Status(status, delay)) => {
                tokio::time::sleep(delay).await;
                Ok(status)
            }
            Some(Scripted::Hang) => std::future::pending().await,
            Some(Scripted::Refused) | None => Err(ProbeError::Connect("connection refused".into())),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
