// src/checker/http.rs
// =============================================================================
// This module checks whether links are alive.
//
// Key functionality:
// - One HEAD request per distinct address, fragment ignored (no body download)
// - Each request has its own timeout; a timeout is never retried
// - Runs checks concurrently, with an upper bound on requests in flight
// - Can be told to stop early; anything not checked by then counts as dead
//
// Status rules:
// - Below 400: accessible
// - 400 and above: inaccessible, reported with that status code
// - No response at all (connect/DNS/TLS failure, timeout, stopped): inaccessible,
//   reported with status code 0
//
// Checking never fails. A dead link is a result, not an error.
// =============================================================================

use futures::stream::{self, StreamExt}; // StreamExt gives us .buffer_unordered()
use std::collections::HashMap;
use std::future::Future;
use std::pin::pin;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::client::HttpClient;

/// Status code recorded when a link produced no response
pub const NO_RESPONSE: u16 = 0;

#[derive(Debug, Clone, Copy)]
pub struct VerifyOptions {
    /// Maximum number of probes in flight at once
    pub concurrency: usize,
    /// Deadline for each individual probe
    pub per_request_timeout: Duration,
}

/// A resolved link waiting to be checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLink {
    /// Position of the link in the document
    pub index: usize,
    pub address: Url,
}

/// What the check found for one link occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkVerdict {
    pub index: usize,
    pub address: String,
    pub status_code: u16,
}

impl LinkVerdict {
    pub fn is_accessible(&self) -> bool {
        self.status_code != NO_RESPONSE && self.status_code < 400
    }
}

/// Checks every link and returns a verdict for each occurrence, in the
/// order of `links`.
///
/// When `stop` resolves, probes still running are dropped and their links
/// get `NO_RESPONSE`.
pub async fn probe_all<C, S>(
    client: &C,
    links: &[PendingLink],
    options: &VerifyOptions,
    stop: S,
) -> Vec<LinkVerdict>
where
    C: HttpClient + ?Sized,
    S: Future,
{
    // Probe each distinct resource once, in first-seen order. The fragment
    // never reaches the server, so `/a#x` and `/a#y` share one probe.
    let mut targets: Vec<Url> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut slot_of = Vec::with_capacity(links.len());
    for link in links {
        let mut target = link.address.clone();
        target.set_fragment(None);
        let slot = match slots.get(target.as_str()) {
            Some(&slot) => slot,
            None => {
                slots.insert(target.to_string(), targets.len());
                targets.push(target);
                targets.len() - 1
            }
        };
        slot_of.push(slot);
    }
    let target_count = targets.len();

    // Stream items are owned Urls so the whole future stays Send
    let timeout = options.per_request_timeout;
    let probes = stream::iter(targets.into_iter().enumerate())
        .map(move |(slot, url)| async move { (slot, probe_one(client, &url, timeout).await) })
        .buffer_unordered(options.concurrency.max(1));
    let mut outcomes = pin!(probes.take_until(stop));

    // The stream is the single collection point; nothing else touches statuses
    let mut statuses: Vec<Option<u16>> = vec![None; target_count];
    while let Some((slot, status_code)) = outcomes.next().await {
        statuses[slot] = Some(status_code);
    }

    let unreported = statuses.iter().filter(|s| s.is_none()).count();
    if unreported > 0 {
        debug!(unreported, "stopped before every link was checked");
    }

    links
        .iter()
        .zip(slot_of)
        .map(|(link, slot)| verdict(link, statuses[slot].unwrap_or(NO_RESPONSE)))
        .collect()
}

/// Like `probe_all`, but keeps only the links that failed.
pub async fn verify_all<C, S>(
    client: &C,
    links: &[PendingLink],
    options: &VerifyOptions,
    stop: S,
) -> Vec<LinkVerdict>
where
    C: HttpClient + ?Sized,
    S: Future,
{
    let mut verdicts = probe_all(client, links, options, stop).await;
    verdicts.retain(|v| !v.is_accessible());
    verdicts
}

fn verdict(link: &PendingLink, status_code: u16) -> LinkVerdict {
    LinkVerdict {
        index: link.index,
        address: link.address.to_string(),
        status_code,
    }
}

async fn probe_one<C>(client: &C, url: &Url, timeout: Duration) -> u16
where
    C: HttpClient + ?Sized,
{
    match tokio::time::timeout(timeout, client.probe(url)).await {
        Ok(Ok(status)) => {
            debug!(%url, status, "probed");
            status
        }
        Ok(Err(e)) => {
            debug!(%url, error = %e, "probe failed");
            NO_RESPONSE
        }
        Err(_) => {
            debug!(%url, ?timeout, "probe timed out");
            NO_RESPONSE
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does take_until do?
//    - It ends the stream as soon as the `stop` future completes
//    - Dropping the stream drops every request still running
//
// 2. What is pin!?
//    - `take_until` holds the `stop` future, which may not be Unpin
//    - .next() needs a pinned stream, and pin! pins it on the stack
// -----------------------------------------------------------------------------
