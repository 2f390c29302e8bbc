// src/checker/http.rs
// =============================================================================
// This module checks if a URL is alive by making one HTTP request.
//
// Key functionality:
// - Builds the HTTP clients shared by every worker (pages and links)
// - Makes one GET request per link and times it
// - Classifies the status: anything above 399 is broken
// - Keeps network failures (DNS, refused, TLS, timeout) separate from a
//   broken status, so the caller can decide what to do with them
//
// Rust concepts:
// - async/await: For network I/O
// - tokio::select!: Race the request against a cancellation token
// - Result<T, E>: Network failures come back as Err, statuses as Ok
// =============================================================================

use reqwest::{redirect, Client};
use serde::{Serialize, Serializer};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::AuditError;

/// Redirect hops followed before a request gives up
const MAX_REDIRECTS: usize = 10;

// The outcome of checking one resolved URL
//
// #[derive(Serialize)] lets the reporter print it as JSON with --json
#[derive(Debug, Clone, Serialize)]
pub struct LinkStatus {
    /// The URL that was checked
    pub url: String,
    /// True when the status code is above 399
    pub broken: bool,
    pub status_code: u16,
    /// Time from sending the request to receiving the response headers
    #[serde(rename = "latency_ms", serialize_with = "as_millis")]
    pub latency: Duration,
}

/// 4xx and 5xx are broken; everything else, redirects included, is OK.
pub fn is_broken(status_code: u16) -> bool {
    status_code > 399
}

/// The HTTP clients shared by every worker.
///
/// Seed pages always follow redirects so a moved page still gets its
/// links audited. Link checks follow them too unless the run asked for
/// raw 3xx statuses with --no-follow-redirects.
#[derive(Debug, Clone)]
pub struct Clients {
    pub pages: Client,
    pub links: Client,
}

// Creates the clients used for page fetches and link checks
//
// The clients are built once per run and cloned into each worker.
// Cloning is cheap: it shares one connection pool internally. When both
// roles use the same redirect policy they share a single client.
pub fn build_clients(config: &Config) -> reqwest::Result<Clients> {
    let pages = client_with(config, redirect::Policy::limited(MAX_REDIRECTS))?;
    let links = if config.follow_redirects {
        pages.clone()
    } else {
        client_with(config, redirect::Policy::none())?
    };

    Ok(Clients { pages, links })
}

fn client_with(config: &Config, policy: redirect::Policy) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .redirect(policy)
        .user_agent(concat!("link-auditor/", env!("CARGO_PKG_VERSION")))
        .build()
}

// Checks a single link
//
// Parameters:
//   client: shared reqwest HTTP client
//   url: absolute URL to check
//   cancel: stops the request early when the run is interrupted
//
// Returns: LinkStatus, or AuditError::Fetch when no response arrived
pub async fn check_link(
    client: &Client,
    url: &str,
    cancel: &CancellationToken,
) -> Result<LinkStatus, AuditError> {
    let start = Instant::now();

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(AuditError::Cancelled),
        result = client.get(url).send() => result.map_err(|source| AuditError::Fetch {
            url: url.to_string(),
            source,
        })?,
    };

    let latency = start.elapsed();
    let status_code = response.status().as_u16();

    Ok(LinkStatus {
        url: url.to_string(),
        broken: is_broken(status_code),
        status_code,
        latency,
    })
}

/// Serializes a Duration as whole milliseconds.
pub(crate) fn as_millis<S: Serializer>(latency: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(latency.as_millis() as u64)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why GET and not HEAD?
//    - Some servers answer HEAD differently from GET (or not at all)
//    - A GET shows us what a browser would see
//    - We drop the response without reading the body, so we only pay for
//      the headers plus whatever the connection had already buffered
//
// 2. What does tokio::select! do?
//    - It polls several futures and runs the branch of whichever finishes
//      first; the others are dropped (which cancels them)
//
// 3. Why is a network error not "broken"?
//    - A 404 is an answer from the server; a DNS failure is not
//    - The page auditor decides how to count these (it skips them)
// -----------------------------------------------------------------------------
