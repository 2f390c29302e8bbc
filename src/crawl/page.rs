// src/crawl/page.rs
// =============================================================================
// This module audits ONE seed page.
//
// How it works:
// 1. Add "https://" if the seed has no scheme
// 2. Fetch the page (following redirects) and read the whole body
// 3. Scan the body for href values (checker::extract_links)
// 4. For each value, in page order: resolve it, check it, report it
// 5. Report a summary line for the page
//
// Failure containment:
// - A link whose check fails on the network is reported as SKIPPED and
//   counted apart; the next link is checked as usual
// - A failed page fetch or an unterminated href fails the whole page
//   (returned as Err); the worker reports it and moves on to the next seed
//
// Rust concepts:
// - The ? operator inside a for loop: stops at the first malformed href
// - Borrowing: the auditor only borrows the clients, reporter and token
// =============================================================================

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::checker::{as_millis, check_link, extract_links, resolve, Clients, LinkStatus};
use crate::error::AuditError;
use crate::report::{Event, Reporter};

// Running totals for one page, reported once at the end of its audit
#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    /// The page URL, after the scheme was added if needed
    pub url: String,
    pub ok: usize,
    pub broken: usize,
    /// Links whose check failed before any status came back
    pub skipped: usize,
    /// Sum of the response times of every checked link
    #[serde(rename = "latency_ms", serialize_with = "as_millis")]
    pub latency: Duration,
}

impl PageSummary {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ok: 0,
            broken: 0,
            skipped: 0,
            latency: Duration::ZERO,
        }
    }

    /// Links that returned a status (OK + broken); skipped links don't count.
    pub fn checked(&self) -> usize {
        self.ok + self.broken
    }

    fn record(&mut self, status: &LinkStatus) {
        if status.broken {
            self.broken += 1;
        } else {
            self.ok += 1;
        }
        self.latency += status.latency;
    }
}

// Audits every link found on `seed`
//
// Returns: the page summary, or the error that stopped this page
pub async fn audit_page(
    seed: &str,
    clients: &Clients,
    reporter: &Reporter,
    cancel: &CancellationToken,
) -> Result<PageSummary, AuditError> {
    reporter.emit(Event::PageStarted { url: seed });

    let page_url = if has_scheme(seed) {
        seed.to_string()
    } else {
        reporter.emit(Event::SchemeAssumed { url: seed });
        format!("https://{}", seed)
    };

    Url::parse(&page_url).map_err(|e| AuditError::InvalidUrl {
        url: page_url.clone(),
        reason: e.to_string(),
    })?;

    let body = fetch_body(&clients.pages, &page_url, cancel).await?;
    let mut summary = PageSummary::new(&page_url);

    for href in extract_links(&body) {
        let href = href?;
        let link = resolve(&page_url, &href);

        match check_link(&clients.links, &link, cancel).await {
            Ok(status) => {
                reporter.emit(Event::Link(&status));
                summary.record(&status);
            }
            Err(AuditError::Cancelled) => return Err(AuditError::Cancelled),
            Err(error) => {
                reporter.emit(Event::LinkSkipped { url: &link, error: &error });
                summary.skipped += 1;
            }
        }
    }

    reporter.emit(Event::PageFinished(&summary));
    Ok(summary)
}

// Pages are fetched as-is, whatever their status code; the body of an
// error page can still have links worth checking. Redirects are followed
// by the page client, but links still resolve against the seed URL.
async fn fetch_body(
    client: &Client,
    url: &str,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, AuditError> {
    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(AuditError::Cancelled),
        result = client.get(url).send() => result.map_err(|source| AuditError::Fetch {
            url: url.to_string(),
            source,
        })?,
    };

    tracing::debug!(url, status = response.status().as_u16(), "fetched page");

    let body = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(AuditError::Cancelled),
        result = response.bytes() => result.map_err(|source| AuditError::ReadBody {
            url: url.to_string(),
            source,
        })?,
    };

    Ok(body.to_vec())
}

fn has_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::build_clients;
    use crate::config::Config;
    use crate::report::MemorySink;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, at: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(status).set_body_string(body.to_string()))
            .mount(server)
            .await;
    }

    fn client() -> Clients {
        build_clients(&Config::for_tests()).unwrap()
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("http://a.com"));
        assert!(has_scheme("https://a.com"));
        assert!(!has_scheme("a.com"));
        assert!(!has_scheme("httpbin.org"));
    }

    #[tokio::test]
    async fn test_audit_counts_ok_and_broken() {
        let server = MockServer::start().await;
        let html = r##"
            <a href="/ok">root-relative</a>
            <a href="page.html">relative</a>
            <a href="/missing">gone</a>
            <a href="#top">fragment</a>
        "##;
        mount(&server, "/site/", 200, html).await;
        mount(&server, "/ok", 200, "").await;
        mount(&server, "/site/page.html", 200, "").await;
        mount(&server, "/missing", 404, "").await;

        let sink = MemorySink::default();
        let reporter = sink.reporter(false);
        let seed = format!("{}/site/", server.uri());

        let summary = audit_page(&seed, &client(), &reporter, &CancellationToken::new())
            .await
            .unwrap();

        // "#top" resolves to the page itself, which answers 200
        assert_eq!(summary.ok, 3);
        assert_eq!(summary.broken, 1);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.checked(), 4);

        let lines = sink.lines();
        assert!(lines[0].contains(&format!("Fetching links for url '{}'", seed)));
        assert!(lines[1].contains(&format!("OK(200) '{}/ok'", server.uri())));
        assert!(lines[2].contains(&format!("OK(200) '{}/site/page.html'", server.uri())));
        assert!(lines[3].contains(&format!("BROKEN(404) '{}/missing'", server.uri())));
        assert!(lines[4].contains(&format!("OK(200) '{}/site/#top'", server.uri())));
        assert!(lines[5].contains("checked 4 urls, 3 OK, 1 BROKEN, 0 SKIPPED"));
        assert_eq!(lines.len(), 6);
    }

    #[tokio::test]
    async fn test_unreachable_link_is_skipped() {
        let server = MockServer::start().await;
        let html = r#"<a href="http://127.0.0.1:1/down">down</a><a href="/ok">ok</a>"#;
        mount(&server, "/", 200, html).await;
        mount(&server, "/ok", 200, "").await;

        let sink = MemorySink::default();
        let summary = audit_page(
            &format!("{}/", server.uri()),
            &client(),
            &sink.reporter(false),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.ok, 1);
        assert_eq!(summary.broken, 0);

        let lines = sink.lines();
        assert!(lines[1].contains("SKIPPED 'http://127.0.0.1:1/down'"));
        assert!(lines[2].contains("OK(200)"));
    }

    #[tokio::test]
    async fn test_malformed_body_fails_page() {
        let server = MockServer::start().await;
        mount(&server, "/", 200, r#"<a href="/ok">ok</a><a href="/never-closed"#).await;
        mount(&server, "/ok", 200, "").await;

        let sink = MemorySink::default();
        let result = audit_page(
            &format!("{}/", server.uri()),
            &client(),
            &sink.reporter(false),
            &CancellationToken::new(),
        )
        .await;

        assert!(matches!(result, Err(AuditError::MalformedContent { .. })));

        // The link before the bad one was still checked; no summary line
        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("OK(200)"));
    }

    #[tokio::test]
    async fn test_unreachable_page_is_fetch_error() {
        let sink = MemorySink::default();
        let result = audit_page(
            "http://127.0.0.1:1/",
            &client(),
            &sink.reporter(false),
            &CancellationToken::new(),
        )
        .await;

        assert!(result.unwrap_err().is_fetch());
        assert_eq!(sink.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_seed_without_scheme_gets_https() {
        let sink = MemorySink::default();
        // "not a host" can't parse as a URL once https:// is added
        let result = audit_page(
            "not a host",
            &client(),
            &sink.reporter(false),
            &CancellationToken::new(),
        )
        .await;

        assert!(matches!(result, Err(AuditError::InvalidUrl { ref url, .. }) if url == "https://not a host"));
        let lines = sink.lines();
        assert!(lines[1].contains("No protocol specified for url 'not a host', assuming HTTPS"));
    }

    #[tokio::test]
    async fn test_error_page_body_is_still_audited() {
        let server = MockServer::start().await;
        mount(&server, "/missing-page/", 404, r#"<a href="/home">home</a>"#).await;
        mount(&server, "/home", 200, "").await;

        let summary = audit_page(
            &format!("{}/missing-page/", server.uri()),
            &client(),
            &MemorySink::default().reporter(false),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.ok, 1);
    }

    #[tokio::test]
    async fn test_page_without_links() {
        let server = MockServer::start().await;
        mount(&server, "/", 200, "<p>nothing here</p>").await;

        let summary = audit_page(
            &server.uri(),
            &client(),
            &MemorySink::default().reporter(false),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.checked(), 0);
        assert_eq!(summary.latency, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_cancelled_audit() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = audit_page(
            "http://127.0.0.1:1/",
            &client(),
            &MemorySink::default().reporter(false),
            &cancel,
        )
        .await;

        assert!(matches!(result, Err(AuditError::Cancelled)));
    }

    #[tokio::test]
    async fn test_redirected_seed_is_still_audited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
            .mount(&server)
            .await;
        mount(&server, "/new", 200, r#"<a href="/a">a</a><a href="/b">b</a>"#).await;
        mount(&server, "/a", 200, "").await;
        mount(&server, "/b", 404, "").await;

        let strict = Config {
            follow_redirects: false,
            ..Config::for_tests()
        };

        for clients in [client(), build_clients(&strict).unwrap()] {
            let summary = audit_page(
                &format!("{}/old", server.uri()),
                &clients,
                &MemorySink::default().reporter(false),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

            assert_eq!(summary.checked(), 2);
            assert_eq!(summary.ok, 1);
            assert_eq!(summary.broken, 1);
        }
    }

    #[tokio::test]
    async fn test_slow_page_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<a href="/x">x</a>"#)
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = Config {
            timeout: Duration::from_millis(300),
            ..Config::for_tests()
        };
        let sink = MemorySink::default();
        let result = audit_page(
            &server.uri(),
            &build_clients(&config).unwrap(),
            &sink.reporter(false),
            &CancellationToken::new(),
        )
        .await;

        assert!(result.unwrap_err().is_fetch());
        // Only the "Fetching links" line; no links, no summary
        assert_eq!(sink.lines().len(), 1);
    }
}
