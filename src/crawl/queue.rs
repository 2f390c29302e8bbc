// src/crawl/queue.rs
// =============================================================================
// This module runs the worker pool that audits the seed pages.
//
// How it works:
// 1. Create one shared queue of seed URLs
// 2. Spawn ALL workers first, so the first handoff always has a taker
// 3. Push every seed onto the queue in input order, then close it
// 4. Each worker loops: take one seed, audit it to the end, take the next
// 5. Wait for every worker to finish and collect what each page produced
//
// Guarantees:
// - Every seed is audited exactly once and yields exactly one PageOutcome
// - With one worker, seeds are audited in input order; with more, any
//   worker may take any seed
// - A failed page is reported and recorded; it never stops the worker
//
// Rust concepts:
// - tokio::sync::mpsc: An async channel (many senders, ONE receiver)
// - Arc<Mutex<Receiver>>: Lets several workers share that one receiver
// - JoinHandle: The result of a spawned task, collected with join_all
// =============================================================================

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use super::page::{audit_page, PageSummary};
use crate::checker::Clients;
use crate::config::Config;
use crate::error::AuditError;
use crate::report::{Event, Reporter};

// tokio channels need room for at least one message; one is the closest
// we get to a direct handoff between the dispatcher and a worker
const QUEUE_CAPACITY: usize = 1;

type SeedQueue = Arc<Mutex<mpsc::Receiver<String>>>;

/// What happened to one seed page.
#[derive(Debug)]
pub struct PageOutcome {
    /// The seed exactly as it was given
    pub url: String,
    pub result: Result<PageSummary, AuditError>,
}

/// Everything a run produced, one entry per seed.
#[derive(Debug, Default)]
pub struct RunReport {
    pub pages: Vec<PageOutcome>,
}

impl RunReport {
    pub fn failed(&self) -> usize {
        self.pages.iter().filter(|p| p.result.is_err()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.pages.len() - self.failed()
    }
}

// Audits every seed in `config.urls` with `config.workers` workers
//
// Parameters:
//   config: shared, read-only run configuration
//   clients: HTTP clients, cloned into each worker
//   reporter: the one report every worker writes to
//   cancel: once cancelled, no more seeds are handed out
pub async fn dispatch(
    config: Arc<Config>,
    clients: Clients,
    reporter: Arc<Reporter>,
    cancel: CancellationToken,
) -> RunReport {
    let (tx, rx) = mpsc::channel::<String>(QUEUE_CAPACITY);
    let queue: SeedQueue = Arc::new(Mutex::new(rx));

    tracing::info!(workers = config.workers, seeds = config.urls.len(), "starting audit");

    let workers: Vec<_> = (0..config.workers)
        .map(|id| {
            tokio::spawn(worker(
                id,
                Arc::clone(&queue),
                clients.clone(),
                Arc::clone(&reporter),
                cancel.clone(),
            ))
        })
        .collect();

    // Workers hold the only receivers; if they all die, sends fail fast
    drop(queue);

    let mut report = RunReport::default();

    for (index, url) in config.urls.iter().enumerate() {
        let delivered = tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            result = tx.send(url.clone()) => result.is_ok(),
        };

        if !delivered {
            // Seeds nobody will take still get an outcome
            report.pages.extend(config.urls[index..].iter().map(|url| PageOutcome {
                url: url.clone(),
                result: Err(AuditError::Cancelled),
            }));
            break;
        }
    }

    // Closing the queue is the workers' signal to stop once it is drained
    drop(tx);

    let mut lost = None;
    for joined in join_all(workers).await {
        match joined {
            Ok(outcomes) => report.pages.extend(outcomes),
            Err(e) => {
                tracing::error!(error = %e, "worker task failed");
                lost = Some(e.to_string());
            }
        }
    }

    if let Some(reason) = lost {
        account_for_lost_seeds(&mut report, &config.urls, &reason);
    }

    tracing::info!(
        audited = report.succeeded(),
        failed = report.failed(),
        "audit finished"
    );

    report
}

// One worker: audits seeds until the queue is closed and empty
//
// The queue lock is held only while waiting for the next seed, never
// during an audit, so other workers can dequeue meanwhile.
async fn worker(
    id: usize,
    queue: SeedQueue,
    clients: Clients,
    reporter: Arc<Reporter>,
    cancel: CancellationToken,
) -> Vec<PageOutcome> {
    tracing::debug!(worker = id, "worker started");
    let mut outcomes = Vec::new();

    loop {
        let next = queue.lock().await.recv().await;
        let Some(url) = next else { break };

        tracing::debug!(worker = id, %url, "auditing page");
        let result = audit_page(&url, &clients, &reporter, &cancel).await;

        if let Err(error) = &result {
            tracing::debug!(worker = id, %url, network = error.is_fetch(), "page failed");
            reporter.emit(Event::PageFailed { url: &url, error });
        }
        outcomes.push(PageOutcome { url, result });
    }

    tracing::debug!(worker = id, pages = outcomes.len(), "worker finished");
    outcomes
}

// Gives every seed without an outcome a WorkerLost one
//
// A worker that panics takes the outcomes it already collected with it,
// so seeds are matched by count: a seed given twice needs two outcomes.
fn account_for_lost_seeds(report: &mut RunReport, urls: &[String], reason: &str) {
    let mut reported: HashMap<&str, usize> = HashMap::new();
    for page in &report.pages {
        *reported.entry(page.url.as_str()).or_default() += 1;
    }

    let mut missing = Vec::new();
    for url in urls {
        match reported.get_mut(url.as_str()) {
            Some(count) if *count > 0 => *count -= 1,
            _ => missing.push(PageOutcome {
                url: url.clone(),
                result: Err(AuditError::WorkerLost {
                    reason: reason.to_string(),
                }),
            }),
        }
    }

    report.pages.extend(missing);
}
