// src/report.rs
// =============================================================================
// The report: one line per event, written to the output file and (unless
// --silent) echoed to stdout.
//
// Every worker reports through the same Reporter. All sinks sit behind a
// single Mutex and a line is fully formatted before the lock is taken, then
// written to every sink while it is held. Two workers can never interleave
// parts of their lines.
//
// Line shapes (text mode):
//   2024/01/23 01:23:23 [link-auditor] | OK(200) 'https://a.com/x' (response time: 41.2ms)
// With --json each event is one JSON object per line instead.
// =============================================================================

use chrono::Local;
use serde_json::json;
use std::fs::File;
use std::io::{self, Write};
use std::sync::Mutex;

use crate::checker::LinkStatus;
use crate::config::Config;
use crate::crawl::PageSummary;
use crate::error::{AuditError, ConfigError};

const PREFIX: &str = "[link-auditor] | ";

/// Something that happened during a run, worth one report line.
#[derive(Debug)]
pub enum Event<'a> {
    PageStarted { url: &'a str },
    SchemeAssumed { url: &'a str },
    Link(&'a LinkStatus),
    LinkSkipped { url: &'a str, error: &'a AuditError },
    PageFinished(&'a PageSummary),
    PageFailed { url: &'a str, error: &'a AuditError },
}

pub struct Reporter {
    sinks: Mutex<Vec<Box<dyn Write + Send>>>,
    json: bool,
}

impl Reporter {
    pub fn new(sinks: Vec<Box<dyn Write + Send>>, json: bool) -> Self {
        Self {
            sinks: Mutex::new(sinks),
            json,
        }
    }

    /// Creates the output file, plus stdout unless the run is silent.
    pub fn create(config: &Config) -> Result<Self, ConfigError> {
        let file = File::create(&config.output).map_err(|source| ConfigError::CreateOutput {
            path: config.output.clone(),
            source,
        })?;

        let mut sinks: Vec<Box<dyn Write + Send>> = vec![Box::new(file)];
        if !config.silent {
            sinks.push(Box::new(io::stdout()));
        }

        Ok(Self::new(sinks, config.json))
    }

    pub fn emit(&self, event: Event<'_>) {
        let line = if self.json {
            format_json(&event)
        } else {
            format_text(&event)
        };

        // Still usable if a thread panicked while holding the lock
        let mut sinks = self.sinks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for sink in sinks.iter_mut() {
            if let Err(e) = sink.write_all(line.as_bytes()).and_then(|_| sink.flush()) {
                tracing::warn!(error = %e, "failed to write report line");
            }
        }
    }
}

fn format_text(event: &Event<'_>) -> String {
    let message = match event {
        Event::PageStarted { url } => format!("Fetching links for url '{}'", url),
        Event::SchemeAssumed { url } => {
            format!("No protocol specified for url '{}', assuming HTTPS", url)
        }
        Event::Link(status) => format!(
            "{}({}) '{}' (response time: {:?})",
            if status.broken { "BROKEN" } else { "OK" },
            status.status_code,
            status.url,
            status.latency
        ),
        Event::LinkSkipped { url, error } => format!("SKIPPED '{}': {}", url, error),
        Event::PageFinished(summary) => format!(
            "Finished checking urls for '{}' in {:?}: checked {} urls, {} OK, {} BROKEN, {} SKIPPED",
            summary.url,
            summary.latency,
            summary.checked(),
            summary.ok,
            summary.broken,
            summary.skipped
        ),
        Event::PageFailed { url, error } => format!("FAILED '{}': {}", url, error),
    };

    format!(
        "{} {}{}\n",
        Local::now().format("%Y/%m/%d %H:%M:%S"),
        PREFIX,
        message
    )
}

fn format_json(event: &Event<'_>) -> String {
    let mut value = match event {
        Event::PageStarted { url } => json!({ "event": "page_started", "url": url }),
        Event::SchemeAssumed { url } => json!({ "event": "scheme_assumed", "url": url }),
        Event::Link(status) => json!({ "event": "link", "link": status }),
        Event::LinkSkipped { url, error } => {
            json!({ "event": "link_skipped", "url": url, "error": error.to_string() })
        }
        Event::PageFinished(summary) => json!({ "event": "page_finished", "page": summary }),
        Event::PageFailed { url, error } => {
            json!({ "event": "page_failed", "url": url, "error": error.to_string() })
        }
    };
    value["time"] = json!(Local::now().to_rfc3339());

    format!("{}\n", value)
}

#[cfg(test)]
pub(crate) use memory::MemorySink;
