// src/error.rs
// =============================================================================
// Error types for link-auditor.
//
// There are two families:
// - ConfigError: something is wrong before any work starts (no URLs, the
//   output file can't be created). These are fatal.
// - AuditError: something went wrong while auditing ONE page or ONE link.
//   These never escape the page (or link) they belong to.
//
// The binary's top level still uses anyhow; these enums exist so the
// worker pool can tell failures apart and report them precisely.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Problems with the resolved configuration. Fatal for the whole run.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no urls were provided")]
    NoUrls,

    #[error("couldn't create output file '{}': {source}", path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A failure local to one page audit or one link check.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Network failure (DNS, refused connection, TLS, timeout, ...)
    #[error("failed to fetch '{url}': {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response arrived but its body could not be read
    #[error("failed to read body of '{url}': {source}")]
    ReadBody {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// An `href="` marker with no closing quote after it
    #[error("invalid href in body of HTML (unterminated value at byte {offset})")]
    MalformedContent { offset: usize },

    #[error("audit cancelled")]
    Cancelled,

    /// The worker auditing this page panicked or was aborted
    #[error("worker stopped before finishing this page: {reason}")]
    WorkerLost { reason: String },
}

impl AuditError {
    /// True for errors caused by the network rather than by page content.
    pub fn is_fetch(&self) -> bool {
        matches!(self, AuditError::Fetch { .. } | AuditError::ReadBody { .. })
    }
}
