// src/config.rs
// =============================================================================
// The resolved, validated configuration for one run.
//
// main.rs builds a Config once from the parsed Cli and wraps it in an Arc.
// The dispatcher, every worker and every page audit read from that same
// value; nothing mutates it afterwards and there is no global state.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::error::ConfigError;

pub const DEFAULT_OUTPUT: &str = "links.txt";
pub const DEFAULT_WORKERS: usize = 1;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    /// Seed pages, in the order they were given
    pub urls: Vec<String>,
    /// Number of concurrent workers, always at least 1
    pub workers: usize,
    /// Per-request timeout applied to page fetches and link checks
    pub timeout: Duration,
    /// Whether link checks follow redirects (seed fetches always do)
    pub follow_redirects: bool,
    /// When set, report lines go to the output file only
    pub silent: bool,
    pub output: PathBuf,
    pub json: bool,
}

impl Config {
    /// Validates the command line and fills in defaults.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        if cli.urls.is_empty() {
            return Err(ConfigError::NoUrls);
        }

        let workers = if cli.workers == 0 {
            DEFAULT_WORKERS
        } else {
            cli.workers
        };

        let timeout = if cli.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            cli.timeout
        };

        Ok(Self {
            urls: cli.urls,
            workers,
            timeout,
            follow_redirects: !cli.no_follow_redirects,
            silent: cli.silent,
            output: cli.output,
            json: cli.json,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            urls: Vec::new(),
            workers: DEFAULT_WORKERS,
            timeout: Duration::from_secs(5),
            follow_redirects: true,
            silent: true,
            output: PathBuf::from(DEFAULT_OUTPUT),
            json: false,
        }
    }
}
