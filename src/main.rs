// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Turn them into a validated, immutable Config
// 3. Open the report (output file + stdout) and build the HTTP clients
// 4. Hand every seed page to the worker pool and wait for it to finish
// 5. Exit with proper code (0 = all pages audited, 1 = some page failed,
//    2 = configuration or startup error)
//
// Broken links do NOT change the exit code; they are in the report.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - extract, resolve and check single links
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - validated run configuration
mod crawl; // src/crawl/ - page auditing and the worker pool
mod error; // src/error.rs - error types
mod report; // src/report.rs - the report sink

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Config;
use report::Reporter;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Configuration and startup errors end up here
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every page was audited
//   Ok(1) = at least one page could not be audited
//   Err   = nothing was audited (bad configuration, no output file, ...)
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = Arc::new(Config::from_cli(cli)?);
    let reporter = Arc::new(Reporter::create(&config)?);
    let clients = checker::build_clients(&config).context("Failed to create HTTP clients")?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    tracing::debug!(
        output = %config.output.display(),
        timeout = ?config.timeout,
        follow_redirects = config.follow_redirects,
        "configuration loaded"
    );

    let report = crawl::dispatch(Arc::clone(&config), clients, reporter, cancel).await;

    for page in &report.pages {
        if let Err(e) = &page.result {
            tracing::warn!(url = %page.url, error = %e, "page audit failed");
        }
    }

    Ok(if report.failed() > 0 { 1 } else { 0 })
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        eprintln!("\nInterrupt received, finishing current requests...");
        cancel.cancel();
    }
}

// Diagnostics go to stderr; RUST_LOG overrides the default level
fn setup_logging(verbose: bool) {
    let default = if verbose {
        "link_auditor=debug,warn"
    } else {
        "link_auditor=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
