// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// The values parsed here are NOT used directly by the rest of the program.
// main.rs turns them into a validated, immutable `Config` first
// (see config.rs), and that is what gets passed around.
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// - Function pointers as value parsers: `value_parser = parse_duration`
// =============================================================================

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{DEFAULT_OUTPUT, DEFAULT_WORKERS};

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
#[derive(Parser, Debug)]
#[command(
    name = "link-auditor",
    version,
    about = "Audit the links on one or more web pages and report the broken ones",
    long_about = "link-auditor fetches each page you give it, finds every href on the page, \
                  and checks each link. Results are written to an output file and echoed \
                  to the terminal unless --silent is set."
)]
pub struct Cli {
    /// Pages to audit (e.g., https://example.com or example.com)
    ///
    /// Pages without http:// or https:// are fetched over HTTPS
    pub urls: Vec<String>,

    /// Suppress logging to stdout (the output file is still written)
    #[arg(long)]
    pub silent: bool,

    /// Report a link's own 3xx status instead of following the redirect
    ///
    /// Seed pages are always followed to their final location
    #[arg(long)]
    pub no_follow_redirects: bool,

    /// Set output file for the report
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Set timeout for HTTP requests (e.g., 500ms, 30s, 1m30s)
    #[arg(long, default_value = "30s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Set number of workers auditing pages in parallel (0 means 1)
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Write report lines as JSON objects instead of text
    #[arg(long)]
    pub json: bool,

    /// Show debug diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

// Parses a duration like "300ms", "30s", "1m30s" or "1.5h"
//
// Each part is a (possibly fractional) number followed by a unit:
// ns, us (or µs), ms, s, m, h. A bare "0" is allowed.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input == "0" {
        return Ok(Duration::ZERO);
    }
    if input.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut total_nanos = 0f64;
    let mut rest = input;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("invalid duration '{}': expected a number", input));
        }
        let value: f64 = rest[..number_len]
            .parse()
            .map_err(|_| format!("invalid duration '{}'", input))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60.0 * 1e9,
            "h" => 3600.0 * 1e9,
            "" => return Err(format!("missing unit in duration '{}'", input)),
            other => return Err(format!("unknown unit '{}' in duration '{}'", other, input)),
        };
        rest = &rest[unit_len..];

        total_nanos += value * nanos_per_unit;
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}
