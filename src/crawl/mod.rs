// src/crawl/mod.rs
// =============================================================================
// This module audits the seed pages.
//
// Features:
// - One level only: the links ON each seed page are checked, they are
//   never fetched for further links
// - A fixed pool of workers shares the seed pages between them
// - Failures stay local: a bad link skips that link, a bad page fails
//   that page, and the run goes on
//
// Rust concepts:
// - Async programming: Workers are tokio tasks
// - Shared ownership: Arc for the config and reporter every worker uses
// =============================================================================

mod page;
mod queue;

pub use page::PageSummary;
pub use queue::{dispatch, RunReport};
