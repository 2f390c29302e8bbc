// src/checker/mod.rs
// =============================================================================
// This module contains the per-link logic.
//
// Submodules:
// - extract: Finds href values in a page body
// - resolve: Turns an href value into an absolute URL
// - http: Builds the HTTP clients and checks if a link is alive
//
// This file (mod.rs) is the module root - it re-exports the pieces the
// page auditor in crawl/ puts together.
// =============================================================================

mod extract;
mod http;
mod resolve;

pub use extract::extract_links;
pub(crate) use http::as_millis;
pub use http::{build_clients, check_link, Clients, LinkStatus};
pub use resolve::resolve;
