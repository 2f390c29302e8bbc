// src/checker/resolve.rs
// =============================================================================
// This module turns a raw href value into an absolute URL.
//
// It is deliberately NOT RFC 3986 resolution (no `url::Url::join`): the
// rules below are plain string operations, applied in this order, first
// match wins:
//
//   1. "http..."  -> already absolute, returned unchanged
//   2. "//..."    -> protocol-relative, gets the page's scheme
//   3. "/..."     -> root-relative, gets the page's origin (heuristic)
//   4. "#..." / "?..." -> fragment or query, appended to the page URL
//   5. anything else   -> relative path, joined to the page URL with "/"
//
// No "." / ".." collapsing, no percent-decoding, no case-folding.
//
// Rust concepts:
// - &str slicing by byte index (safe here because we only cut at ASCII
//   characters: ':', '.', '/')
// - Option combinators: map, map_or, unwrap_or
// =============================================================================

/// Scheme used when the page URL doesn't carry one.
const FALLBACK_SCHEME: &str = "https:";

// Resolves `href` against the page URL `base`
//
// Example:
//   resolve("https://a.com/dir/page.html", "/x") -> "https://a.com/x"
//   resolve("https://a.com/dir", "y.html")       -> "https://a.com/dir/y.html"
pub fn resolve(base: &str, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }

    if href.starts_with("//") {
        return format!("{}{}", scheme_of(base), href);
    }

    if href.starts_with('/') {
        return format!("{}{}", origin_of(base), href);
    }

    if href.starts_with('#') || href.starts_with('?') {
        return format!("{}{}", base, href);
    }

    if base.ends_with('/') {
        format!("{}{}", base, href)
    } else {
        format!("{}/{}", base, href)
    }
}

// The scheme of `base` up to and including its first ':'
fn scheme_of(base: &str) -> &str {
    match base.find(':') {
        Some(idx) => &base[..=idx],
        None => FALLBACK_SCHEME,
    }
}

// An origin-like prefix of `base`
//
// Finds the last '.' of the host (to get past the dot in "example.com"),
// then the first '/' after it. If there is no such '/', the cut happens at
// the dot itself, so "https://a.com" + "/x" gives "https://a/x".
//
// The host is everything after "://" up to the next '/'. Dots in the path
// ("page.html") are never used as the anchor. Hosts without any dot
// (e.g. "localhost") are cut at that first '/' instead, or kept whole.
fn origin_of(base: &str) -> &str {
    let host_start = base.find("://").map_or(0, |idx| idx + 3);
    let slash = base[host_start..].find('/').map(|idx| host_start + idx);
    let host_end = slash.unwrap_or(base.len());

    match base[host_start..host_end].rfind('.') {
        Some(_) if slash.is_some() => &base[..host_end],
        Some(dot) => &base[..host_start + dot],
        None => &base[..host_end],
    }
}
