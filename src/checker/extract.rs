// src/checker/extract.rs
// =============================================================================
// This module pulls raw href values out of a page body.
//
// It does NOT parse HTML. It splits the bytes on the literal marker
// `href="` and takes everything up to the next `"` in each piece. That means
// it also picks up hrefs inside comments, scripts, or any other attribute
// text that happens to contain the marker. This is the behaviour we want:
// the report should list exactly what a plain text scan finds.
//
// How it works:
// 1. Skip everything before the first marker
// 2. For each piece between two markers (or the last marker and the end),
//    the reference is the bytes before the first `"`
// 3. A piece with no `"` is malformed: the iterator yields an error and
//    then stops for good
//
// Rust concepts:
// - Iterator trait: values are produced lazily, one per `next()` call
// - Lifetimes: `Hrefs<'a>` borrows the body, it never copies it
// - Clone: cloning the iterator restarts the scan from the same position
// =============================================================================

use crate::error::AuditError;

const MARKER: &[u8] = b"href=\"";

/// Lazy scan over the href values of a page body.
#[derive(Debug, Clone)]
pub struct Hrefs<'a> {
    body: &'a [u8],
    // Start of the current piece (just past a marker), None when exhausted
    cursor: Option<usize>,
}

/// Starts a scan over `body`
///
/// Example:
///   body = `<a href="/docs">Docs</a>`
///   yields Ok("/docs")
pub fn extract_links(body: &[u8]) -> Hrefs<'_> {
    let cursor = find(body, MARKER).map(|idx| idx + MARKER.len());
    Hrefs { body, cursor }
}

impl<'a> Iterator for Hrefs<'a> {
    type Item = Result<String, AuditError>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.cursor?;
        let rest = &self.body[start..];

        // The piece ends where the next marker begins
        let next_marker = find(rest, MARKER);
        let piece = &rest[..next_marker.unwrap_or(rest.len())];

        let Some(end) = piece.iter().position(|&b| b == b'"') else {
            self.cursor = None;
            return Some(Err(AuditError::MalformedContent { offset: start }));
        };

        self.cursor = next_marker.map(|idx| start + idx + MARKER.len());
        Some(Ok(String::from_utf8_lossy(&piece[..end]).into_owned()))
    }
}

impl std::iter::FusedIterator for Hrefs<'_> {}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why &[u8] instead of &str?
//    - Page bodies are bytes; they are not guaranteed to be valid UTF-8
//    - We only convert the small href value, with from_utf8_lossy, which
//      replaces invalid sequences instead of failing
//
// 2. What does `let ... else` do?
//    - It binds a pattern or runs the else block, which must return/break
//    - Handy for "get this or bail out" without nesting
//
// 3. Why FusedIterator?
//    - It promises that once next() returns None it keeps returning None
//    - Our cursor becomes None and stays None, so the promise holds
// -----------------------------------------------------------------------------
