//! Route key extraction.
//!
//! # Responsibilities
//! - Normalize a request path (separators, `.` and `..` segments)
//! - Return the first segment as the route key
//!
//! # Design Decisions
//! - Every path is treated as rooted, so `a/b` and `/a/b` agree
//! - Total function: anything without a first segment maps to `"/"`

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Key returned when a path has no first segment.
pub const ROOT_KEY: &str = "/";

/// Returns the route key (first path segment) for `path`.
///
/// `/1234/foo/bar` → `1234`, `/./a//b` → `a`, `/` → `/`.
pub fn extract_prefix(path: &str) -> String {
    clean_segments(path)
        .into_iter()
        .next()
        .map(str::to_string)
        .unwrap_or_else(|| ROOT_KEY.to_string())
}

/// Percent-decodes a raw URI path.
///
/// Registration keys arrive query-decoded, so request paths are decoded
/// before extraction to compare like with like. A path that does not decode
/// to UTF-8 is returned raw.
pub fn decode_path(raw_path: &str) -> Cow<'_, str> {
    percent_decode_str(raw_path)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(raw_path))
}

/// Lexically cleans a rooted path and returns its segments.
fn clean_segments(path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            // `..` at the root stays at the root
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments
}
