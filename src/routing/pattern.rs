//! URI template and method-set normalization.
//!
//! # Responsibilities
//! - Normalize HTTP method sets (uppercase, dedupe, drop blanks)
//! - Decide whether two URI templates structurally overlap
//!
//! # Design Decisions
//! - Pure and total; no side effects
//! - A placeholder segment matches any segment in the same position
//! - Different segment counts never conflict
//! - No regex in the comparison path

use std::collections::BTreeSet;

/// Methods the route validator accepts.
pub const RECOGNIZED_METHODS: [&str; 7] =
    ["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"];

/// Uppercase, trim, dedupe and drop blank entries.
pub fn normalize_methods<I, S>(methods: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    methods
        .into_iter()
        .map(|m| m.as_ref().trim().to_uppercase())
        .filter(|m| !m.is_empty())
        .collect()
}

/// True if the verb is one the router knows how to mount.
pub fn is_recognized_method(method: &str) -> bool {
    let upper = method.trim().to_uppercase();
    RECOGNIZED_METHODS.contains(&upper.as_str())
}

/// Split a path into segments, ignoring leading/trailing/repeated slashes.
pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// True if the segment is a `{param}` placeholder.
pub fn is_placeholder(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}') && segment.len() >= 2
}

/// The parameter name inside a placeholder segment, if it is one.
pub fn placeholder_name(segment: &str) -> Option<&str> {
    if is_placeholder(segment) {
        Some(&segment[1..segment.len() - 1])
    } else {
        None
    }
}

/// True if two URI templates are indistinguishable to a router.
///
/// Segment by segment: a literal only matches an identical literal, a
/// placeholder matches any literal or placeholder in the same position.
pub fn patterns_conflict(path_a: &str, path_b: &str) -> bool {
    let a = split_segments(path_a);
    let b = split_segments(path_b);
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).all(|(sa, sb)| {
        is_placeholder(sa) || is_placeholder(sb) || sa == sb
    })
}

/// True if the normalized method sets share at least one verb.
pub fn methods_intersect(a: &BTreeSet<String>, b: &BTreeSet<String>) -> bool {
    a.iter().any(|m| b.contains(m))
}
