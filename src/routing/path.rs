//! Effective full-path assembly.
//!
//! # Responsibilities
//! - Join path fragments while de-duplicating separators
//! - Assemble a node's full path from its inherited group prefixes
//!
//! # Design Decisions
//! - Canonical form carries no leading or trailing slash ("" = root)
//! - Pure functions of the supplied ancestor chain; storage is never consulted

use crate::node::RouteNode;

/// Join fragments root-to-leaf into canonical form.
///
/// Empty fragments and stray slashes contribute nothing, so
/// `join_paths(["/blog/", "", "post"])` is `"blog/post"`.
pub fn join_paths<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();
    for part in parts {
        for segment in part.split('/').filter(|s| !s.is_empty()) {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(segment);
        }
    }
    out
}

/// Canonical path rendered for humans, always with a leading slash.
pub fn display_path(path: &str) -> String {
    format!("/{}", path)
}

/// Assemble a full path from a node's own URI and its ancestor chain.
///
/// `ancestors` runs nearest first. Each ancestor group contributes its
/// prefix; groups without one contribute nothing. Callers supply a chain
/// hydrated by the repository (or accumulated during a tree walk).
pub fn build_full_path(uri: &str, ancestors: &[RouteNode]) -> String {
    let mut prefixes: Vec<&str> = ancestors
        .iter()
        .filter(|a| a.is_group())
        .filter_map(|a| a.prefix.as_deref())
        .collect();
    prefixes.reverse();
    prefixes.push(uri);
    join_paths(prefixes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn group(id: i64, prefix: Option<&str>) -> RouteNode {
        let mut node = RouteNode::new(id, NodeKind::Group);
        node.prefix = prefix.map(str::to_string);
        node
    }

    #[test]
    fn test_join_paths_dedupes_slashes() {
        assert_eq!(join_paths(["/blog/", "//post"]), "blog/post");
        assert_eq!(join_paths(["", "/"]), "");
        assert_eq!(join_paths(["a/b", "c"]), "a/b/c");
    }

    #[test]
    fn test_full_path_inherits_prefixes_root_to_leaf() {
        // Chain is nearest-first: docs → v1 → api
        let ancestors = vec![
            group(-3, Some("docs")),
            group(-2, Some("v1")),
            group(-1, Some("api")),
        ];
        assert_eq!(build_full_path("intro", &ancestors), "api/v1/docs/intro");
    }

    #[test]
    fn test_groups_without_prefix_contribute_nothing() {
        let ancestors = vec![group(-2, None), group(-1, Some("blog"))];
        assert_eq!(build_full_path("post", &ancestors), "blog/post");
    }

    #[test]
    fn test_no_ancestors_is_own_uri() {
        assert_eq!(build_full_path("/about/", &[]), "about");
        assert_eq!(build_full_path("", &[]), "");
    }
}
