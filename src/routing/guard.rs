//! Reservation and conflict checks for candidate routes.
//!
//! # Responsibilities
//! - Refuse candidates whose first segment is reserved for the system
//! - Find the first existing node, in either provenance, that already
//!   answers an overlapping request
//!
//! # Design Decisions
//! - Reserved check runs before any tree walk
//! - Deterministic depth-first walk: declarative forest first, then the
//!   persisted tree, siblings in stable order
//! - Disabled groups hide their whole subtree; disabled routes never
//!   conflict
//! - This is the same predicate the router builder re-applies at
//!   registration, so the pre-write check and the mount agree

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::node::{NodeSource, RouteNode};
use crate::routing::path::{build_full_path, display_path, join_paths};
use crate::routing::pattern::{
    methods_intersect, normalize_methods, patterns_conflict, split_segments,
};
use crate::store::{NodeStore, StoreError};

/// The node a candidate collides with.
#[derive(Debug, Clone)]
pub struct ConflictInfo {
    pub id: i64,
    pub name: Option<String>,
    pub full_path: String,
    pub methods: BTreeSet<String>,
    pub source: NodeSource,
}

/// Outcome of `can_create_route`.
#[derive(Debug, Clone)]
pub struct CreateCheck {
    pub allowed: bool,
    pub reason: Option<String>,
    pub conflicting: Option<ConflictInfo>,
}

impl CreateCheck {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
            conflicting: None,
        }
    }

    fn denied(reason: String, conflicting: Option<ConflictInfo>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            conflicting,
        }
    }
}

/// Conflict/reservation predicate over the merged forest.
pub struct RouteGuard {
    reserved: Vec<String>,
    declarative: Arc<Vec<RouteNode>>,
    store: Arc<dyn NodeStore>,
}

impl RouteGuard {
    pub fn new(
        reserved: Vec<String>,
        declarative: Arc<Vec<RouteNode>>,
        store: Arc<dyn NodeStore>,
    ) -> Self {
        Self {
            reserved,
            declarative,
            store,
        }
    }

    /// True if the path's first segment is claimed by (or claims) a
    /// reserved prefix.
    pub fn is_prefix_reserved(&self, path: &str) -> bool {
        self.reserved_hit(path).is_some()
    }

    /// The reserved entry a path trips over, if any.
    ///
    /// Matching is on first segments: candidate `api/x` trips reserved
    /// `api`, and candidate `api` trips a compound reserved `api/v1`
    /// (it would shadow the reserved subtree's parent).
    fn reserved_hit(&self, path: &str) -> Option<&str> {
        let first = *split_segments(path).first()?;
        self.reserved
            .iter()
            .find(|entry| {
                split_segments(entry)
                    .first()
                    .map(|r| r.eq_ignore_ascii_case(first))
                    .unwrap_or(false)
            })
            .map(String::as_str)
    }

    /// Full admission check for a candidate route.
    ///
    /// `parent_id` names the persisted group the candidate would be
    /// created under; its ancestor chain supplies the inherited prefixes.
    /// `exclude_id` skips the candidate's own current row on update.
    pub fn can_create_route(
        &self,
        uri: &str,
        methods: &[String],
        exclude_id: Option<i64>,
        parent_id: Option<i64>,
    ) -> Result<CreateCheck, StoreError> {
        let full_path = match self.candidate_path(uri, parent_id)? {
            Ok(path) => path,
            Err(check) => return Ok(check),
        };

        if let Some(entry) = self.reserved_hit(&full_path) {
            return Ok(CreateCheck::denied(
                format!(
                    "path {} falls under the reserved prefix '{}'",
                    display_path(&full_path),
                    entry
                ),
                None,
            ));
        }

        let methods = normalize_methods(methods);
        match self.find_conflict(&full_path, &methods, exclude_id)? {
            Some(conflict) => {
                let reason = format!(
                    "path {} [{}] overlaps {} node {} at {}",
                    display_path(&full_path),
                    join_methods(&methods),
                    conflict.source.describe(),
                    conflict.id,
                    display_path(&conflict.full_path),
                );
                Ok(CreateCheck::denied(reason, Some(conflict)))
            }
            None => Ok(CreateCheck::allowed()),
        }
    }

    /// Conflict lookup alone, for internal consistency checks.
    pub fn check_conflict(
        &self,
        uri: &str,
        methods: &[String],
        exclude_id: Option<i64>,
        parent_id: Option<i64>,
    ) -> Result<Option<ConflictInfo>, StoreError> {
        let full_path = match self.candidate_path(uri, parent_id)? {
            Ok(path) => path,
            Err(_) => return Ok(None),
        };
        self.find_conflict(&full_path, &normalize_methods(methods), exclude_id)
    }

    /// Effective full path of the candidate, or the failed check when the
    /// attachment point does not resolve.
    fn candidate_path(
        &self,
        uri: &str,
        parent_id: Option<i64>,
    ) -> Result<Result<String, CreateCheck>, StoreError> {
        let Some(pid) = parent_id else {
            return Ok(Ok(build_full_path(uri, &[])));
        };
        match self.store.node_with_ancestors(pid)? {
            Some(hydrated) => {
                let chain: Vec<RouteNode> = hydrated.chain().cloned().collect();
                Ok(Ok(build_full_path(uri, &chain)))
            }
            None => Ok(Err(CreateCheck::denied(
                format!("parent node {} does not exist", pid),
                None,
            ))),
        }
    }

    fn find_conflict(
        &self,
        candidate_path: &str,
        candidate_methods: &BTreeSet<String>,
        exclude_id: Option<i64>,
    ) -> Result<Option<ConflictInfo>, StoreError> {
        let mut prefix = String::new();
        if let Some(hit) = walk(
            &self.declarative,
            &mut prefix,
            candidate_path,
            candidate_methods,
            exclude_id,
        ) {
            return Ok(Some(hit));
        }

        let persisted = self.store.get_tree()?;
        let mut prefix = String::new();
        Ok(walk(
            &persisted,
            &mut prefix,
            candidate_path,
            candidate_methods,
            exclude_id,
        ))
    }
}

fn join_methods(methods: &BTreeSet<String>) -> String {
    methods.iter().cloned().collect::<Vec<_>>().join(",")
}

/// Depth-first scan for the first overlapping enabled route.
fn walk(
    nodes: &[RouteNode],
    prefix: &mut String,
    candidate_path: &str,
    candidate_methods: &BTreeSet<String>,
    exclude_id: Option<i64>,
) -> Option<ConflictInfo> {
    for node in nodes {
        if !node.enabled {
            continue;
        }
        if node.is_group() {
            let saved = prefix.clone();
            if let Some(p) = node.prefix.as_deref() {
                *prefix = join_paths([prefix.as_str(), p]);
            }
            let hit = walk(
                &node.children,
                prefix,
                candidate_path,
                candidate_methods,
                exclude_id,
            );
            *prefix = saved;
            if hit.is_some() {
                return hit;
            }
        } else {
            if exclude_id == Some(node.id) {
                continue;
            }
            let uri = node.uri.as_deref().unwrap_or_default();
            let full = join_paths([prefix.as_str(), uri]);
            if patterns_conflict(&full, candidate_path)
                && methods_intersect(&node.methods, candidate_methods)
            {
                return Some(ConflictInfo {
                    id: node.id,
                    name: node.name.clone(),
                    full_path: full,
                    methods: node.methods.clone(),
                    source: node.source(),
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeKind, SyntheticIds};
    use crate::store::MemoryStore;

    fn declarative_blog() -> Arc<Vec<RouteNode>> {
        let mut ids = SyntheticIds::new();
        let mut group = RouteNode::new(ids.next(), NodeKind::Group);
        group.readonly = true;
        group.prefix = Some("blog".to_string());
        let mut post = RouteNode::new(ids.next(), NodeKind::Route);
        post.readonly = true;
        post.parent_id = Some(group.id);
        post.uri = Some("post".to_string());
        post.methods = normalize_methods(["GET"]);
        group.children.push(post);
        Arc::new(vec![group])
    }

    fn guard_with(reserved: &[&str], declarative: Arc<Vec<RouteNode>>) -> RouteGuard {
        RouteGuard::new(
            reserved.iter().map(|s| s.to_string()).collect(),
            declarative,
            Arc::new(MemoryStore::new()),
        )
    }

    #[test]
    fn test_reserved_first_segment() {
        let guard = guard_with(&["api", "admin"], Arc::new(Vec::new()));
        assert!(guard.is_prefix_reserved("api/anything"));
        assert!(guard.is_prefix_reserved("/API/x"));
        assert!(!guard.is_prefix_reserved("apiary/x"));
        assert!(!guard.is_prefix_reserved("blog"));
    }

    #[test]
    fn test_compound_reserved_prefix_blocks_parent_segment() {
        let guard = guard_with(&["api/v1"], Arc::new(Vec::new()));
        assert!(guard.is_prefix_reserved("api"));
        assert!(guard.is_prefix_reserved("api/other"));
    }

    #[test]
    fn test_reserved_rejection_precedes_tree_walk() {
        let guard = guard_with(&["api"], declarative_blog());
        let check = guard
            .can_create_route("api/anything", &["GET".to_string()], None, None)
            .unwrap();
        assert!(!check.allowed);
        assert!(check.reason.unwrap().contains("reserved prefix 'api'"));
        assert!(check.conflicting.is_none());
    }

    #[test]
    fn test_conflict_against_declarative_group_route() {
        let guard = guard_with(&[], declarative_blog());
        let check = guard
            .can_create_route("blog/post", &["GET".to_string()], None, None)
            .unwrap();
        assert!(!check.allowed);
        let conflict = check.conflicting.unwrap();
        assert_eq!(conflict.source, NodeSource::Declarative);
        assert_eq!(conflict.full_path, "blog/post");
    }

    #[test]
    fn test_disjoint_methods_allowed() {
        let guard = guard_with(&[], declarative_blog());
        let check = guard
            .can_create_route("blog/post", &["DELETE".to_string()], None, None)
            .unwrap();
        assert!(check.allowed);
    }

    #[test]
    fn test_placeholder_overlap_detected() {
        let guard = guard_with(&[], declarative_blog());
        let check = guard
            .can_create_route("blog/{slug}", &["GET".to_string()], None, None)
            .unwrap();
        assert!(!check.allowed);
    }

    #[test]
    fn test_disabled_declarative_group_does_not_conflict() {
        let declarative = declarative_blog();
        let mut disabled = (*declarative).clone();
        disabled[0].enabled = false;
        let guard = guard_with(&[], Arc::new(disabled));
        let check = guard
            .can_create_route("blog/post", &["GET".to_string()], None, None)
            .unwrap();
        assert!(check.allowed);
    }

    #[test]
    fn test_candidate_under_persisted_group_inherits_prefix() {
        let store = Arc::new(MemoryStore::new());
        let mut group = RouteNode::new(0, NodeKind::Group);
        group.prefix = Some("blog".to_string());
        let group = store.insert(group).unwrap();

        let guard = RouteGuard::new(Vec::new(), declarative_blog(), store);
        let check = guard
            .can_create_route("post", &["GET".to_string()], None, Some(group.id))
            .unwrap();
        assert!(!check.allowed, "blog/post must collide with the declarative route");
    }

    #[test]
    fn test_unknown_parent_denied() {
        let guard = guard_with(&[], Arc::new(Vec::new()));
        let check = guard
            .can_create_route("x", &["GET".to_string()], None, Some(99))
            .unwrap();
        assert!(!check.allowed);
        assert!(check.reason.unwrap().contains("parent node 99"));
    }

    #[test]
    fn test_exclude_id_skips_own_row() {
        let store = Arc::new(MemoryStore::new());
        let mut row = RouteNode::new(0, NodeKind::Route);
        row.uri = Some("contact".to_string());
        row.methods = normalize_methods(["GET"]);
        let row = store.insert(row).unwrap();

        let guard = RouteGuard::new(Vec::new(), Arc::new(Vec::new()), store);
        let blocked = guard
            .can_create_route("contact", &["GET".to_string()], None, None)
            .unwrap();
        assert!(!blocked.allowed);

        let updating_self = guard
            .can_create_route("contact", &["GET".to_string()], Some(row.id), None)
            .unwrap();
        assert!(updating_self.allowed);
    }
}
