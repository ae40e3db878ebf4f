//! Declarative node construction.
//!
//! # Data Flow
//! ```text
//! NodeRecord (raw, from config)
//!     → validate/ (semantic gate)
//!     → build_node (kind-dispatched, recursive for groups)
//!     → RouteNode with a fresh negative id
//! ```
//!
//! # Design Decisions
//! - One recursive entry point dispatching on `kind`; no late-bound
//!   callbacks between the group builder and its loader
//! - A failed node builds to `None`: callers skip it, siblings proceed
//! - Synthetic ids come from an allocator owned by the compile pass

pub mod group;
pub mod route;

use crate::config::schema::NodeRecord;
use crate::node::{RouteNode, SyntheticIds};
use crate::validate::validate_record;

/// Build one declarative node (and, for groups, its subtree).
///
/// Returns `None` when the record fails validation or construction; the
/// failure is logged here so callers only need to skip.
pub fn build_node(
    record: &NodeRecord,
    parent_id: Option<i64>,
    position: usize,
    ids: &mut SyntheticIds,
) -> Option<RouteNode> {
    if let Err(errors) = validate_record(record) {
        tracing::warn!(
            kind = record.kind.as_deref().unwrap_or("<missing>"),
            uri = record.uri.as_deref().unwrap_or(""),
            prefix = record.prefix.as_deref().unwrap_or(""),
            errors = ?errors,
            "Skipping invalid declarative node"
        );
        return None;
    }

    match record.kind.as_deref() {
        Some("group") => group::build_group(record, parent_id, position, ids),
        Some("route") => Some(route::build_route(record, parent_id, position, ids)),
        // validate_record already rejected anything else
        _ => None,
    }
}

/// Build a whole declarative forest, skipping failed nodes.
pub fn build_forest(records: &[NodeRecord], ids: &mut SyntheticIds) -> Vec<RouteNode> {
    let mut forest: Vec<RouteNode> = records
        .iter()
        .enumerate()
        .filter_map(|(i, record)| build_node(record, None, i, ids))
        .collect();
    RouteNode::sort_siblings(&mut forest);
    forest
}

/// Fields shared by both kinds, copied off the raw record.
fn apply_common(node: &mut RouteNode, record: &NodeRecord, position: usize) {
    node.enabled = record.enabled.unwrap_or(true);
    // Missing sort_order falls back to file position, preserving authored order.
    node.sort_order = record
        .sort_order
        .map(|o| o as u32)
        .unwrap_or(position as u32);
    node.domain = record.domain.clone();
    node.middleware = record.middleware.clone().unwrap_or_default();
    node.wheres = record.wheres.clone().unwrap_or_default();
    // Declarative nodes are never editable at runtime.
    node.readonly = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_record_builds_to_none() {
        let mut ids = SyntheticIds::new();
        let record = NodeRecord {
            kind: Some("route".to_string()),
            ..NodeRecord::default()
        };
        assert!(build_node(&record, None, 0, &mut ids).is_none());
    }

    #[test]
    fn test_failed_child_does_not_sink_siblings() {
        let mut ids = SyntheticIds::new();
        let records = vec![
            NodeRecord::route("a", &["GET"], "A@show"),
            NodeRecord {
                kind: Some("route".to_string()),
                ..NodeRecord::default()
            },
            NodeRecord::route("b", &["GET"], "B@show"),
        ];
        let forest = build_forest(&records, &mut ids);
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn test_forest_ids_are_unique_negatives() {
        let mut ids = SyntheticIds::new();
        let records = vec![
            NodeRecord::route("a", &["GET"], "A@show"),
            NodeRecord::group("blog"),
        ];
        let forest = build_forest(&records, &mut ids);
        let mut seen: Vec<i64> = forest.iter().map(|n| n.id).collect();
        seen.dedup();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|id| *id < 0));
    }
}
