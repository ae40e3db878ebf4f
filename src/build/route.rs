//! Route node construction.

use crate::config::schema::NodeRecord;
use crate::node::{ActionType, NodeKind, RouteNode, SyntheticIds};
use crate::routing::pattern::normalize_methods;

/// Build a route node from a validated record.
pub fn build_route(
    record: &NodeRecord,
    parent_id: Option<i64>,
    position: usize,
    ids: &mut SyntheticIds,
) -> RouteNode {
    let mut node = RouteNode::new(ids.next(), NodeKind::Route);
    node.parent_id = parent_id;
    super::apply_common(&mut node, record, position);

    node.uri = record.uri.clone();
    node.methods = normalize_methods(record.methods.as_deref().unwrap_or_default());
    node.name = record.name.clone();
    node.action_type = normalize_action_type(record, node.id);
    node.action = record.action.clone();
    node.entry_id = record.entry_id;
    node.defaults = record.defaults.clone().unwrap_or_default();

    node
}

/// Missing action_type defaults to controller; an invalid one downgrades
/// to controller with a logged warning instead of failing the node.
fn normalize_action_type(record: &NodeRecord, node_id: i64) -> ActionType {
    match record.action_type.as_deref() {
        None | Some("controller") => ActionType::Controller,
        Some("entry") => ActionType::Entry,
        Some(other) => {
            tracing::warn!(
                node_id,
                action_type = other,
                "Invalid action_type, falling back to 'controller'"
            );
            ActionType::Controller
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_fields_carried_over() {
        let mut ids = SyntheticIds::new();
        let record = NodeRecord {
            name: Some("blog.show".to_string()),
            ..NodeRecord::route("post/{slug}", &["get", "head"], "Blog@show")
        };
        let node = build_route(&record, Some(-9), 3, &mut ids);

        assert_eq!(node.id, -1);
        assert_eq!(node.parent_id, Some(-9));
        assert_eq!(node.uri.as_deref(), Some("post/{slug}"));
        assert_eq!(
            node.methods.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["GET", "HEAD"]
        );
        assert_eq!(node.action_type, ActionType::Controller);
        assert!(node.readonly);
        assert_eq!(node.sort_order, 3);
    }

    #[test]
    fn test_entry_action_type() {
        let mut ids = SyntheticIds::new();
        let record = NodeRecord {
            action_type: Some("entry".to_string()),
            action: None,
            entry_id: Some(12),
            ..NodeRecord::route("about", &["GET"], "unused")
        };
        let node = build_route(&record, None, 0, &mut ids);
        assert_eq!(node.action_type, ActionType::Entry);
        assert_eq!(node.entry_id, Some(12));
    }

    #[test]
    fn test_invalid_action_type_downgrades_to_controller() {
        let mut ids = SyntheticIds::new();
        let record = NodeRecord {
            action_type: Some("closure".to_string()),
            ..NodeRecord::route("post", &["GET"], "Blog@show")
        };
        let node = build_route(&record, None, 0, &mut ids);
        assert_eq!(node.action_type, ActionType::Controller);
    }
}
