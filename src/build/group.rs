//! Group node construction.

use crate::config::schema::NodeRecord;
use crate::node::{NodeKind, RouteNode, SyntheticIds};

/// Build a group node and recursively build its children.
///
/// Children are built through the shared kind dispatch in the parent
/// module, attached directly in sibling order; a child that fails to build
/// is skipped without affecting the rest.
pub fn build_group(
    record: &NodeRecord,
    parent_id: Option<i64>,
    position: usize,
    ids: &mut SyntheticIds,
) -> Option<RouteNode> {
    let mut node = RouteNode::new(ids.next(), NodeKind::Group);
    node.parent_id = parent_id;
    super::apply_common(&mut node, record, position);
    node.prefix = record.prefix.clone();
    node.namespace = record.namespace.clone();

    if let Some(children) = &record.children {
        let mut built: Vec<RouteNode> = children
            .iter()
            .enumerate()
            .filter_map(|(i, child)| super::build_node(child, Some(node.id), i, ids))
            .collect();
        RouteNode::sort_siblings(&mut built);
        node.children = built;
    }

    Some(node)
}
