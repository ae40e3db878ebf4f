//! Group registration.

use crate::node::RouteNode;
use crate::register::RegisterContext;
use crate::routing::router::{GroupScope, RouterBuilder};

/// Open the group's scope and register its children through the factory.
///
/// Disabled groups drop their entire subtree. Children were attached in
/// sibling order by the builder/store, so registration order is stable.
pub fn register_group(node: &RouteNode, builder: &mut RouterBuilder, ctx: &RegisterContext<'_>) {
    if !node.enabled {
        tracing::debug!(node_id = node.id, "Skipping disabled group");
        return;
    }

    builder.enter_scope(GroupScope {
        prefix: node.prefix.clone(),
        domain: node.domain.clone(),
        namespace: node.namespace.clone(),
        middleware: node.middleware.clone(),
        wheres: node.wheres.clone(),
    });
    for child in &node.children {
        super::register_node(child, builder, ctx);
    }
    builder.exit_scope();
}
