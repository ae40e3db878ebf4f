//! Node registration into the router.
//!
//! # Data Flow
//! ```text
//! RouteNode forest (built, validated, conflict-free)
//!     → register_node (factory dispatch by kind)
//!     → group.rs (open scope, recurse)  |  route.rs (resolve action, mount)
//!     → RouterBuilder
//! ```
//!
//! # Design Decisions
//! - One registrar per kind, selected by the node's kind
//! - Per-node error boundary: a node that fails to register is logged and
//!   skipped; siblings and the rest of the tree still mount

pub mod group;
pub mod route;

use crate::actions::ControllerRegistry;
use crate::node::{NodeKind, RouteNode};
use crate::routing::router::RouterBuilder;

/// Everything the registrars need besides the builder itself.
pub struct RegisterContext<'a> {
    pub controllers: &'a ControllerRegistry,
    /// Whether an entry source is registered, enabling entry routes.
    pub entries_registered: bool,
}

/// Register a whole forest in sibling order.
pub fn register_forest(
    nodes: &[RouteNode],
    builder: &mut RouterBuilder,
    ctx: &RegisterContext<'_>,
) {
    for node in nodes {
        register_node(node, builder, ctx);
    }
}

/// Register one node, dispatching on its kind.
///
/// This is the error boundary: a failure inside either registrar is
/// logged with the node's context and swallowed here.
pub fn register_node(node: &RouteNode, builder: &mut RouterBuilder, ctx: &RegisterContext<'_>) {
    let result = match node.kind {
        NodeKind::Group => {
            group::register_group(node, builder, ctx);
            Ok(())
        }
        NodeKind::Route => route::register_route(node, builder, ctx),
    };

    if let Err(err) = result {
        tracing::error!(
            node_id = node.id,
            kind = %node.kind,
            action = node.action.as_deref().unwrap_or(""),
            source = node.source().describe(),
            error = %err,
            "Failed to register node, skipping it"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SyntheticIds;
    use crate::routing::pattern::normalize_methods;

    fn route_node(ids: &mut SyntheticIds, uri: &str, action: &str) -> RouteNode {
        let mut node = RouteNode::new(ids.next(), NodeKind::Route);
        node.uri = Some(uri.to_string());
        node.methods = normalize_methods(["GET"]);
        node.action = Some(action.to_string());
        node
    }

    #[test]
    fn test_failed_node_does_not_stop_siblings() {
        let mut ids = SyntheticIds::new();
        let registry = ControllerRegistry::new();
        let ctx = RegisterContext {
            controllers: &registry,
            entries_registered: false,
        };

        let mut bad = route_node(&mut ids, "dup", "view:a");
        bad.wheres
            .insert("x".to_string(), "[broken".to_string());
        let good = route_node(&mut ids, "ok", "view:b");

        let mut builder = RouterBuilder::new();
        register_forest(&[bad, good], &mut builder, &ctx);
        let router = builder.build();

        assert_eq!(router.len(), 1);
        assert_eq!(router.routes()[0].full_path, "ok");
    }
}
