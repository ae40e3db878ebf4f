//! Route registration.

use crate::actions::{parse_action_for_check, resolve_action, DispatchTarget, ENTRY_ID_PARAM};
use crate::node::RouteNode;
use crate::register::RegisterContext;
use crate::routing::router::{RegisterError, RouteSpec, RouterBuilder};

/// Resolve a route node's action and mount it under the open scopes.
pub fn register_route(
    node: &RouteNode,
    builder: &mut RouterBuilder,
    ctx: &RegisterContext<'_>,
) -> Result<(), RegisterError> {
    if !node.enabled {
        tracing::debug!(node_id = node.id, "Skipping disabled route");
        return Ok(());
    }

    let Some(uri) = node.uri.as_deref() else {
        tracing::warn!(node_id = node.id, "Route node has no uri, skipping");
        return Ok(());
    };
    if node.methods.is_empty() {
        tracing::warn!(node_id = node.id, uri, "Route node has no methods, skipping");
        return Ok(());
    }

    let Some(target) = resolve_action(node, ctx.controllers, ctx.entries_registered) else {
        // Resolution already logged why nothing supports this node.
        return Ok(());
    };

    // Last-chance check against stale data: the registry must still answer
    // for a controller target at the moment of mounting.
    let target = if matches!(target, DispatchTarget::Controller { .. }) {
        let still_resolvable = parse_action_for_check(node)
            .map(|(class, method)| ctx.controllers.handler(&class, method.as_deref()).is_some())
            .unwrap_or(false);
        if still_resolvable {
            target
        } else {
            tracing::warn!(
                node_id = node.id,
                action = node.action.as_deref().unwrap_or(""),
                "Controller target vanished before mounting, degrading to 404"
            );
            DispatchTarget::not_found("controller target vanished before mounting")
        }
    } else {
        target
    };

    let mut defaults = node.defaults.clone();
    if matches!(target, DispatchTarget::Entry) {
        if let Some(entry_id) = node.entry_id {
            defaults.insert(ENTRY_ID_PARAM.to_string(), entry_id.to_string());
        }
    }

    builder.register(RouteSpec {
        node_id: node.id,
        source: node.source(),
        uri: uri.to_string(),
        methods: node.methods.clone(),
        name: node.name.clone(),
        domain: node.domain.clone(),
        middleware: node.middleware.clone(),
        wheres: node.wheres.clone(),
        defaults,
        target,
    })?;

    tracing::debug!(
        node_id = node.id,
        uri,
        source = node.source().describe(),
        "Registered route"
    );
    Ok(())
}
