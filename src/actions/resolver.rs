//! Dispatch-target resolution with a uniform error boundary.

use axum::http::StatusCode;

use crate::actions::action::{parse_action, Action};
use crate::actions::registry::ControllerRegistry;
use crate::actions::target::DispatchTarget;
use crate::node::RouteNode;

/// Resolve a node's declared action into a dispatch target.
///
/// `None` means no resolver supports the node (an entry route without a
/// registered entry source) and the registrar must skip it. Every other
/// failure degrades to the 404 fallback so one broken node never aborts
/// the compile pass.
pub fn resolve_action(
    node: &RouteNode,
    registry: &ControllerRegistry,
    entries_registered: bool,
) -> Option<DispatchTarget> {
    let action = match parse_action(node) {
        Ok(action) => action,
        Err(err) => return Some(degrade(node, &err)),
    };

    match action {
        Action::View { template } => Some(DispatchTarget::View { template }),

        Action::Redirect { target, status } => {
            // parse_action only lets 3xx through, so this cannot fail.
            let status =
                StatusCode::from_u16(status).unwrap_or(StatusCode::FOUND);
            Some(DispatchTarget::Redirect { target, status })
        }

        Action::Controller { class, method } => {
            if !registry.has_class(&class) {
                return Some(degrade(
                    node,
                    &format!("controller '{}' is not registered", class),
                ));
            }
            match registry.handler(&class, method.as_deref()) {
                Some(handler) => Some(DispatchTarget::Controller {
                    action: node.action.clone().unwrap_or_default(),
                    handler,
                }),
                None => Some(degrade(
                    node,
                    &match method {
                        Some(m) => format!("controller '{}' has no method '{}'", class, m),
                        None => format!("controller '{}' is not invokable", class),
                    },
                )),
            }
        }

        Action::Entry { entry_id } => {
            if entries_registered {
                // The entry id reaches the handler as a route default, not
                // through the target.
                Some(DispatchTarget::Entry)
            } else {
                tracing::warn!(
                    node_id = node.id,
                    entry_id,
                    "No resolver supports entry routes (no entry source registered), skipping node"
                );
                None
            }
        }
    }
}

fn degrade(node: &RouteNode, reason: &dyn std::fmt::Display) -> DispatchTarget {
    tracing::warn!(
        node_id = node.id,
        action_type = %node.action_type,
        action = node.action.as_deref().unwrap_or(""),
        %reason,
        "Action resolution failed, degrading to 404 fallback"
    );
    DispatchTarget::not_found(reason.to_string())
}
