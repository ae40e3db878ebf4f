//! Action descriptor parsing.

use crate::node::{ActionType, RouteNode};

/// A route's declared action, parsed into its dispatch family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// `view:<template>` — render a named view.
    View { template: String },
    /// `redirect:<target>[:<status>]` — issue a redirect, 302 by default.
    Redirect { target: String, status: u16 },
    /// `<Class>@<method>` or a bare invokable `<Class>`.
    Controller {
        class: String,
        method: Option<String>,
    },
    /// Content-entry dispatch; the id travels as a route default.
    Entry { entry_id: i64 },
}

/// Why a descriptor could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionParseError {
    #[error("route declares no action descriptor")]
    MissingAction,
    #[error("entry route declares no entry_id")]
    MissingEntryId,
    #[error("'{0}' names no view template")]
    EmptyView(String),
    #[error("'{0}' names no redirect target")]
    EmptyRedirect(String),
    #[error("'{0}' names no controller")]
    EmptyController(String),
}

/// Parse a node's declared action into a tagged variant.
pub fn parse_action(node: &RouteNode) -> Result<Action, ActionParseError> {
    if node.action_type == ActionType::Entry {
        return node
            .entry_id
            .map(|entry_id| Action::Entry { entry_id })
            .ok_or(ActionParseError::MissingEntryId);
    }

    let descriptor = node
        .action
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or(ActionParseError::MissingAction)?;

    if let Some(template) = descriptor.strip_prefix("view:") {
        let template = template.trim();
        if template.is_empty() {
            return Err(ActionParseError::EmptyView(descriptor.to_string()));
        }
        return Ok(Action::View {
            template: template.to_string(),
        });
    }

    if let Some(rest) = descriptor.strip_prefix("redirect:") {
        let rest = rest.trim();
        if rest.is_empty() {
            return Err(ActionParseError::EmptyRedirect(descriptor.to_string()));
        }
        // The status is optional and the target may itself contain colons
        // (e.g. a absolute URL), so the split comes from the right and only
        // sticks when the suffix is a redirect status.
        if let Some((target, status)) = rest.rsplit_once(':') {
            if let Ok(code) = status.parse::<u16>() {
                if (300..400).contains(&code) && !target.trim().is_empty() {
                    return Ok(Action::Redirect {
                        target: target.trim().to_string(),
                        status: code,
                    });
                }
            }
        }
        return Ok(Action::Redirect {
            target: rest.to_string(),
            status: 302,
        });
    }

    match descriptor.split_once('@') {
        Some((class, method)) => {
            let class = class.trim();
            let method = method.trim();
            if class.is_empty() || method.is_empty() {
                Err(ActionParseError::EmptyController(descriptor.to_string()))
            } else {
                Ok(Action::Controller {
                    class: class.to_string(),
                    method: Some(method.to_string()),
                })
            }
        }
        None => Ok(Action::Controller {
            class: descriptor.to_string(),
            method: None,
        }),
    }
}

/// The controller class/method named by a node, for re-checks at mount time.
///
/// `None` when the node does not describe a controller dispatch.
pub fn parse_action_for_check(node: &RouteNode) -> Option<(String, Option<String>)> {
    match parse_action(node) {
        Ok(Action::Controller { class, method }) => Some((class, method)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn route_with_action(action: &str) -> RouteNode {
        let mut node = RouteNode::new(-1, NodeKind::Route);
        node.action = Some(action.to_string());
        node
    }

    #[test]
    fn test_view_action() {
        let action = parse_action(&route_with_action("view:pages.about")).unwrap();
        assert_eq!(
            action,
            Action::View {
                template: "pages.about".to_string()
            }
        );
    }

    #[test]
    fn test_redirect_defaults_to_302() {
        let action = parse_action(&route_with_action("redirect:/new-page")).unwrap();
        assert_eq!(
            action,
            Action::Redirect {
                target: "/new-page".to_string(),
                status: 302
            }
        );
    }

    #[test]
    fn test_redirect_with_explicit_status() {
        let action = parse_action(&route_with_action("redirect:/new-page:301")).unwrap();
        assert_eq!(
            action,
            Action::Redirect {
                target: "/new-page".to_string(),
                status: 301
            }
        );
    }

    #[test]
    fn test_redirect_target_may_contain_colons() {
        let action =
            parse_action(&route_with_action("redirect:https://example.com/x")).unwrap();
        assert_eq!(
            action,
            Action::Redirect {
                target: "https://example.com/x".to_string(),
                status: 302
            }
        );
    }

    #[test]
    fn test_controller_class_and_method() {
        let action = parse_action(&route_with_action("Blog@show")).unwrap();
        assert_eq!(
            action,
            Action::Controller {
                class: "Blog".to_string(),
                method: Some("show".to_string())
            }
        );
    }

    #[test]
    fn test_bare_invokable_controller() {
        let action = parse_action(&route_with_action("Homepage")).unwrap();
        assert_eq!(
            action,
            Action::Controller {
                class: "Homepage".to_string(),
                method: None
            }
        );
    }

    #[test]
    fn test_entry_action_uses_entry_id() {
        let mut node = RouteNode::new(-1, NodeKind::Route);
        node.action_type = ActionType::Entry;
        node.entry_id = Some(7);
        assert_eq!(parse_action(&node).unwrap(), Action::Entry { entry_id: 7 });
    }

    #[test]
    fn test_missing_descriptor_is_an_error() {
        let node = RouteNode::new(-1, NodeKind::Route);
        assert_eq!(
            parse_action(&node).unwrap_err(),
            ActionParseError::MissingAction
        );
    }
}
