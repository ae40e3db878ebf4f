//! Dispatch targets.

use axum::http::StatusCode;

use crate::actions::registry::RouteHandler;

/// The resolved, invokable unit a matched route executes.
///
/// View and entry rendering stay behind the serving layer's boundary
/// traits; the target only carries what the route itself decided.
#[derive(Clone)]
pub enum DispatchTarget {
    /// Render the named view template.
    View { template: String },
    /// Redirect to `target` with the given status.
    Redirect {
        target: String,
        status: StatusCode,
    },
    /// Invoke a registered controller handler.
    Controller {
        action: String,
        handler: RouteHandler,
    },
    /// Render the content entry named by the route's entry default.
    Entry,
    /// Deterministic 404 standing in for a broken dispatch target.
    NotFound { reason: String },
}

impl DispatchTarget {
    /// The fallback every failed resolution degrades to.
    pub fn not_found(reason: impl Into<String>) -> Self {
        DispatchTarget::NotFound {
            reason: reason.into(),
        }
    }

    /// Short tag for logs and route listings.
    pub fn describe(&self) -> String {
        match self {
            DispatchTarget::View { template } => format!("view:{}", template),
            DispatchTarget::Redirect { target, status } => {
                format!("redirect:{} ({})", target, status.as_u16())
            }
            DispatchTarget::Controller { action, .. } => format!("controller:{}", action),
            DispatchTarget::Entry => "entry".to_string(),
            DispatchTarget::NotFound { .. } => "fallback:404".to_string(),
        }
    }
}

impl std::fmt::Debug for DispatchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DispatchTarget({})", self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_tags() {
        assert_eq!(
            DispatchTarget::View {
                template: "pages.about".into()
            }
            .describe(),
            "view:pages.about"
        );
        assert_eq!(
            DispatchTarget::not_found("whatever").describe(),
            "fallback:404"
        );
    }
}
