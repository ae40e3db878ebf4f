//! Route record validation.

use crate::config::schema::NodeRecord;
use crate::routing::pattern::is_recognized_method;
use crate::validate::NodeValidator;

/// Semantic checks for `kind = "route"` records.
pub struct RouteValidator {
    errors: Vec<String>,
}

impl RouteValidator {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }
}

impl Default for RouteValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeValidator for RouteValidator {
    fn validate(&mut self, record: &NodeRecord) -> bool {
        self.errors.clear();

        if record.kind.as_deref() != Some("route") {
            self.errors
                .push("route validator requires kind = 'route'".to_string());
            return false;
        }

        match &record.uri {
            Some(uri) if !uri.trim().is_empty() => {}
            Some(_) => self.errors.push("uri must not be blank".to_string()),
            None => self.errors.push("route is missing 'uri'".to_string()),
        }

        match &record.methods {
            Some(methods) if !methods.is_empty() => {
                // Unrecognized verbs are reported, never silently dropped.
                for method in methods {
                    if !is_recognized_method(method) {
                        self.errors
                            .push(format!("unrecognized HTTP method '{}'", method));
                    }
                }
            }
            Some(_) => self.errors.push("methods must not be empty".to_string()),
            None => self.errors.push("route is missing 'methods'".to_string()),
        }

        match record.action_type.as_deref() {
            None | Some("controller") => {}
            Some("entry") => {
                if record.entry_id.is_none() {
                    self.errors
                        .push("action_type 'entry' requires an integer 'entry_id'".to_string());
                }
                if record.action.is_some() {
                    self.errors
                        .push("action_type 'entry' forbids an 'action' descriptor".to_string());
                }
            }
            Some(other) => {
                self.errors
                    .push(format!("invalid action_type '{}'", other));
            }
        }
        if record.action_type.as_deref() != Some("entry") && record.entry_id.is_some() {
            self.errors
                .push("'entry_id' is only valid with action_type 'entry'".to_string());
        }

        if let Some(order) = record.sort_order {
            if order < 0 {
                self.errors
                    .push(format!("sort_order must be non-negative, got {}", order));
            }
        }

        if let Some(name) = &record.name {
            if name.trim().is_empty() {
                self.errors.push("name must not be blank".to_string());
            }
        }

        if let Some(middleware) = &record.middleware {
            for (i, entry) in middleware.iter().enumerate() {
                if entry.trim().is_empty() {
                    self.errors
                        .push(format!("middleware[{}] must not be blank", i));
                }
            }
        }

        if let Some(wheres) = &record.wheres {
            for (param, pattern) in wheres {
                if param.trim().is_empty() {
                    self.errors
                        .push("where constraint has a blank parameter name".to_string());
                }
                if pattern.trim().is_empty() {
                    self.errors
                        .push(format!("where constraint for '{}' is blank", param));
                }
            }
        }

        if record.children.is_some() {
            self.errors
                .push("routes do not take 'children'".to_string());
        }
        if record.prefix.is_some() {
            self.errors
                .push("routes do not take a 'prefix' (use 'uri')".to_string());
        }

        self.errors.is_empty()
    }

    fn errors(&self) -> &[String] {
        &self.errors
    }
}
