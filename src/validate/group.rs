//! Group record validation.

use crate::config::schema::NodeRecord;
use crate::validate::NodeValidator;

/// Semantic checks for `kind = "group"` records.
pub struct GroupValidator {
    errors: Vec<String>,
}

impl GroupValidator {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }
}

impl Default for GroupValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeValidator for GroupValidator {
    fn validate(&mut self, record: &NodeRecord) -> bool {
        self.errors.clear();

        if record.kind.as_deref() != Some("group") {
            self.errors
                .push("group validator requires kind = 'group'".to_string());
            return false;
        }

        if let Some(order) = record.sort_order {
            if order < 0 {
                self.errors
                    .push(format!("sort_order must be non-negative, got {}", order));
            }
        }

        if let Some(prefix) = &record.prefix {
            if prefix.trim().is_empty() {
                self.errors.push("prefix must not be blank".to_string());
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

        // Fields that only make sense on routes.
        if record.uri.is_some() {
            self.errors
                .push("groups do not take a 'uri' (use 'prefix')".to_string());
        }
        if record.methods.is_some() {
            self.errors.push("groups do not take 'methods'".to_string());
        }
        if record.action.is_some() || record.action_type.is_some() || record.entry_id.is_some() {
            self.errors
                .push("groups do not take an action".to_string());
        }

        self.errors.is_empty()
    }

    fn errors(&self) -> &[String] {
        &self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_group_is_valid() {
        let mut validator = GroupValidator::new();
        assert!(validator.validate(&NodeRecord::group("blog")));
        assert!(validator.errors().is_empty());
    }

    #[test]
    fn test_prefixless_group_is_valid() {
        // A group may scope only domain/middleware without contributing a prefix.
        let record = NodeRecord {
            kind: Some("group".to_string()),
            domain: Some("example.com".to_string()),
            ..NodeRecord::default()
        };
        let mut validator = GroupValidator::new();
        assert!(validator.validate(&record));
    }

    #[test]
    fn test_negative_sort_order_reported() {
        let record = NodeRecord {
            sort_order: Some(-1),
            ..NodeRecord::group("blog")
        };
        let mut validator = GroupValidator::new();
        assert!(!validator.validate(&record));
        assert!(validator.errors()[0].contains("sort_order"));
    }

    #[test]
    fn test_route_fields_rejected_on_group() {
        let record = NodeRecord {
            uri: Some("post".to_string()),
            methods: Some(vec!["GET".to_string()]),
            ..NodeRecord::group("blog")
        };
        let mut validator = GroupValidator::new();
        assert!(!validator.validate(&record));
        assert_eq!(validator.errors().len(), 2);
    }

    #[test]
    fn test_errors_reset_between_runs() {
        let mut validator = GroupValidator::new();
        let bad = NodeRecord {
            sort_order: Some(-5),
            ..NodeRecord::group("blog")
        };
        assert!(!validator.validate(&bad));
        assert!(validator.validate(&NodeRecord::group("blog")));
        assert!(validator.errors().is_empty());
    }
}
