//! Node record validation.
//!
//! # Responsibilities
//! - Semantic validation of raw node records (serde handles syntactic)
//! - Gate records before a builder ever runs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validators never mutate input and never fail hard; callers gate on
//!   the boolean result
//! - One validator per node kind, selected by the record's `kind`

pub mod group;
pub mod route;

pub use group::GroupValidator;
pub use route::RouteValidator;

use crate::config::schema::NodeRecord;

/// Contract every per-kind validator implements.
pub trait NodeValidator {
    /// Check one record, replacing any errors from a previous run.
    fn validate(&mut self, record: &NodeRecord) -> bool;

    /// Errors collected by the last `validate` call.
    fn errors(&self) -> &[String];
}

/// Validate a record with the validator matching its `kind`.
///
/// A missing or unknown `kind` is itself the error.
pub fn validate_record(record: &NodeRecord) -> Result<(), Vec<String>> {
    match record.kind.as_deref() {
        Some("group") => {
            let mut validator = GroupValidator::new();
            if validator.validate(record) {
                Ok(())
            } else {
                Err(validator.errors().to_vec())
            }
        }
        Some("route") => {
            let mut validator = RouteValidator::new();
            if validator.validate(record) {
                Ok(())
            } else {
                Err(validator.errors().to_vec())
            }
        }
        Some(other) => Err(vec![format!("unknown node kind '{}'", other)]),
        None => Err(vec!["node record is missing 'kind'".to_string()]),
    }
}
