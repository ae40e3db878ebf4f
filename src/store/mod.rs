//! Persisted route node storage.
//!
//! # Data Flow
//! ```text
//! admin editor (create/update/delete/reorder)
//!     → NodeStore (flat rows, non-negative ids)
//!     → get_tree() (bulk fetch, children attached) → compile pass
//!     → node_with_ancestors(id) → path builder for create-under-group
//! ```
//!
//! # Design Decisions
//! - The compile pass is synchronous, so the store contract is too
//! - Storage stays flat; trees are hydrated on read
//! - Negative ids are refused at this boundary: the declarative id range
//!   must never reach persistence
//! - Reorder is validated and applied under one write lock (all or nothing)

pub mod json;
pub mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

use crate::node::{NodeWithAncestors, RouteNode};

/// One row of a bulk reorder request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderChange {
    pub id: i64,
    pub parent_id: Option<i64>,
    /// Signed so a negative value is rejected with a diagnostic instead of
    /// failing deserialization.
    pub sort_order: i64,
}

/// Storage failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("node {0} not found")]
    NotFound(i64),
    #[error("parent {0} not found")]
    UnknownParent(i64),
    #[error("parent {0} is not a group")]
    ParentNotGroup(i64),
    #[error("negative id {0} is reserved for declarative nodes")]
    NegativeId(i64),
    #[error("negative sort_order {sort_order} for node {id}")]
    NegativeSortOrder { id: i64, sort_order: i64 },
    #[error("reorder would make node {0} its own ancestor")]
    Cycle(i64),
    #[error("store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The narrow repository contract the guard, builders and editor consume.
pub trait NodeStore: Send + Sync {
    /// The whole persisted forest, children eagerly attached, soft-deleted
    /// rows filtered out.
    fn get_tree(&self) -> Result<Vec<RouteNode>, StoreError>;

    /// One node hydrated with its full parent chain, nearest first.
    fn node_with_ancestors(&self, id: i64) -> Result<Option<NodeWithAncestors>, StoreError>;

    fn get(&self, id: i64) -> Result<Option<RouteNode>, StoreError>;

    /// Flat listing of all live rows.
    fn list(&self) -> Result<Vec<RouteNode>, StoreError>;

    /// Persist a new node; the store assigns its id.
    fn insert(&self, node: RouteNode) -> Result<RouteNode, StoreError>;

    /// Replace an existing row.
    fn update(&self, node: RouteNode) -> Result<(), StoreError>;

    /// Soft-delete the given rows.
    fn soft_delete(&self, ids: &[i64]) -> Result<(), StoreError>;

    /// Apply a bulk parent/order change atomically: every row is validated
    /// before any row is written.
    fn reorder(&self, changes: &[ReorderChange]) -> Result<(), StoreError>;
}
