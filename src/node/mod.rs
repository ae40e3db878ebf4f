//! Route node model.
//!
//! # Data Flow
//! ```text
//! Declarative records (config file)          Persisted rows (store)
//!     → build/ (negative ids, per pass)          → store/ (non-negative ids)
//!     → RouteNode forest ──────────┬─────────────→ RouteNode forest
//!                                  ▼
//!                       merged forest (guard walks, registrars mount)
//! ```
//!
//! # Design Decisions
//! - One entity for both kinds; kind-specific fields are optional
//! - Id sign encodes provenance: negative = declarative, non-negative = persisted
//! - Children are attached eagerly when a tree is hydrated; storage stays flat

pub mod ids;
pub mod model;

pub use ids::SyntheticIds;
pub use model::{ActionType, NodeKind, NodeSource, NodeWithAncestors, RouteNode};
