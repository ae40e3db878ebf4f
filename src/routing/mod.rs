//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at boot and after every edit):
//!     RouteNode forest (declarative + persisted)
//!     → registrars push scopes/routes into router.rs (RouterBuilder)
//!     → where patterns compile, duplicates are refused
//!     → Freeze as immutable CompiledRouter
//!
//! Incoming Request (method, host, path)
//!     → router.rs (first matching route, params captured)
//!     → Return: RouteMatch or explicit no-match
//!
//! Candidate route (admin edit API):
//!     → guard.rs (reserved prefix, overlap against the merged forest)
//! ```
//!
//! # Design Decisions
//! - Routes compiled up front, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins, in registration order
//! - The guard and the builder share one overlap predicate (pattern.rs)

pub mod guard;
pub mod path;
pub mod pattern;
pub mod router;

pub use guard::{ConflictInfo, CreateCheck, RouteGuard};
pub use router::{CompiledRoute, CompiledRouter, RouteMatch, RouterBuilder};
