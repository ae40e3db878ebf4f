//! Action resolution.
//!
//! # Data Flow
//! ```text
//! RouteNode (validated, conflict-free)
//!     → action.rs (parse descriptor into a tagged Action)
//!     → resolver.rs (validate dispatch target exists)
//!     → DispatchTarget (or the 404 fallback, never a compile failure)
//! ```
//!
//! # Design Decisions
//! - Parsing produces tagged variants; no ordered `supports()` probing,
//!   so resolution cannot depend on chain order
//! - Every failure path converts to the 404 fallback with the cause
//!   logged; resolution never aborts the compile pass
//! - The entry resolver participates only when a content-entry source is
//!   registered

pub mod action;
pub mod registry;
pub mod resolver;
pub mod target;

pub use action::{parse_action_for_check, Action};
pub use registry::{ControllerRegistry, RouteHandler, RouteRequest};
pub use resolver::resolve_action;
pub use target::DispatchTarget;

/// Route default carrying the content-entry id for entry routes.
///
/// The entry id travels as a route default rather than inside the dispatch
/// target, so the target stays a fixed singleton.
pub const ENTRY_ID_PARAM: &str = "_entry";
