//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs::validate_config (semantic checks via validate/)
//!     → AppConfig (validated, immutable)
//!     → declarative records feed every compile pass
//!
//! On reload signal:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → engine recompiles and swaps the route table
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a full recompile
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{AdminConfig, AppConfig, ListenerConfig, NodeRecord, StoreConfig};
