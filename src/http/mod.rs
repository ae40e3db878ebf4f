//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, trace)
//!     → compiled route table lookup (first match wins)
//!     → dispatch target execution (view/redirect/controller/entry/404)
//!     → Send to client
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
