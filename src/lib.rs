//! Dynamic Route Compiler Library
//!
//! Compiles declarative configuration and a runtime-editable persisted
//! tree into one conflict-free routing table served behind Axum.

pub mod actions;
pub mod admin;
pub mod build;
pub mod compiler;
pub mod config;
pub mod http;
pub mod node;
pub mod register;
pub mod render;
pub mod routing;
pub mod store;
pub mod validate;

pub use compiler::{CompileInputs, RoutingEngine};
pub use config::AppConfig;
pub use http::HttpServer;
pub use node::RouteNode;
