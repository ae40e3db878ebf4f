//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the route
//! compiler: server settings plus the declarative route tree. All types
//! derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Admin editing API settings.
    pub admin: AdminConfig,

    /// Persisted route store settings.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// First path segments dynamic routes may never claim.
    pub reserved_prefixes: Vec<String>,

    /// Directory the view renderer reads templates from.
    pub views_dir: Option<String>,

    /// Inline content entries served by entry routes.
    pub entries: Vec<EntryConfig>,

    /// Declarative route tree, rebuilt on every compile.
    pub routes: Vec<NodeRecord>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Admin editing API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin editing API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// Persisted route store configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON-backed store. Unset = in-memory only.
    pub path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// An inline content entry addressable by entry routes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EntryConfig {
    pub id: i64,
    pub body: String,
}

/// One raw node of the declarative route tree.
///
/// Everything is optional at this layer; the node validators decide what a
/// record of each kind must carry. Serde covers syntax, validators cover
/// semantics.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeRecord {
    pub kind: Option<String>,
    pub enabled: Option<bool>,
    /// Signed so a negative value reaches the validator as a reported
    /// error instead of a parse failure.
    pub sort_order: Option<i64>,

    pub prefix: Option<String>,
    pub domain: Option<String>,
    pub namespace: Option<String>,
    pub middleware: Option<Vec<String>>,
    #[serde(rename = "where")]
    pub wheres: Option<BTreeMap<String, String>>,
    pub children: Option<Vec<NodeRecord>>,

    pub uri: Option<String>,
    pub methods: Option<Vec<String>>,
    pub name: Option<String>,
    pub action_type: Option<String>,
    pub action: Option<String>,
    pub entry_id: Option<i64>,
    pub defaults: Option<BTreeMap<String, String>>,
}

impl NodeRecord {
    /// Shorthand for a group record, used heavily by tests.
    pub fn group(prefix: &str) -> Self {
        Self {
            kind: Some("group".to_string()),
            prefix: Some(prefix.to_string()),
            ..Self::default()
        }
    }

    /// Shorthand for a controller route record.
    pub fn route(uri: &str, methods: &[&str], action: &str) -> Self {
        Self {
            kind: Some("route".to_string()),
            uri: Some(uri.to_string()),
            methods: Some(methods.iter().map(|m| m.to_string()).collect()),
            action: Some(action.to_string()),
            ..Self::default()
        }
    }
}
