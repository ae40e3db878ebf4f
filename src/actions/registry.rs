//! Controller registry.
//!
//! The compile-time stand-in for "does this controller class and method
//! exist": applications register their handlers here before the compile
//! pass, and resolution refuses any descriptor the registry cannot answer.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::http::Method;
use axum::response::Response;

/// Request context handed to a matched route's handler.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub method: Method,
    pub path: String,
    /// Captured path parameters merged over the route's defaults.
    pub params: BTreeMap<String, String>,
    pub request_id: String,
}

/// An invokable dispatch unit.
pub type RouteHandler = Arc<dyn Fn(&RouteRequest) -> Response + Send + Sync>;

#[derive(Default)]
struct ControllerEntry {
    invoke: Option<RouteHandler>,
    methods: HashMap<String, RouteHandler>,
}

/// Registry of controller classes and their dispatchable methods.
#[derive(Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, ControllerEntry>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `<class>@<method>`.
    pub fn register_method<F>(&mut self, class: &str, method: &str, handler: F)
    where
        F: Fn(&RouteRequest) -> Response + Send + Sync + 'static,
    {
        self.controllers
            .entry(class.to_string())
            .or_default()
            .methods
            .insert(method.to_string(), Arc::new(handler));
    }

    /// Register a bare invokable `<class>`.
    pub fn register_invokable<F>(&mut self, class: &str, handler: F)
    where
        F: Fn(&RouteRequest) -> Response + Send + Sync + 'static,
    {
        self.controllers
            .entry(class.to_string())
            .or_default()
            .invoke = Some(Arc::new(handler));
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.controllers.contains_key(class)
    }

    pub fn has_method(&self, class: &str, method: &str) -> bool {
        self.controllers
            .get(class)
            .map(|c| c.methods.contains_key(method))
            .unwrap_or(false)
    }

    /// Look up the handler for a descriptor, `None` if either half is missing.
    pub fn handler(&self, class: &str, method: Option<&str>) -> Option<RouteHandler> {
        let entry = self.controllers.get(class)?;
        match method {
            Some(m) => entry.methods.get(m).cloned(),
            None => entry.invoke.clone(),
        }
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut classes: Vec<&String> = self.controllers.keys().collect();
        classes.sort();
        f.debug_struct("ControllerRegistry")
            .field("classes", &classes)
            .finish()
    }
}
