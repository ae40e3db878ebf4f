//! The compile pass.
//!
//! # Data Flow
//! ```text
//! declarative records + persisted tree
//!     → build/ (fresh negative ids per pass)
//!     → register/ (through the router builder)
//!     → CompiledRouter + RouteGuard snapshot
//!     → ArcSwap publication (atomic table swap, no downtime)
//! ```
//!
//! # Design Decisions
//! - The pass is synchronous and single-threaded; it runs to completion
//!   before any request sees the new table
//! - Only a persisted-tree load failure is fatal; every per-node failure
//!   was already degraded or skipped upstream
//! - Admin edits and config reloads both funnel through `recompile`

use std::sync::{Arc, RwLock};

use arc_swap::ArcSwap;

use crate::actions::ControllerRegistry;
use crate::build::build_forest;
use crate::config::schema::NodeRecord;
use crate::node::{RouteNode, SyntheticIds};
use crate::register::{register_forest, RegisterContext};
use crate::routing::{CompiledRouter, RouteGuard, RouterBuilder};
use crate::store::{NodeStore, StoreError};

/// What a compile pass consumes besides the store.
#[derive(Debug, Clone, Default)]
pub struct CompileInputs {
    pub records: Vec<NodeRecord>,
    pub reserved: Vec<String>,
}

/// What a compile pass produces.
pub struct CompileOutput {
    pub router: CompiledRouter,
    /// The declarative forest snapshot the guard walks.
    pub declarative: Arc<Vec<RouteNode>>,
    pub guard: Arc<RouteGuard>,
}

/// Fatal compile failure.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("failed to load the persisted route tree: {0}")]
    Store(#[from] StoreError),
}

/// Owns the compile inputs and publishes each pass atomically.
pub struct RoutingEngine {
    inputs: RwLock<CompileInputs>,
    store: Arc<dyn NodeStore>,
    controllers: Arc<ControllerRegistry>,
    entries_registered: bool,
    current: ArcSwap<CompileOutput>,
}

impl RoutingEngine {
    /// Run the initial compile; a failure here is a boot failure.
    pub fn new(
        inputs: CompileInputs,
        store: Arc<dyn NodeStore>,
        controllers: Arc<ControllerRegistry>,
        entries_registered: bool,
    ) -> Result<Self, CompileError> {
        let output = compile(&inputs, &store, &controllers, entries_registered)?;
        Ok(Self {
            inputs: RwLock::new(inputs),
            store,
            controllers,
            entries_registered,
            current: ArcSwap::from_pointee(output),
        })
    }

    /// The latest published table and guard.
    pub fn snapshot(&self) -> Arc<CompileOutput> {
        self.current.load_full()
    }

    /// Recompile against the current inputs (after a store edit).
    pub fn recompile(&self) -> Result<(), CompileError> {
        let inputs = self.inputs.read().expect("inputs lock poisoned").clone();
        let output = compile(&inputs, &self.store, &self.controllers, self.entries_registered)?;
        self.current.store(Arc::new(output));
        Ok(())
    }

    /// Swap in new declarative inputs (config reload) and recompile.
    pub fn reload(&self, new_inputs: CompileInputs) -> Result<(), CompileError> {
        let output = compile(&new_inputs, &self.store, &self.controllers, self.entries_registered)?;
        *self.inputs.write().expect("inputs lock poisoned") = new_inputs;
        self.current.store(Arc::new(output));
        Ok(())
    }

    pub fn store(&self) -> Arc<dyn NodeStore> {
        self.store.clone()
    }
}

/// One synchronous build → validate → register pass.
fn compile(
    inputs: &CompileInputs,
    store: &Arc<dyn NodeStore>,
    controllers: &Arc<ControllerRegistry>,
    entries_registered: bool,
) -> Result<CompileOutput, CompileError> {
    let mut ids = SyntheticIds::new();
    let declarative = Arc::new(build_forest(&inputs.records, &mut ids));

    // A store that cannot be read at all is the one fatal condition.
    let persisted = store.get_tree()?;

    let ctx = RegisterContext {
        controllers: controllers.as_ref(),
        entries_registered,
    };
    let mut builder = RouterBuilder::new();
    register_forest(&declarative, &mut builder, &ctx);
    register_forest(&persisted, &mut builder, &ctx);
    let router = builder.build();

    tracing::info!(
        routes = router.len(),
        declarative_roots = declarative.len(),
        persisted_roots = persisted.len(),
        "Route table compiled"
    );

    let guard = Arc::new(RouteGuard::new(
        inputs.reserved.clone(),
        declarative.clone(),
        store.clone(),
    ));

    Ok(CompileOutput {
        router,
        declarative,
        guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use crate::routing::pattern::normalize_methods;
    use crate::store::MemoryStore;
    use axum::http::Method;

    fn engine_with(records: Vec<NodeRecord>) -> RoutingEngine {
        RoutingEngine::new(
            CompileInputs {
                records,
                reserved: vec!["admin".to_string()],
            },
            Arc::new(MemoryStore::new()),
            Arc::new(ControllerRegistry::new()),
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_compile_merges_both_provenances() {
        let store: Arc<dyn NodeStore> = Arc::new(MemoryStore::new());
        let mut persisted = RouteNode::new(0, NodeKind::Route);
        persisted.uri = Some("contact".to_string());
        persisted.methods = normalize_methods(["GET"]);
        persisted.action = Some("view:contact".to_string());
        store.insert(persisted).unwrap();

        let inputs = CompileInputs {
            records: vec![NodeRecord::route("about", &["GET"], "view:about")],
            reserved: Vec::new(),
        };
        let engine = RoutingEngine::new(
            inputs,
            store,
            Arc::new(ControllerRegistry::new()),
            false,
        )
        .unwrap();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.router.len(), 2);
        assert!(snapshot
            .router
            .match_request(&Method::GET, None, "/about")
            .is_some());
        assert!(snapshot
            .router
            .match_request(&Method::GET, None, "/contact")
            .is_some());
    }

    #[test]
    fn test_recompile_sees_store_changes() {
        let engine = engine_with(Vec::new());
        assert!(engine.snapshot().router.is_empty());

        let mut node = RouteNode::new(0, NodeKind::Route);
        node.uri = Some("fresh".to_string());
        node.methods = normalize_methods(["GET"]);
        node.action = Some("view:fresh".to_string());
        engine.store().insert(node).unwrap();

        engine.recompile().unwrap();
        assert_eq!(engine.snapshot().router.len(), 1);
    }

    #[test]
    fn test_reload_replaces_declarative_inputs() {
        let engine = engine_with(vec![NodeRecord::route("old", &["GET"], "view:old")]);
        engine
            .reload(CompileInputs {
                records: vec![NodeRecord::route("new", &["GET"], "view:new")],
                reserved: Vec::new(),
            })
            .unwrap();

        let snapshot = engine.snapshot();
        assert!(snapshot.router.match_request(&Method::GET, None, "/old").is_none());
        assert!(snapshot.router.match_request(&Method::GET, None, "/new").is_some());
    }

    #[test]
    fn test_compile_is_idempotent() {
        let engine = engine_with(vec![
            NodeRecord::group("blog"),
            NodeRecord::route("about", &["GET"], "view:about"),
        ]);
        let first: Vec<(String, String)> = engine
            .snapshot()
            .router
            .routes()
            .iter()
            .map(|r| (r.full_path.clone(), r.target.describe()))
            .collect();

        engine.recompile().unwrap();
        let second: Vec<(String, String)> = engine
            .snapshot()
            .router
            .routes()
            .iter()
            .map(|r| (r.full_path.clone(), r.target.describe()))
            .collect();

        assert_eq!(first, second);
    }
}
