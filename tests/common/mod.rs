//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::response::IntoResponse;
use tokio::sync::broadcast;

use route_compiler::actions::ControllerRegistry;
use route_compiler::admin::RouteEditor;
use route_compiler::compiler::{CompileInputs, RoutingEngine};
use route_compiler::config::schema::{AdminConfig, NodeRecord};
use route_compiler::http::{AppState, HttpServer};
use route_compiler::render::{EntrySource, MemoryEntries, StaticViews, ViewRenderer};
use route_compiler::store::{MemoryStore, NodeStore};

pub const TEST_API_KEY: &str = "test-admin-key";

/// An engine over an in-memory store with a couple of registered
/// controllers, views and entries.
pub fn test_engine(records: Vec<NodeRecord>, reserved: &[&str]) -> Arc<RoutingEngine> {
    let store: Arc<dyn NodeStore> = Arc::new(MemoryStore::new());
    test_engine_with_store(records, reserved, store)
}

pub fn test_engine_with_store(
    records: Vec<NodeRecord>,
    reserved: &[&str],
    store: Arc<dyn NodeStore>,
) -> Arc<RoutingEngine> {
    let mut controllers = ControllerRegistry::new();
    controllers.register_method("Pages", "contact", |_req| {
        "contact page".into_response()
    });
    controllers.register_method("Blog", "show", |req| {
        format!(
            "post:{}",
            req.params.get("slug").map(String::as_str).unwrap_or("?")
        )
        .into_response()
    });
    controllers.register_invokable("Homepage", |_req| "welcome".into_response());

    Arc::new(
        RoutingEngine::new(
            CompileInputs {
                records,
                reserved: reserved.iter().map(|s| s.to_string()).collect(),
            },
            store,
            Arc::new(controllers),
            true,
        )
        .expect("initial compile"),
    )
}

/// Full app state around an engine, with admin enabled.
pub fn test_state(engine: Arc<RoutingEngine>) -> AppState {
    let mut views = StaticViews::new();
    views.insert("pages.about", "<h1>About</h1>");
    views.insert("blog.post", "<h1>Post</h1>");
    let views: Arc<dyn ViewRenderer> = Arc::new(views);

    let mut entries = MemoryEntries::new();
    entries.insert(7, "<article>entry seven</article>");
    let entries: Option<Arc<dyn EntrySource>> = Some(Arc::new(entries));

    AppState {
        editor: Arc::new(RouteEditor::new(engine.clone())),
        engine,
        views,
        entries,
        admin: AdminConfig {
            enabled: true,
            api_key: TEST_API_KEY.to_string(),
        },
    }
}

/// Spawn the HTTP server on an ephemeral port; dropping the returned
/// sender shuts it down.
pub async fn spawn_server(state: AppState) -> (SocketAddr, broadcast::Sender<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let server = HttpServer::new(state, 5);
    tokio::spawn(async move {
        let _ = server.run_until(listener, shutdown_rx).await;
    });

    (addr, shutdown_tx)
}

/// A declarative blog group: prefix `blog` with a GET `post` route.
pub fn blog_group() -> NodeRecord {
    NodeRecord {
        children: Some(vec![NodeRecord::route("post", &["GET"], "view:blog.post")]),
        ..NodeRecord::group("blog")
    }
}
