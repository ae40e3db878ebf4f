//! Dynamic Route Compiler
//!
//! Compiles HTTP routes from two provenances into one conflict-free
//! routing table and serves it.
//!
//! # Architecture Overview
//!
//! ```text
//!  declarative config (TOML)      persisted tree (JSON store)
//!          │                              │
//!          ▼                              ▼
//!      build/ ──► validate/ ──► register/ ──► CompiledRouter
//!          ▲                              ▲        │
//!          │          routing/guard ◄─────┤        ▼
//!          │                │             │   http/server (axum)
//!     config watcher        │         admin/ (edit API)
//!     (recompile)           └── pre-write conflict/reservation checks
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use route_compiler::actions::ControllerRegistry;
use route_compiler::admin::RouteEditor;
use route_compiler::compiler::{CompileInputs, RoutingEngine};
use route_compiler::config::loader::load_config;
use route_compiler::config::watcher::ConfigWatcher;
use route_compiler::http::{AppState, HttpServer};
use route_compiler::render::{EntrySource, FileViews, MemoryEntries, StaticViews, ViewRenderer};
use route_compiler::store::{JsonStore, MemoryStore, NodeStore};

#[derive(Parser)]
#[command(name = "route-compiler")]
#[command(about = "Serve routes compiled from declarative config and a persisted tree", long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "routes.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    // Initialize tracing subscriber; RUST_LOG wins over the config level.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "route_compiler={},tower_http=info",
                    config.observability.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("route-compiler v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        declarative_roots = config.routes.len(),
        reserved = ?config.reserved_prefixes,
        admin_enabled = config.admin.enabled,
        "Configuration loaded"
    );

    let store: Arc<dyn NodeStore> = match &config.store.path {
        Some(path) => Arc::new(JsonStore::open(path)?),
        None => Arc::new(MemoryStore::new()),
    };

    // Applications hook their controllers in here; routes whose controllers
    // never get registered degrade to the 404 fallback at compile time.
    let controllers = Arc::new(ControllerRegistry::new());

    let views: Arc<dyn ViewRenderer> = match &config.views_dir {
        Some(dir) => Arc::new(FileViews::new(dir)),
        None => Arc::new(StaticViews::new()),
    };

    let entries: Option<Arc<dyn EntrySource>> = if config.entries.is_empty() {
        None
    } else {
        let mut source = MemoryEntries::new();
        for entry in &config.entries {
            source.insert(entry.id, &entry.body);
        }
        Some(Arc::new(source))
    };

    // The initial compile; failing to load the persisted tree is fatal.
    let engine = Arc::new(RoutingEngine::new(
        CompileInputs {
            records: config.routes.clone(),
            reserved: config.reserved_prefixes.clone(),
        },
        store,
        controllers,
        entries.is_some(),
    )?);
    let editor = Arc::new(RouteEditor::new(engine.clone()));

    // Hot reload: config edits swap in a freshly compiled table.
    let (watcher, mut config_updates) = ConfigWatcher::new(&cli.config);
    let _watcher_guard = watcher.run()?;
    {
        let engine = engine.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                let inputs = CompileInputs {
                    records: new_config.routes,
                    reserved: new_config.reserved_prefixes,
                };
                if let Err(e) = engine.reload(inputs) {
                    tracing::error!(error = %e, "Recompile after config reload failed");
                }
            }
        });
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let state = AppState {
        engine,
        editor,
        views,
        entries,
        admin: config.admin.clone(),
    };
    let server = HttpServer::new(state, config.listener.request_timeout_secs);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
