//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create the Axum router: admin API plus the catch-all dispatcher
//! - Wire up middleware (timeout, request ID, tracing)
//! - Look up requests in the compiled route table and execute the
//!   matched dispatch target
//!
//! # Design Decisions
//! - One catch-all handler consults the compiled table; axum never sees
//!   individual routes, so admin edits only swap an Arc
//! - Request ID added as early as possible for tracing
//! - An unmatched request is an explicit 404, never a silent default

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::actions::{DispatchTarget, RouteRequest, ENTRY_ID_PARAM};
use crate::admin::{setup_admin_router, RouteEditor};
use crate::compiler::RoutingEngine;
use crate::config::schema::AdminConfig;
use crate::render::{EntrySource, ViewRenderer};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RoutingEngine>,
    pub editor: Arc<RouteEditor>,
    pub views: Arc<dyn ViewRenderer>,
    pub entries: Option<Arc<dyn EntrySource>>,
    pub admin: AdminConfig,
}

/// HTTP server for the compiled route table.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over the given state.
    pub fn new(state: AppState, request_timeout_secs: u64) -> Self {
        let router = Self::build_router(state, request_timeout_secs);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, request_timeout_secs: u64) -> Router {
        let mut router = Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state.clone());
        if state.admin.enabled {
            router = router.merge(setup_admin_router(state));
        }
        router
            .layer(TimeoutLayer::new(Duration::from_secs(request_timeout_secs)))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until ctrl-c.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run until the given shutdown channel fires; used by tests.
    pub async fn run_until(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let app = self.router;
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}

/// Main dispatch handler: look up the compiled table and execute the
/// matched target.
async fn dispatch_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Response {
    // The set-request-id layer fills this in; the fallback only covers a
    // request that somehow bypassed it.
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let snapshot = state.engine.snapshot();
    let Some(matched) = snapshot
        .router
        .match_request(&method, host.as_deref(), &path)
    else {
        tracing::debug!(method = %method, path = %path, "No route matched");
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };

    tracing::debug!(
        method = %method,
        path = %path,
        node_id = matched.route.node_id,
        target = %matched.route.target.describe(),
        middleware = ?matched.route.middleware,
        "Dispatching request"
    );

    let route_request = RouteRequest {
        method,
        path,
        params: matched.params.clone(),
        request_id,
    };

    match &matched.route.target {
        DispatchTarget::View { template } => {
            match state.views.render(template, &route_request.params) {
                Ok(body) => Html(body).into_response(),
                Err(err) => {
                    tracing::warn!(
                        node_id = matched.route.node_id,
                        template = %template,
                        error = %err,
                        "View render failed"
                    );
                    (StatusCode::NOT_FOUND, "Not Found").into_response()
                }
            }
        }

        DispatchTarget::Redirect { target, status } => Response::builder()
            .status(*status)
            .header(header::LOCATION, target)
            .body(Body::empty())
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),

        DispatchTarget::Controller { handler, .. } => handler(&route_request),

        DispatchTarget::Entry => {
            let entry_id = route_request
                .params
                .get(ENTRY_ID_PARAM)
                .and_then(|raw| raw.parse::<i64>().ok());
            match (entry_id, &state.entries) {
                (Some(id), Some(entries)) => match entries.render_entry(id, &route_request) {
                    Some(body) => Html(body).into_response(),
                    None => {
                        tracing::warn!(
                            node_id = matched.route.node_id,
                            entry_id = id,
                            "Content entry not found"
                        );
                        (StatusCode::NOT_FOUND, "Not Found").into_response()
                    }
                },
                _ => {
                    tracing::warn!(
                        node_id = matched.route.node_id,
                        "Entry route without usable entry id or source"
                    );
                    (StatusCode::NOT_FOUND, "Not Found").into_response()
                }
            }
        }

        DispatchTarget::NotFound { reason } => {
            tracing::debug!(
                node_id = matched.route.node_id,
                reason = %reason,
                "Serving 404 fallback target"
            );
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}
