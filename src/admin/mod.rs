pub mod auth;
pub mod editor;
pub mod handlers;

pub use editor::{CreateRequest, EditError, NodeSummary, RouteEditor, UpdateRequest};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/routes", get(list_routes).post(create_route))
        .route(
            "/admin/routes/{id}",
            axum::routing::patch(update_route).delete(delete_route),
        )
        .route("/admin/routes/reorder", post(reorder_routes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .with_state(state)
}
