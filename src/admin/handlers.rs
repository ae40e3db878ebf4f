use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::admin::editor::{CreateRequest, EditError, UpdateRequest};
use crate::http::server::AppState;
use crate::store::{ReorderChange, StoreError};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub routes: usize,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for EditError {
    fn into_response(self) -> Response {
        let status = match &self {
            EditError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EditError::Conflict { .. } | EditError::Rejected(_) => StatusCode::CONFLICT,
            EditError::NotFound(_) => StatusCode::NOT_FOUND,
            EditError::Readonly(_) => StatusCode::FORBIDDEN,
            EditError::UnknownParent(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EditError::Store(StoreError::NotFound(_))
            | EditError::Store(StoreError::UnknownParent(_))
            | EditError::Store(StoreError::ParentNotGroup(_))
            | EditError::Store(StoreError::NegativeSortOrder { .. })
            | EditError::Store(StoreError::Cycle(_))
            | EditError::Store(StoreError::NegativeId(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            EditError::Store(_) | EditError::Compile(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        routes: state.engine.snapshot().router.len(),
    })
}

pub async fn list_routes(State(state): State<AppState>) -> Result<Response, EditError> {
    let nodes = state.editor.list()?;
    Ok(Json(nodes).into_response())
}

pub async fn create_route(
    State(state): State<AppState>,
    Json(request): Json<CreateRequest>,
) -> Result<Response, EditError> {
    let created = state.editor.create(request)?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

pub async fn update_route(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<UpdateRequest>,
) -> Result<Response, EditError> {
    let updated = state.editor.update(id, patch)?;
    Ok(Json(updated).into_response())
}

pub async fn delete_route(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, EditError> {
    let deleted = state.editor.delete(id)?;
    Ok(Json(serde_json::json!({ "deleted": deleted })).into_response())
}

pub async fn reorder_routes(
    State(state): State<AppState>,
    Json(changes): Json<Vec<ReorderChange>>,
) -> Result<Response, EditError> {
    state.editor.reorder(changes)?;
    Ok(Json(serde_json::json!({ "reordered": true })).into_response())
}
