use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskboard_core::task::{ColumnId, Task, UpdateTask};
use taskboard_service::{ServiceError, TaskFilter, TOTAL_COUNT_HEADER};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    column: Option<String>,
    #[serde(rename = "_page")]
    page: Option<u32>,
    #[serde(rename = "_limit")]
    limit: Option<u32>,
    #[serde(rename = "_order")]
    order: Option<String>,
    q: Option<String>,
}

async fn list_tasks(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Response {
    let column = match q.column.as_deref() {
        None => None,
        Some(raw) => match ColumnId::parse_str(raw) {
            Some(c) => Some(c),
            // Unknown column value matches no rows.
            None => return with_total(Vec::new(), 0),
        },
    };
    let (rows, total) = state.store.select(&TaskFilter {
        column,
        search: q.q,
        page: q.page,
        limit: q.limit,
        oldest_first: q.order.as_deref() == Some("asc"),
    });
    with_total(rows, total)
}

fn with_total(rows: Vec<Task>, total: u64) -> Response {
    ([(TOTAL_COUNT_HEADER, total.to_string())], Json(rows)).into_response()
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, (StatusCode, Json<Value>)> {
    state.store.get(&id).map(Json).map_err(to_error)
}

async fn create_task(
    State(state): State<AppState>,
    Json(task): Json<Task>,
) -> Result<(StatusCode, Json<Task>), (StatusCode, Json<Value>)> {
    state.check_writable().map_err(to_error)?;
    state
        .store
        .insert(task)
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(to_error)
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<UpdateTask>,
) -> Result<Json<Task>, (StatusCode, Json<Value>)> {
    state.check_writable().map_err(to_error)?;
    state.store.patch(&id, &changes).map(Json).map_err(to_error)
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    state.check_writable().map_err(to_error)?;
    state
        .store
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(to_error)
}

fn to_error(e: ServiceError) -> (StatusCode, Json<Value>) {
    let (status, msg) = match &e {
        ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        ServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        ServiceError::Server { status, message } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message.clone(),
        ),
        ServiceError::Network(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
    };
    (status, Json(json!({ "error": msg })))
}
