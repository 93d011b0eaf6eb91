use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, TodoService, UpdateOutcome},
    state::AppState,
    store::{Todo, TodoId},
};

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
}

/// Absent fields are left alone; `"title": ""` is a request to delete.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleAllRequest {
    pub completed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: usize,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/toggle-all", patch(toggle_all_todos))
        .route("/todos/completed", delete(delete_completed_todos))
        .route("/todos/count/active", get(active_count))
        .route("/todos/count/total", get(total_count))
        .route(
            "/todos/{id}",
            get(get_todo)
                .put(update_todo)
                .patch(update_todo)
                .delete(delete_todo),
        )
        .route("/todos/{id}/toggle", patch(toggle_todo))
        .with_state(state)
}

async fn list_todos(State(state): State<Arc<AppState>>) -> ApiResult<Vec<TodoResponse>> {
    let todos = todo_service_from_state(&state).get_all_todos();
    JsonApiResponse::ok(into_responses(todos))
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTodoRequest>,
) -> ApiResult<TodoResponse> {
    let todo = todo_service_from_state(&state).create_todo(&body.title)?;
    JsonApiResponse::with_status(StatusCode::CREATED, "created", todo.into())
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<TodoResponse> {
    let todo = todo_service_from_state(&state).get_todo_by_id(TodoId(id))?;
    JsonApiResponse::ok(todo.into())
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<UpdateTodoRequest>,
) -> ApiResult<Option<TodoResponse>> {
    let UpdateTodoRequest { title, completed } = body;
    let service = todo_service_from_state(&state);
    match service.update_todo(TodoId(id), title.as_deref(), completed)? {
        UpdateOutcome::Updated(todo) => JsonApiResponse::ok(Some(todo.into())),
        UpdateOutcome::Deleted => {
            JsonApiResponse::with_status(StatusCode::NO_CONTENT, "deleted", None)
        }
    }
}

async fn toggle_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<TodoResponse> {
    let todo = todo_service_from_state(&state).toggle_todo(TodoId(id))?;
    JsonApiResponse::ok(todo.into())
}

async fn toggle_all_todos(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ToggleAllRequest>,
) -> ApiResult<Vec<TodoResponse>> {
    let todos = todo_service_from_state(&state).toggle_all_todos(body.completed);
    JsonApiResponse::ok(into_responses(todos))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<serde_json::Value> {
    todo_service_from_state(&state).delete_todo(TodoId(id))?;
    JsonApiResponse::with_status(StatusCode::NO_CONTENT, "deleted", serde_json::Value::Null)
}

async fn delete_completed_todos(State(state): State<Arc<AppState>>) -> ApiResult<DeletedResponse> {
    let deleted = todo_service_from_state(&state).delete_completed_todos();
    JsonApiResponse::ok(DeletedResponse { deleted })
}

async fn active_count(State(state): State<Arc<AppState>>) -> ApiResult<CountResponse> {
    let count = todo_service_from_state(&state).get_active_count();
    JsonApiResponse::ok(CountResponse { count })
}

async fn total_count(State(state): State<Arc<AppState>>) -> ApiResult<CountResponse> {
    let count = todo_service_from_state(&state).get_total_count();
    JsonApiResponse::ok(CountResponse { count })
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            completed: todo.completed,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

fn into_responses(todos: Vec<Todo>) -> Vec<TodoResponse> {
    todos.into_iter().map(TodoResponse::from).collect()
}

fn todo_service_from_state(state: &AppState) -> TodoService {
    ServiceContext::from_state(state).todo()
}
