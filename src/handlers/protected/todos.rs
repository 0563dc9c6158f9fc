use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};

use super::{json_body, path_id};
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Todo, TodoInput};

/// GET /todos/:id
pub async fn todo_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Todo> {
    let id = path_id(path)?;
    let todo = state.todos.get_todo(&user.identity, id).await?;
    Ok(ApiResponse::success(todo))
}

/// PUT /todos/:id - full replacement, omitted fields fall back to defaults
pub async fn todo_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<TodoInput>, JsonRejection>,
) -> ApiResult<Todo> {
    let id = path_id(path)?;
    let input = json_body(body)?;
    let todo = state.todos.replace_todo(&user.identity, id, &input).await?;
    Ok(ApiResponse::success(todo))
}

/// DELETE /todos/:id
pub async fn todo_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = path_id(path)?;
    state.todos.delete_todo(&user.identity, id).await?;
    Ok(ApiResponse::no_content())
}
