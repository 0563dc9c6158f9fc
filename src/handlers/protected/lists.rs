use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};

use super::{json_body, path_id};
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Todo, TodoInput, TodoList, TodoListInput};

/// GET /lists
pub async fn list_index(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<TodoList>> {
    let lists = state.todos.list_lists(&user.identity).await?;
    Ok(ApiResponse::success(lists))
}

/// POST /lists
pub async fn list_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<TodoListInput>, JsonRejection>,
) -> ApiResult<TodoList> {
    let input = json_body(body)?;
    let list = state.todos.create_list(&user.identity, &input).await?;
    tracing::info!("Created todo list {} for {}", list.id, user.identity);
    Ok(ApiResponse::created(list))
}

/// GET /lists/:id
pub async fn list_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<TodoList> {
    let id = path_id(path)?;
    let list = state.todos.get_list(&user.identity, id).await?;
    Ok(ApiResponse::success(list))
}

/// PUT /lists/:id
pub async fn list_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<TodoListInput>, JsonRejection>,
) -> ApiResult<TodoList> {
    let id = path_id(path)?;
    let input = json_body(body)?;
    let list = state.todos.replace_list(&user.identity, id, &input).await?;
    Ok(ApiResponse::success(list))
}

/// DELETE /lists/:id
pub async fn list_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = path_id(path)?;
    state.todos.delete_list(&user.identity, id).await?;
    Ok(ApiResponse::no_content())
}

/// GET /lists/:id/todos
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Vec<Todo>> {
    let id = path_id(path)?;
    let todos = state.todos.todos_in_list(&user.identity, id).await?;
    Ok(ApiResponse::success(todos))
}

/// POST /lists/:id/todos
pub async fn list_todo_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<TodoInput>, JsonRejection>,
) -> ApiResult<Todo> {
    let id = path_id(path)?;
    let input = json_body(body)?;
    let todo = state.todos.create_todo(&user.identity, id, &input).await?;
    Ok(ApiResponse::created(todo))
}
