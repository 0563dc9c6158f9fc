use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};

use super::{json_body, path_id};
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Folder, FolderInput, TodoList, TodoListInput};

/// GET /folders
pub async fn folder_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Folder>> {
    let folders = state.todos.list_folders(&user.identity).await?;
    Ok(ApiResponse::success(folders))
}

/// POST /folders
pub async fn folder_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<FolderInput>, JsonRejection>,
) -> ApiResult<Folder> {
    let input = json_body(body)?;
    let folder = state.todos.create_folder(&user.identity, &input).await?;
    tracing::info!("Created folder {} for {}", folder.id, user.identity);
    Ok(ApiResponse::created(folder))
}

/// GET /folders/:id
pub async fn folder_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Folder> {
    let id = path_id(path)?;
    let folder = state.todos.get_folder(&user.identity, id).await?;
    Ok(ApiResponse::success(folder))
}

/// PUT /folders/:id
pub async fn folder_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<FolderInput>, JsonRejection>,
) -> ApiResult<Folder> {
    let id = path_id(path)?;
    let input = json_body(body)?;
    let folder = state.todos.replace_folder(&user.identity, id, &input).await?;
    Ok(ApiResponse::success(folder))
}

/// DELETE /folders/:id - refused with 412 while lists are still filed under it
pub async fn folder_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = path_id(path)?;
    state.todos.delete_folder(&user.identity, id).await?;
    Ok(ApiResponse::no_content())
}

/// GET /folders/:id/lists
pub async fn folder_lists(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Vec<TodoList>> {
    let id = path_id(path)?;
    let lists = state.todos.lists_in_folder(&user.identity, id).await?;
    Ok(ApiResponse::success(lists))
}

/// POST /folders/:id/lists
pub async fn folder_list_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<TodoListInput>, JsonRejection>,
) -> ApiResult<TodoList> {
    let id = path_id(path)?;
    let input = json_body(body)?;
    let list = state
        .todos
        .create_list_in_folder(&user.identity, id, &input)
        .await?;
    Ok(ApiResponse::created(list))
}
