// handlers/protected/mod.rs - endpoints behind `require_identity`
//
// Every handler receives the verified caller as `Extension<AuthUser>` and
// passes its identity down to the service, which scopes all reads and
// writes to that owner.
pub mod folders;
pub mod lists;
pub mod todos;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::Json;

use crate::error::ApiError;

/// Unwrap a numeric path id, turning a bad segment into a 400
pub(crate) fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    let Path(id) = path?;
    Ok(id)
}

/// Unwrap a JSON body, turning parse failures into the API error envelope
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(value) = body?;
    Ok(value)
}
