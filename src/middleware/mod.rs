pub mod auth;
pub mod response;

pub use auth::{require_identity, AuthUser};
pub use response::{ApiResponse, ApiResult};
