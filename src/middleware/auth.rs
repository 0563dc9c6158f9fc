use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{AuthError, Identity};
use crate::error::ApiError;

/// Authenticated caller, injected into request extensions by [`require_identity`]
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub identity: Identity,
}

/// Bearer authentication middleware: verifies the token with the identity
/// collaborator and hands the identity to the handlers
pub async fn require_identity(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)?;
    let identity = state.verifier.verify(token).await?;

    request.extensions_mut().insert(AuthUser { identity });
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::Malformed)?;

    // Auth schemes are case-insensitive
    match auth_str.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::Malformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn extracts_bearer_tokens() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(extract_bearer_token(&headers("bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(extract_bearer_token(&headers("BEARER abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn rejects_missing_and_malformed_headers() {
        assert!(matches!(extract_bearer_token(&HeaderMap::new()), Err(AuthError::MissingToken)));
        assert!(matches!(extract_bearer_token(&headers("Basic Zm9vOmJhcg==")), Err(AuthError::Malformed)));
        assert!(matches!(extract_bearer_token(&headers("Bearer   ")), Err(AuthError::Malformed)));
    }
}
