//! Bearer token check for write routes

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;

/// Token from an `Authorization: Bearer <token>` value.
///
/// Only the exact `Bearer ` prefix is accepted; a bare token or another
/// scheme yields `None`.
pub fn bearer_token(value: &str) -> Option<&str> {
    value.strip_prefix("Bearer ").filter(|token| !token.is_empty())
}

/// Rejects the request with 401 unless it carries the configured token
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .is_some_and(|token| token == state.settings.api_token);

    if !authorized {
        tracing::warn!(path = %request.uri().path(), "rejected upload credentials");
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer s3cret"), Some("s3cret"));
        assert_eq!(bearer_token("Bearer Bearer s3cret"), Some("Bearer s3cret"));
    }

    #[test]
    fn test_malformed_headers_rejected() {
        assert_eq!(bearer_token("s3cret"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("bearer s3cret"), None);
        assert_eq!(bearer_token("Basic czNjcmV0"), None);
    }
}
