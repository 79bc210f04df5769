//! Admin Bearer token check.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::response::ApiError;

/// Expected admin credentials.
#[derive(Debug, Clone)]
pub struct AdminToken(Arc<str>);

impl AdminToken {
    pub fn new(api_key: impl AsRef<str>) -> Self {
        Self(Arc::from(api_key.as_ref()))
    }

    fn accepts(&self, header: Option<&str>) -> bool {
        header
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|token| !token.is_empty() && token == &*self.0)
    }
}

pub async fn admin_auth_middleware(
    State(token): State<AdminToken>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if token.accepts(header) {
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "Admin authorization failed");
    ApiError::Unauthorized.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_matching() {
        let token = AdminToken::new("secret");
        assert!(token.accepts(Some("Bearer secret")));
        assert!(!token.accepts(Some("Bearer other")));
        assert!(!token.accepts(Some("secret")));
        assert!(!token.accepts(None));
    }

    #[test]
    fn test_empty_key_never_matches() {
        let token = AdminToken::new("");
        assert!(!token.accepts(Some("Bearer ")));
    }
}
