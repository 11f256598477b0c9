use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::future::Future;
use std::sync::Arc;

use crate::{auth, AppError, AppState};

/// Pull the session JWT off the request: the `__session` cookie set by the
/// web frontend, or an `Authorization: Bearer` header.
fn extract_token_from_request(parts: &Parts) -> Option<String> {
    token_from_cookies(parts).or_else(|| token_from_bearer(parts))
}

fn token_from_cookies(parts: &Parts) -> Option<String> {
    let cookies = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .filter_map(|cookie| cookie.trim().strip_prefix("__session="))
        .map(str::to_string)
        .next()
}

fn token_from_bearer(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::to_string)
}

/// The verified identity behind a request. The subject claim is the owner
/// id that scopes every store and sealing operation; there is no separate
/// profile table to resolve against.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub owner_id: String,
    pub email: Option<String>,
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        // Try both cookie-based auth (for frontend) and Bearer token (for testing)
        let token = extract_token_from_request(parts);

        let state = state.clone();

        async move {
            let token = token.ok_or_else(|| {
                AppError::Authentication(
                    "Missing authentication: no __session cookie or Authorization header"
                        .to_string(),
                )
            })?;

            let claims = auth::validate_jwt(
                &token,
                &state.jwks_cache,
                &state.config.auth_issuer,
                &state.config.auth_audience,
            )
            .await
            .map_err(|e| AppError::Authentication(format!("JWT validation failed: {}", e)))?;

            tracing::debug!(owner_id = %claims.sub, "request authenticated");

            Ok(AuthenticatedUser {
                owner_id: claims.sub,
                email: claims.email,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(name: &'static str, value: &'static str) -> Parts {
        Request::builder()
            .header(name, value)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn session_cookie_wins_over_other_cookies() {
        let parts = parts_with("cookie", "theme=dark; __session=tok123; lang=en");
        assert_eq!(extract_token_from_request(&parts).as_deref(), Some("tok123"));
    }

    #[test]
    fn bearer_header_is_accepted() {
        let parts = parts_with("authorization", "Bearer tok456");
        assert_eq!(extract_token_from_request(&parts).as_deref(), Some("tok456"));
    }

    #[test]
    fn absent_credentials_yield_none() {
        let parts = Request::builder().body(()).unwrap().into_parts().0;
        assert!(extract_token_from_request(&parts).is_none());
    }
}
