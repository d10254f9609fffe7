pub mod jwt;
pub mod store;

use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;

use crate::error::{Result, ServerError};
use crate::state::AppState;
use store::SessionData;

/// Name of the httpOnly session cookie.
pub const SESSION_COOKIE: &str = "hf_session";

/// Pull the session token from a request: `Authorization: Bearer …` wins,
/// the session cookie is the fallback.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    let cookies = headers.get(COOKIE).and_then(|v| v.to_str().ok())?;
    for part in cookies.split(';') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix(&format!("{SESSION_COOKIE}=")) {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Authenticate a request: the token must verify as a JWT and still be
/// present and unexpired in the session store (logout revokes immediately).
pub fn require_session(state: &Arc<AppState>, headers: &HeaderMap) -> Result<SessionData> {
    let token = extract_token(headers)
        .ok_or_else(|| ServerError::Unauthorized("missing session token".to_string()))?;

    jwt::verify(&state.config.jwt_secret, &token)?;

    state
        .sessions
        .get(&token)
        .ok_or_else(|| ServerError::Unauthorized("session expired or revoked".to_string()))
}

/// Authenticate and require the admin role.
pub fn require_admin(state: &Arc<AppState>, headers: &HeaderMap) -> Result<SessionData> {
    let session = require_session(state, headers)?;
    if session.role != "admin" {
        return Err(ServerError::Forbidden("admin role required".to_string()));
    }
    Ok(session)
}

/// Build the Set-Cookie value for a freshly issued session token.
pub fn session_cookie(token: &str, ttl_secs: u64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_secs}")
}

/// Build the Set-Cookie value that clears the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok-a"));
        headers.insert(
            COOKIE,
            HeaderValue::from_static("hf_session=tok-b; theme=dark"),
        );
        assert_eq!(extract_token(&headers).unwrap(), "tok-a");
    }

    #[test]
    fn test_cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; hf_session=tok-b"),
        );
        assert_eq!(extract_token(&headers).unwrap(), "tok-b");
    }

    #[test]
    fn test_no_token() {
        let headers = HeaderMap::new();
        assert!(extract_token(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_token(&headers).is_none());
    }
}
