use std::sync::Arc;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use hostforge_core::validate;

use crate::api::ok;
use crate::error::{Result, ServerError};
use crate::session::{self, jwt, store::SessionData};
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issue a token + session for a client and build the login response with
/// the session cookie attached.
fn issue_session(
    state: &Arc<AppState>,
    client_id: &str,
    email: &str,
    name: &str,
) -> Result<Response> {
    let role = "client";
    let ttl = state.config.session_ttl_secs;
    let token = jwt::issue(&state.config.jwt_secret, client_id, email, name, role, ttl)?;

    let now = chrono::Utc::now().timestamp() as u64;
    state.sessions.insert(
        token.clone(),
        SessionData {
            client_id: client_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            expires_at: now + ttl,
        },
    );

    let cookie = session::session_cookie(&token, ttl);
    let body = ok(json!({
        "token": token,
        "client": {
            "client_id": client_id,
            "email": email,
            "name": name,
            "role": role,
        },
    }));

    Ok(([(SET_COOKIE, cookie)], body).into_response())
}

/// POST /api/auth/register
///
/// Validates the form, creates the client in the billing backend, and
/// logs the new client straight in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response> {
    register_inner(&state, req).await
}

async fn register_inner(state: &Arc<AppState>, req: RegisterRequest) -> Result<Response> {
    let first_name = validate::person_name("first name", &req.first_name)?;
    let last_name = validate::person_name("last name", &req.last_name)?;
    let email = validate::email(&req.email)?;
    let password = validate::password(&req.password)?;
    let country = validate::country_code(&req.country)?;
    let phone = req.phone.as_deref().map(validate::phone).transpose()?;
    let postcode = req.postcode.as_deref().map(validate::postcode).transpose()?;

    let account = state
        .whmcs
        .add_client(
            &first_name,
            &last_name,
            &email,
            &password,
            &country,
            phone.as_deref(),
            postcode.as_deref(),
        )
        .await?;

    tracing::info!(client_id = %account.client_id, "client registered");
    issue_session(state, &account.client_id, &account.email, &account.name)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Response> {
    login_inner(&state, req).await
}

async fn login_inner(state: &Arc<AppState>, req: LoginRequest) -> Result<Response> {
    let email = validate::email(&req.email)?;
    if req.password.is_empty() {
        return Err(ServerError::BadRequest("password is required".to_string()));
    }

    let account = state.whmcs.validate_login(&email, &req.password).await?;

    tracing::info!(client_id = %account.client_id, "client logged in");
    issue_session(state, &account.client_id, &account.email, &account.name)
}

/// GET /api/auth/me
///
/// The authenticated client's session profile.
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    me_inner(&state, &headers)
}

fn me_inner(state: &Arc<AppState>, headers: &HeaderMap) -> Result<Response> {
    let session = session::require_session(state, headers)?;
    Ok(ok(json!(session)).into_response())
}

/// POST /api/auth/logout
///
/// Revokes the session immediately and clears the cookie.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response> {
    logout_inner(&state, &headers)
}

fn logout_inner(state: &Arc<AppState>, headers: &HeaderMap) -> Result<Response> {
    let session = session::require_session(state, headers)?;
    if let Some(token) = session::extract_token(headers) {
        state.sessions.remove(&token);
    }

    tracing::info!(client_id = %session.client_id, "client logged out");
    let body = ok(json!({ "logged_out": true }));
    Ok(([(SET_COOKIE, session::clear_session_cookie())], body).into_response())
}

/// POST /api/auth
///
/// Legacy entry point: the JSON body carries a `path` field naming the
/// operation, with the operation's own fields alongside it.
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response> {
    let path = body["path"]
        .as_str()
        .ok_or_else(|| ServerError::BadRequest("path is required".to_string()))?
        .trim_matches('/')
        .to_string();

    match path.as_str() {
        "register" => {
            let req = parse_body(body)?;
            register_inner(&state, req).await
        }
        "login" => {
            let req = parse_body(body)?;
            login_inner(&state, req).await
        }
        "me" => me_inner(&state, &headers),
        "logout" => logout_inner(&state, &headers),
        other => Err(ServerError::NotFound(format!("unknown auth path {other}"))),
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| ServerError::BadRequest(format!("invalid body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;
    use axum::http::StatusCode;

    use crate::config::Config;
    use crate::whmcs::mock;

    fn test_state() -> Arc<AppState> {
        let config = Config {
            port: 0,
            database_url: None,
            allowed_origins: vec![],
            jwt_secret: "test-secret".to_string(),
            session_ttl_secs: 3_600,
            checkout_ttl_secs: 600,
            whmcs: None,
            stripe_secret_key: None,
            stripe_webhook_secret: None,
            paypal_client_id: None,
            paypal_client_secret: None,
            paypal_mode: "sandbox".to_string(),
            dev_mode: true,
            status_check_interval_secs: 60,
        };
        Arc::new(AppState::new(config, None))
    }

    #[tokio::test]
    async fn test_mock_login_creates_session() {
        let state = test_state();
        let resp = login_inner(
            &state,
            LoginRequest {
                email: mock::DEMO_EMAIL.to_string(),
                password: mock::DEMO_PASSWORD.to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.sessions.len(), 1);
        assert!(resp.headers().get(SET_COOKIE).is_some());
    }

    #[tokio::test]
    async fn test_bad_password_is_401() {
        let state = test_state();
        let err = login_inner(
            &state,
            LoginRequest {
                email: mock::DEMO_EMAIL.to_string(),
                password: "wrong".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServerError::Unauthorized(_)));
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_register_rejects_malformed_email() {
        let state = test_state();
        let err = register_inner(
            &state,
            RegisterRequest {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "not-an-email".to_string(),
                password: "abc12345".to_string(),
                country: "GB".to_string(),
                phone: None,
                postcode: None,
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    #[tokio::test]
    async fn test_me_without_token_is_401() {
        let state = test_state();
        let err = me_inner(&state, &HeaderMap::new()).unwrap_err();
        assert!(matches!(err, ServerError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_me_with_revoked_session_is_401() {
        let state = test_state();
        // A token that verifies but is no longer in the store.
        let token = jwt::issue(
            &state.config.jwt_secret,
            "1001",
            mock::DEMO_EMAIL,
            "Demo Customer",
            "client",
            3_600,
        )
        .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        let err = me_inner(&state, &headers).unwrap_err();
        assert!(matches!(err, ServerError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_logout_revokes_the_session() {
        let state = test_state();
        let token = jwt::issue(
            &state.config.jwt_secret,
            "1001",
            mock::DEMO_EMAIL,
            "Demo Customer",
            "client",
            3_600,
        )
        .unwrap();
        let now = chrono::Utc::now().timestamp() as u64;
        state.sessions.insert(
            token.clone(),
            SessionData {
                client_id: "1001".to_string(),
                email: mock::DEMO_EMAIL.to_string(),
                name: "Demo Customer".to_string(),
                role: "client".to_string(),
                expires_at: now + 3_600,
            },
        );

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        assert!(me_inner(&state, &headers).is_ok());

        let resp = logout_inner(&state, &headers).unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(state.sessions.is_empty());

        // The very same token is now refused.
        let err = me_inner(&state, &headers).unwrap_err();
        assert!(matches!(err, ServerError::Unauthorized(_)));
    }
}
