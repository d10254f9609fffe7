use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

/// JWT claims for a login session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// WHMCS client id.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issue an HS256 token for a client.
pub fn issue(
    secret: &str,
    client_id: &str,
    email: &str,
    name: &str,
    role: &str,
    ttl_secs: u64,
) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: client_id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        iat: now,
        exp: now + ttl_secs as i64,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ServerError::Internal(format!("token signing failed: {e}")))
}

/// Verify a token's signature and expiry, returning its claims.
pub fn verify(secret: &str, token: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| ServerError::Unauthorized(format!("invalid session token: {e}")))
}
