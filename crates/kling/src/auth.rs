//! Request signing for the Kling API.
//!
//! Every request carries a short-lived HS256 JWT derived from the account's
//! access/secret key pair. A token is minted per submission and reused for
//! the status polls that follow, well inside its validity window.

use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// Claims of a Kling request token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer: the account's access key.
    pub iss: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Not-before time (UTC Unix timestamp), backdated by the configured
    /// skew allowance.
    pub nbf: i64,
}

/// Mint a request token valid for `ttl_secs` from now.
pub fn mint_token(
    access_key: &str,
    secret_key: &str,
    ttl_secs: i64,
    skew_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        iss: access_key.to_string(),
        exp: now + ttl_secs,
        nbf: now - skew_secs,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(secret_key.as_bytes()),
    )
}
