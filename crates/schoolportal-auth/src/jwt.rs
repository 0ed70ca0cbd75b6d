//! Session token creation and verification.
//!
//! # Example
//!
//! ```ignore
//! let token = create_session_token(account_id, "annlee", &session_config)?;
//! let claims = verify_session_token(&token, &session_config)?;
//! assert_eq!(claims.username, "annlee");
//! ```

use anyhow::anyhow;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use schoolportal_config::SessionConfig;
use schoolportal_core::AppError;

use crate::claims::SessionClaims;

/// Creates a signed session token for an account.
///
/// # Errors
///
/// Returns an internal error if token encoding fails.
pub fn create_session_token(
    account_id: Uuid,
    username: &str,
    session_config: &SessionConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let exp = (now + session_config.expiry).max(0);

    let claims = SessionClaims {
        sub: account_id.to_string(),
        username: username.to_string(),
        exp: exp as usize,
        iat: now as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(session_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow!("Failed to create session token: {}", e)))
}

/// Verifies a session token and returns its claims.
///
/// # Errors
///
/// Returns an unauthorized error if the signature is invalid, the token has
/// expired, or the token is malformed.
pub fn verify_session_token(
    token: &str,
    session_config: &SessionConfig,
) -> Result<SessionClaims, AppError> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(session_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized(anyhow!("Invalid or expired session")))
}
