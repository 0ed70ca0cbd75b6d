//! # School Portal Auth
//!
//! Session token types and utilities.
//!
//! A logged-in session is a signed JWT carried in the session cookie. The
//! token names the account ([`SessionClaims::sub`]) and expires after the
//! configured session lifetime.
//!
//! # Example
//!
//! ```ignore
//! use schoolportal_auth::{create_session_token, verify_session_token};
//! use schoolportal_config::SessionConfig;
//!
//! let config = SessionConfig::from_env();
//! let token = create_session_token(account_id, "annlee", &config)?;
//! let claims = verify_session_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::SessionClaims;
pub use jwt::{create_session_token, verify_session_token};
