use std::env;

/// Session configuration.
///
/// A session is a signed token stored in a browser-session cookie. `expiry` is
/// the token lifetime in seconds.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub secret: String,
    pub expiry: i64,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("SESSION_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            expiry: env::var("SESSION_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1_209_600), // 2 weeks
            cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "sessionid".to_string()),
            cookie_secure: env::var("SESSION_COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}
