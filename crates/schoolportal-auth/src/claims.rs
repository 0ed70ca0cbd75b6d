//! JWT claim structure for session tokens.

use serde::{Deserialize, Serialize};

/// Claims embedded in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account ID (subject claim)
    pub sub: String,
    /// Username at the time the session was established
    pub username: String,
    /// Expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize() {
        let claims = SessionClaims {
            sub: "account-id-123".to_string(),
            username: "annlee".to_string(),
            exp: 1234567890,
            iat: 1234567800,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""sub":"account-id-123""#));
        assert!(serialized.contains(r#""username":"annlee""#));
    }

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"sub":"abc","username":"bob","exp":10,"iat":5}"#;
        let claims: SessionClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "abc");
        assert_eq!(claims.username, "bob");
        assert_eq!(claims.exp, 10);
    }
}
