//! Auth domain types — User, App, TokenClaims
//!
//! Serializable, cloneable, and cheap to pass around. `Debug` output never
//! contains password hashes or app secrets.

use serde::{Deserialize, Serialize};

/// App id value meaning "no app id supplied"
pub const EMPTY_APP_ID: i64 = 0;

/// User record as owned by the storage collaborator
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Self-describing password hash (PHC string bytes), never plaintext
    pub pass_hash: Vec<u8>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("pass_hash", &"<redacted>")
            .finish()
    }
}

/// Client application (tenant) whose secret signs its users' tokens
#[derive(Clone, PartialEq, Eq)]
pub struct App {
    pub id: i64,
    pub name: String,
    pub secret: String,
}

impl App {
    pub fn new(id: i64, name: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// JWT claims for app-scoped session tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user id)
    pub sub: i64,
    pub email: String,
    pub app_id: i64,
    /// Expiry (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl TokenClaims {
    /// Lifetime the token was issued with, in seconds
    pub fn ttl_secs(&self) -> i64 {
        self.exp - self.iat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let user = User { id: 1, email: "a@x.com".into(), pass_hash: b"$argon2id$v=19$abc".to_vec() };
        let app = App::new(7, "app7", "s7");

        let user_dbg = format!("{user:?}");
        let app_dbg = format!("{app:?}");
        assert!(user_dbg.contains("a@x.com"));
        assert!(!user_dbg.contains("argon2id"));
        assert!(app_dbg.contains("app7"));
        assert!(!app_dbg.contains("\"s7\""));
    }

    #[test]
    fn test_claims_serialization() {
        let claims = TokenClaims { sub: 1, email: "a@x.com".into(), app_id: 7, exp: 100, iat: 40 };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["sub"], 1);
        assert_eq!(json["app_id"], 7);
        assert_eq!(claims.ttl_secs(), 60);
    }
}
