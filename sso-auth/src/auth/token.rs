//! Token codec — app-scoped JWTs signed with the app's own secret
//!
//! A token signed for one app never validates against another app's
//! secret, and any change to the encoded claims breaks the HMAC.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::error::{AuthError, Result};

use super::types::{App, TokenClaims, User};

/// Issues and validates signed, time-bounded tokens
#[derive(Debug, Clone)]
pub struct TokenCodec {
    algorithm: Algorithm,
}

impl TokenCodec {
    pub fn new() -> Self {
        Self { algorithm: Algorithm::HS256 }
    }

    /// Issue a token for `user` scoped to `app`, expiring after `ttl`
    pub fn issue(&self, user: &User, app: &App, ttl: Duration) -> Result<String> {
        self.issue_at(user, app, ttl, Utc::now())
    }

    /// Issue with an explicit issuance instant
    pub fn issue_at(
        &self,
        user: &User,
        app: &App,
        ttl: Duration,
        issued_at: DateTime<Utc>,
    ) -> Result<String> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AuthError::TokenSigning(format!("ttl out of range: {e}")))?;
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::TokenSigning("expiry overflows".into()))?;

        let claims = TokenClaims {
            sub: user.id,
            email: user.email.clone(),
            app_id: app.id,
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        };

        encode(
            &Header::new(self.algorithm),
            &claims,
            &EncodingKey::from_secret(app.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenSigning(e.to_string()))
    }

    /// Decode and check a token against an app secret
    pub fn validate(&self, token: &str, app_secret: &str) -> Result<TokenClaims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(app_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
    }
}

impl Default for TokenCodec {
    fn default() -> Self {
        Self::new()
    }
}
