//! Configuration for the auth engine

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime of issued tokens in seconds
    pub token_ttl_secs: u64,

    /// Password hashing cost
    pub hash_params: HashParams,
}

impl AuthConfig {
    /// Create config with sensible defaults (1h tokens, OWASP Argon2id cost)
    pub fn new() -> Self {
        Self {
            token_ttl_secs: 3600,
            hash_params: HashParams::default(),
        }
    }

    /// Override token lifetime
    pub fn with_token_ttl_secs(mut self, secs: u64) -> Self {
        self.token_ttl_secs = secs;
        self
    }

    /// Override hashing cost
    pub fn with_hash_params(mut self, params: HashParams) -> Self {
        self.hash_params = params;
        self
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    /// Reject a TTL that is zero or too large to turn into a token expiry
    pub fn validate(&self) -> Result<()> {
        if self.token_ttl_secs == 0 {
            return Err(AuthError::InvalidConfig("token_ttl_secs must be positive".into()));
        }

        let expiry = chrono::Duration::from_std(self.token_ttl())
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
        if expiry.is_none() {
            return Err(AuthError::InvalidConfig(format!(
                "token_ttl_secs {} is out of range",
                self.token_ttl_secs
            )));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}
