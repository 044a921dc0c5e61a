//! Credential verifier — salted Argon2id hashing and constant-time checks
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`) so the
//! algorithm, cost and salt travel with the hash and verification needs no
//! side channel. Comparison of the derived output is constant-time inside
//! `password-hash`.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::config::HashParams;
use crate::error::{AuthError, Result};

/// One-way password hashing with a fixed cost factor
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    params: Params,
}

impl CredentialVerifier {
    pub fn new(cost: HashParams) -> Result<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| AuthError::Hashing(format!("invalid cost parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<Vec<u8>> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(hash.to_string().into_bytes())
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch; a malformed hash is an error.
    pub fn verify(&self, hash: &[u8], password: &str) -> Result<bool> {
        let encoded = std::str::from_utf8(hash)
            .map_err(|_| AuthError::Hashing("stored hash is not valid UTF-8".into()))?;
        let parsed =
            PasswordHash::new(encoded).map_err(|e| AuthError::Hashing(e.to_string()))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Hashing(e.to_string())),
        }
    }
}
