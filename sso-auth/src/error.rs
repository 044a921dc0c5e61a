//! Error types for sso-auth
//!
//! Engine operations return `Result<T, AuthError>`, storage collaborators
//! return `Result<T, StorageError>`. No panics, no unwraps in production
//! code paths.

use thiserror::Error;

/// Unified error type for all engine operations
#[derive(Error, Debug)]
pub enum AuthError {
    // ─── Identity Errors ───

    /// Unknown email or wrong password. The two are never distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid app id")]
    InvalidAppId,

    #[error("user already exists")]
    UserExists,

    #[error("user not found")]
    UserNotFound,

    #[error("app already exists")]
    AppExists,

    // ─── Primitive Errors ───

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    TokenSigning(String),

    #[error("token expired")]
    TokenExpired,

    #[error("token invalid: {0}")]
    TokenInvalid(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    // ─── Call Lifecycle ───

    #[error("{op}: operation cancelled")]
    Cancelled { op: &'static str },

    #[error("{op}: deadline exceeded")]
    DeadlineExceeded { op: &'static str },

    // ─── Infrastructure Errors ───

    #[error("{op}: {source}")]
    Storage {
        op: &'static str,
        #[source]
        source: StorageError,
    },
}

impl AuthError {
    /// Wrap an unexpected storage failure with the originating operation
    pub fn storage(op: &'static str, source: StorageError) -> Self {
        AuthError::Storage { op, source }
    }

    /// True for failures the caller caused (bad input, bad credentials,
    /// collisions) as opposed to internal faults.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::InvalidAppId
                | AuthError::UserExists
                | AuthError::UserNotFound
                | AuthError::AppExists
                | AuthError::TokenExpired
                | AuthError::TokenInvalid(_)
        )
    }
}

/// Signals a storage collaborator reports back to the engine
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("user already exists")]
    UserExists,

    #[error("user not found")]
    UserNotFound,

    #[error("app already exists")]
    AppExists,

    #[error("app not found")]
    AppNotFound,

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        StorageError::Backend(format!("storage task failed: {err}"))
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, AuthError>;
