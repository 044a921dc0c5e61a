//! # SSO Auth
//!
//! Credential and token issuance engine for a multi-tenant SSO service —
//! registration, login, app-scoped signed tokens and admin checks.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │                 sso-auth                  │
//! ├───────────────────────────────────────────┤
//! │                   Auth                    │
//! │  (register, login, is_admin, create_app)  │
//! ├──────────────┬──────────────┬─────────────┤
//! │  Credential  │    Token     │   Storage   │
//! │  Verifier    │    Codec     │ (traits)    │
//! │  (argon2id)  │   (HS256)    │             │
//! ├──────────────┴──────────────┼─────────────┤
//! │                             │ MemoryStore │
//! │                             │ SqliteStore │
//! └─────────────────────────────┴─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sso_auth::{Auth, AuthConfig, SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::open("/var/lib/sso/sso.db")?);
//!     let auth = Auth::new(&AuthConfig::new().with_token_ttl_secs(3600), store.clone(), store)?;
//!
//!     let user_id = auth.register_new_user("alice@example.com", "SecureP@ss1").await?;
//!     let (app_id, _) = auth.create_app(user_id, "dashboard", "dashboard-secret").await?;
//!     let token = auth.login("alice@example.com", "SecureP@ss1", app_id).await?;
//!     println!("{token}");
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Tenant-bound tokens**: each token is signed with its app's own secret
//! - **No account probing**: unknown email and wrong password look identical
//! - **Pluggable storage**: anything implementing `UserRepository` + `AppRepository`
//! - **Railway Programming**: all operations return `Result<T, AuthError>`

pub mod auth;
pub mod config;
pub mod error;
pub mod storage;

// Re-exports for convenience
pub use auth::{App, Auth, CredentialVerifier, TokenClaims, TokenCodec, User, EMPTY_APP_ID};
pub use config::{AuthConfig, HashParams};
pub use error::{AuthError, Result, StorageError};
pub use storage::{AppRepository, MemoryStore, StorageResult, UserRepository};

#[cfg(feature = "sqlite")]
pub use storage::SqliteStore;
