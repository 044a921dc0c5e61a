//! Storage capabilities the engine consumes
//!
//! Implementations must be safe for concurrent use; the engine shares them
//! across requests behind `Arc` and adds no locking of its own.

use async_trait::async_trait;

use crate::auth::{App, User};
use crate::error::StorageError;

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Persistent user identities, keyed by unique email
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user; `UserExists` when the email is taken
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> StorageResult<i64>;

    /// Look up a user by email; `UserNotFound` when absent
    async fn user(&self, email: &str) -> StorageResult<User>;

    /// Admin flag for a user id; `UserNotFound` when absent
    async fn is_admin(&self, user_id: i64) -> StorageResult<bool>;
}

/// Registered client applications
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppRepository: Send + Sync {
    /// Look up an app by id; `AppNotFound` when absent
    async fn app(&self, app_id: i64) -> StorageResult<App>;

    /// Persist a new app owned by `owner_id`; `AppExists` on name collision
    async fn save_app(&self, owner_id: i64, name: &str, secret: &str) -> StorageResult<i64>;
}
