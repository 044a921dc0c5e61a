//! SQLite-backed storage collaborator.
//!
//! Tables:
//! - `users`: id, email (unique), pass_hash, is_admin
//! - `apps`: id, name (unique), secret, owner_id
//!
//! `rusqlite` is blocking, so every call hops onto the blocking pool and
//! takes the connection mutex there.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode};
use tracing::info;

use crate::auth::{App, User};
use crate::error::StorageError;

use super::{AppRepository, StorageResult, UserRepository};

/// SQLite user and app store
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self::init(conn)?;
        info!(path = %path.as_ref().display(), "Storage opened");
        Ok(store)
    }

    /// Private in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                pass_hash BLOB NOT NULL,
                is_admin BOOLEAN NOT NULL DEFAULT FALSE
            );
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

            CREATE TABLE IF NOT EXISTS apps (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                secret TEXT NOT NULL,
                owner_id INTEGER NOT NULL DEFAULT 0
            );",
        )?;

        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    async fn with_conn<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        })
        .await?
    }

    /// Seed an app with a caller-chosen id
    pub async fn insert_app(&self, app: App) -> StorageResult<()> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO apps (id, name, secret) VALUES (?1, ?2, ?3)",
                params![app.id, app.name, app.secret],
            )
            .map_err(|e| unique_violation(e, StorageError::AppExists))?;
            Ok(())
        })
        .await
    }

    /// Grant or revoke admin privilege
    pub async fn set_admin(&self, user_id: i64, is_admin: bool) -> StorageResult<()> {
        self.with_conn(move |conn| {
            let updated = conn.execute(
                "UPDATE users SET is_admin = ?1 WHERE id = ?2",
                params![is_admin, user_id],
            )?;
            if updated == 0 {
                return Err(StorageError::UserNotFound);
            }
            Ok(())
        })
        .await
    }
}

fn unique_violation(err: rusqlite::Error, on_conflict: StorageError) -> StorageError {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            on_conflict
        }
        other => other.into(),
    }
}

fn missing_row(err: rusqlite::Error, on_missing: StorageError) -> StorageError {
    match err {
        rusqlite::Error::QueryReturnedNoRows => on_missing,
        other => other.into(),
    }
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> StorageResult<i64> {
        let email = email.to_string();
        let pass_hash = pass_hash.to_vec();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO users (email, pass_hash) VALUES (?1, ?2)",
                params![email, pass_hash],
            )
            .map_err(|e| unique_violation(e, StorageError::UserExists))?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn user(&self, email: &str) -> StorageResult<User> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, email, pass_hash FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        pass_hash: row.get(2)?,
                    })
                },
            )
            .map_err(|e| missing_row(e, StorageError::UserNotFound))
        })
        .await
    }

    async fn is_admin(&self, user_id: i64) -> StorageResult<bool> {
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT is_admin FROM users WHERE id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(|e| missing_row(e, StorageError::UserNotFound))
        })
        .await
    }
}

#[async_trait]
impl AppRepository for SqliteStore {
    async fn app(&self, app_id: i64) -> StorageResult<App> {
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, name, secret FROM apps WHERE id = ?1",
                params![app_id],
                |row| {
                    Ok(App {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        secret: row.get(2)?,
                    })
                },
            )
            .map_err(|e| missing_row(e, StorageError::AppNotFound))
        })
        .await
    }

    async fn save_app(&self, owner_id: i64, name: &str, secret: &str) -> StorageResult<i64> {
        let name = name.to_string();
        let secret = secret.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO apps (name, secret, owner_id) VALUES (?1, ?2, ?3)",
                params![name, secret, owner_id],
            )
            .map_err(|e| unique_violation(e, StorageError::AppExists))?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, SqliteStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path().join("sso.db")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn save_and_find_user() {
        let (_dir, store) = test_store();
        let id = store.save_user("a@x.com", b"hash").await.unwrap();
        assert_eq!(id, 1);

        let user = store.user("a@x.com").await.unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.pass_hash, b"hash");
    }

    #[tokio::test]
    async fn duplicate_email_is_user_exists() {
        let (_dir, store) = test_store();
        store.save_user("a@x.com", b"first").await.unwrap();

        let dup = store.save_user("a@x.com", b"second").await;
        assert!(matches!(dup, Err(StorageError::UserExists)));
        assert_eq!(store.user("a@x.com").await.unwrap().pass_hash, b"first");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let (_dir, store) = test_store();
        assert!(matches!(store.user("ghost@x.com").await, Err(StorageError::UserNotFound)));
        assert!(matches!(store.is_admin(42).await, Err(StorageError::UserNotFound)));
    }

    #[tokio::test]
    async fn admin_flag_round_trips() {
        let (_dir, store) = test_store();
        let id = store.save_user("root@x.com", b"h").await.unwrap();
        assert!(!store.is_admin(id).await.unwrap());

        store.set_admin(id, true).await.unwrap();
        assert!(store.is_admin(id).await.unwrap());
    }

    #[tokio::test]
    async fn apps_are_unique_by_name() {
        let (_dir, store) = test_store();
        store.insert_app(App::new(6, "legacy", "s6")).await.unwrap();

        let id = store.save_app(1, "app7", "s7").await.unwrap();
        assert_eq!(id, 7);
        assert_eq!(store.app(7).await.unwrap().name, "app7");
        assert!(matches!(store.save_app(1, "app7", "s7").await, Err(StorageError::AppExists)));
        assert!(matches!(store.app(99).await, Err(StorageError::AppNotFound)));
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sso.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.save_user("a@x.com", b"h").await.unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.user("a@x.com").await.unwrap().id, 1);
    }
}
