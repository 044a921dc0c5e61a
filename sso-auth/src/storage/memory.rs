//! In-memory storage collaborator
//!
//! Backed by `parking_lot::RwLock` maps; ids are assigned sequentially.
//! Useful for embedding the engine in tests and single-process tools.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::auth::{App, User};
use crate::error::StorageError;

use super::{AppRepository, StorageResult, UserRepository};

#[derive(Default)]
struct Users {
    by_email: HashMap<String, User>,
    admins: HashMap<i64, bool>,
    next_id: i64,
}

#[derive(Default)]
struct Apps {
    by_id: HashMap<i64, App>,
    owners: HashMap<i64, i64>,
}

/// Thread-safe in-memory user and app store
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Users>,
    apps: RwLock<Apps>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an app with a caller-chosen id
    pub fn insert_app(&self, app: App) -> StorageResult<()> {
        let mut apps = self.apps.write();
        if apps.by_id.contains_key(&app.id) || apps.by_id.values().any(|a| a.name == app.name) {
            return Err(StorageError::AppExists);
        }
        apps.by_id.insert(app.id, app);
        Ok(())
    }

    /// Grant or revoke admin privilege
    pub fn set_admin(&self, user_id: i64, is_admin: bool) -> StorageResult<()> {
        let mut users = self.users.write();
        match users.admins.get_mut(&user_id) {
            Some(flag) => {
                *flag = is_admin;
                Ok(())
            }
            None => Err(StorageError::UserNotFound),
        }
    }

    /// Owner recorded for an app
    pub fn app_owner(&self, app_id: i64) -> Option<i64> {
        self.apps.read().owners.get(&app_id).copied()
    }

    pub fn user_count(&self) -> usize {
        self.users.read().by_email.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> StorageResult<i64> {
        let mut users = self.users.write();
        if users.by_email.contains_key(email) {
            return Err(StorageError::UserExists);
        }

        users.next_id += 1;
        let id = users.next_id;
        users.by_email.insert(
            email.to_string(),
            User { id, email: email.to_string(), pass_hash: pass_hash.to_vec() },
        );
        users.admins.insert(id, false);
        Ok(id)
    }

    async fn user(&self, email: &str) -> StorageResult<User> {
        self.users
            .read()
            .by_email
            .get(email)
            .cloned()
            .ok_or(StorageError::UserNotFound)
    }

    async fn is_admin(&self, user_id: i64) -> StorageResult<bool> {
        self.users
            .read()
            .admins
            .get(&user_id)
            .copied()
            .ok_or(StorageError::UserNotFound)
    }
}

#[async_trait]
impl AppRepository for MemoryStore {
    async fn app(&self, app_id: i64) -> StorageResult<App> {
        self.apps
            .read()
            .by_id
            .get(&app_id)
            .cloned()
            .ok_or(StorageError::AppNotFound)
    }

    async fn save_app(&self, owner_id: i64, name: &str, secret: &str) -> StorageResult<i64> {
        let mut apps = self.apps.write();
        if apps.by_id.values().any(|a| a.name == name) {
            return Err(StorageError::AppExists);
        }

        let id = apps
            .by_id
            .keys()
            .max()
            .copied()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| StorageError::Backend("app id space exhausted".into()))?;
        apps.by_id.insert(id, App::new(id, name, secret));
        apps.owners.insert(id, owner_id);
        Ok(id)
    }
}
