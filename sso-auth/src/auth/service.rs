//! Auth — stateless orchestrator for registration, login, admin checks
//! and app provisioning.
//!
//! Holds only injected capabilities and immutable settings, so one instance
//! can serve any number of concurrent requests behind an `Arc`. Every
//! operation runs inside its own `auth` span carrying `op` and the
//! non-secret ids it touches; passwords, hashes, secrets and tokens are
//! never recorded.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sso_auth::{App, Auth, AuthConfig, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     store.insert_app(App::new(7, "app7", "s7"))?;
//!
//!     let auth = Auth::new(&AuthConfig::new(), store.clone(), store)?;
//!     let user_id = auth.register_new_user("a@x.com", "secret1").await?;
//!     let token = auth.login("a@x.com", "secret1", 7).await?;
//!
//!     let claims = auth.validate_token(&token, 7).await?;
//!     assert_eq!(claims.sub, user_id);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::AuthConfig;
use crate::error::{AuthError, Result, StorageError};
use crate::storage::{AppRepository, UserRepository};

use super::credentials::CredentialVerifier;
use super::token::TokenCodec;
use super::types::{TokenClaims, EMPTY_APP_ID};

/// Hashed at construction and checked for unknown emails so a miss costs
/// the same as a wrong password.
const TIMING_DUMMY_PASSWORD: &str = "timing-equalizer";

/// Credential and token issuance engine
pub struct Auth {
    users: Arc<dyn UserRepository>,
    apps: Arc<dyn AppRepository>,
    verifier: CredentialVerifier,
    codec: TokenCodec,
    token_ttl: Duration,
    dummy_hash: Vec<u8>,
}

impl Auth {
    /// Build an engine from config and the two storage capabilities
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserRepository>,
        apps: Arc<dyn AppRepository>,
    ) -> Result<Self> {
        config.validate()?;
        let verifier = CredentialVerifier::new(config.hash_params)?;
        Self::with_parts(users, apps, verifier, TokenCodec::new(), config.token_ttl())
    }

    /// Build an engine from explicit parts
    pub fn with_parts(
        users: Arc<dyn UserRepository>,
        apps: Arc<dyn AppRepository>,
        verifier: CredentialVerifier,
        codec: TokenCodec,
        token_ttl: Duration,
    ) -> Result<Self> {
        let dummy_hash = verifier.hash(TIMING_DUMMY_PASSWORD)?;
        info!(token_ttl_secs = token_ttl.as_secs(), "Auth engine ready");
        Ok(Self { users, apps, verifier, codec, token_ttl, dummy_hash })
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Register a user and return the id storage assigned.
    ///
    /// No token is issued here; callers log in separately.
    pub async fn register_new_user(&self, email: &str, password: &str) -> Result<i64> {
        const OP: &str = "Auth.RegisterNewUser";

        async move {
            info!("registering user");

            let verifier = self.verifier.clone();
            let password = password.to_string();
            let pass_hash = run_blocking(OP, move || verifier.hash(&password))
                .await
                .inspect_err(|e| error!(error = %e, "failed to generate password hash"))?;

            let id = match self.users.save_user(email, &pass_hash).await {
                Ok(id) => id,
                Err(StorageError::UserExists) => {
                    warn!("user already exists");
                    return Err(AuthError::UserExists);
                }
                Err(e) => {
                    error!(error = %e, "failed to save user");
                    return Err(AuthError::storage(OP, e));
                }
            };

            info!(user_id = id, "user registered");
            Ok(id)
        }
        .instrument(info_span!("auth", op = OP))
        .await
    }

    /// Verify credentials and issue a token scoped to `app_id`.
    ///
    /// Credentials are checked before the app is looked up, so a bad
    /// email/password never reveals whether an app id exists. Unknown email
    /// and wrong password both yield `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str, app_id: i64) -> Result<String> {
        const OP: &str = "Auth.Login";

        async move {
            info!("attempting to login user");

            let (stored_hash, user) = match self.users.user(email).await {
                Ok(user) => (user.pass_hash.clone(), Some(user)),
                Err(StorageError::UserNotFound) => {
                    warn!("user not found");
                    (self.dummy_hash.clone(), None)
                }
                Err(e) => {
                    error!(error = %e, "failed to get user");
                    return Err(AuthError::storage(OP, e));
                }
            };

            debug!("comparing password hash");
            let verifier = self.verifier.clone();
            let password = password.to_string();
            let matched = run_blocking(OP, move || verifier.verify(&stored_hash, &password))
                .await
                .inspect_err(|e| error!(error = %e, "failed to verify password hash"))?;

            let user = match user {
                Some(user) if matched => user,
                Some(user) => {
                    info!(user_id = user.id, "invalid credentials");
                    return Err(AuthError::InvalidCredentials);
                }
                None => return Err(AuthError::InvalidCredentials),
            };

            if app_id == EMPTY_APP_ID {
                warn!(user_id = user.id, "empty app id");
                return Err(AuthError::InvalidAppId);
            }

            debug!("fetching app");
            let app = self.apps.app(app_id).await.map_err(|e| {
                error!(error = %e, "failed to get app");
                AuthError::storage(OP, e)
            })?;

            let token = self
                .codec
                .issue(&user, &app, self.token_ttl)
                .inspect_err(|e| error!(error = %e, "failed to generate token"))?;

            info!(user_id = user.id, "user logged in successfully");
            Ok(token)
        }
        .instrument(info_span!("auth", op = OP, app_id = app_id))
        .await
    }

    /// Validate a token against the secret of the app it claims to be for
    pub async fn validate_token(&self, token: &str, app_id: i64) -> Result<TokenClaims> {
        const OP: &str = "Auth.ValidateToken";

        async move {
            debug!("validating token");

            if app_id == EMPTY_APP_ID {
                warn!("empty app id");
                return Err(AuthError::InvalidAppId);
            }

            let app = match self.apps.app(app_id).await {
                Ok(app) => app,
                Err(StorageError::AppNotFound) => {
                    info!("token presented for unknown app");
                    return Err(AuthError::TokenInvalid("unknown app".into()));
                }
                Err(e) => {
                    error!(error = %e, "failed to get app");
                    return Err(AuthError::storage(OP, e));
                }
            };

            let claims = self
                .codec
                .validate(token, &app.secret)
                .inspect_err(|e| info!(error = %e, "token rejected"))?;

            if claims.app_id != app_id {
                info!(token_app_id = claims.app_id, "token issued for another app");
                return Err(AuthError::TokenInvalid("app id mismatch".into()));
            }

            debug!(user_id = claims.sub, "token valid");
            Ok(claims)
        }
        .instrument(info_span!("auth", op = OP, app_id = app_id))
        .await
    }

    /// Whether the user holds admin privilege.
    ///
    /// An unknown user id is reported as `UserNotFound`.
    pub async fn is_admin(&self, user_id: i64) -> Result<bool> {
        const OP: &str = "Auth.IsAdmin";

        async move {
            info!("checking if user is admin");

            let is_admin = match self.users.is_admin(user_id).await {
                Ok(flag) => flag,
                Err(StorageError::UserNotFound) => {
                    warn!("user not found");
                    return Err(AuthError::UserNotFound);
                }
                Err(e) => {
                    error!(error = %e, "failed to check admin flag");
                    return Err(AuthError::storage(OP, e));
                }
            };

            info!(is_admin = is_admin, "checked if user is admin");
            Ok(is_admin)
        }
        .instrument(info_span!("auth", op = OP, user_id = user_id))
        .await
    }

    /// Provision an app owned by `user_id`; returns its id and name
    pub async fn create_app(&self, user_id: i64, name: &str, secret: &str) -> Result<(i64, String)> {
        const OP: &str = "Auth.CreateApp";

        async move {
            info!("creating app");

            let id = match self.apps.save_app(user_id, name, secret).await {
                Ok(id) => id,
                Err(StorageError::AppExists) => {
                    warn!("app already exists");
                    return Err(AuthError::AppExists);
                }
                Err(e) => {
                    error!(error = %e, "failed to save app");
                    return Err(AuthError::storage(OP, e));
                }
            };

            info!(app_id = id, "app created");
            Ok((id, name.to_string()))
        }
        .instrument(info_span!("auth", op = OP, owner_id = user_id))
        .await
    }
}

/// Run CPU-bound hashing work on the blocking pool
async fn run_blocking<T, F>(op: &'static str, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| join_failure(op, e))?
}

/// Runtime shutdown cancels queued blocking work; anything else is a panic
fn join_failure(op: &'static str, err: tokio::task::JoinError) -> AuthError {
    if err.is_cancelled() {
        AuthError::Cancelled { op }
    } else {
        AuthError::Hashing(format!("hashing task failed: {err}"))
    }
}
