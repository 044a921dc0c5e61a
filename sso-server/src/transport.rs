//! Transport adapter — validates plain-value requests, calls the engine
//! under a deadline and maps engine errors onto gRPC status codes.
//!
//! Structurally invalid requests are rejected here with `InvalidArgument`
//! before the engine is ever invoked. Internal failures are logged with
//! full context and surfaced with a generic message only.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tonic::Status;
use tracing::{error, warn};

use sso_auth::{Auth, AuthError, EMPTY_APP_ID};

/// Map an engine error onto the status a client sees
pub fn status_from(err: &AuthError) -> Status {
    match err {
        AuthError::InvalidCredentials => Status::unauthenticated("invalid email or password"),
        AuthError::TokenExpired => Status::unauthenticated("token expired"),
        AuthError::TokenInvalid(_) => Status::unauthenticated("invalid token"),
        AuthError::InvalidAppId => Status::invalid_argument("invalid app_id"),
        AuthError::UserExists => Status::already_exists("user already exists"),
        AuthError::AppExists => Status::already_exists("app already exists"),
        AuthError::UserNotFound => Status::not_found("user not found"),
        AuthError::Cancelled { .. } => Status::cancelled("request cancelled"),
        AuthError::DeadlineExceeded { .. } => Status::deadline_exceeded("deadline exceeded"),
        AuthError::Hashing(_)
        | AuthError::TokenSigning(_)
        | AuthError::InvalidConfig(_)
        | AuthError::Storage { .. } => Status::internal("internal error"),
    }
}

// ─── Requests / Responses ───

#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub app_id: i64,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("app_id", &self.app_id)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsAdminResponse {
    pub is_admin: bool,
}

#[derive(Clone, Deserialize)]
pub struct CreateAppRequest {
    #[serde(default)]
    pub owner_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub secret: String,
}

impl std::fmt::Debug for CreateAppRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateAppRequest")
            .field("owner_id", &self.owner_id)
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppResponse {
    pub app_id: i64,
    pub name: String,
}

#[derive(Clone, Deserialize)]
pub struct ValidateTokenRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub app_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateTokenResponse {
    pub user_id: i64,
    pub email: String,
    pub app_id: i64,
    pub expires_at: i64,
}

#[derive(Clone, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub token: String,
}

// ─── Adapter ───

/// Request-facing wrapper around a shared engine
#[derive(Clone)]
pub struct AuthTransport {
    auth: Arc<Auth>,
    timeout: Duration,
}

impl AuthTransport {
    pub fn new(auth: Arc<Auth>, timeout: Duration) -> Self {
        Self { auth, timeout }
    }

    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, Status> {
        require(!req.email.is_empty(), "email is required")?;
        require(!req.password.is_empty(), "password is required")?;
        require(req.app_id != EMPTY_APP_ID, "app_id is required")?;

        let token = self
            .call("Auth.Login", self.auth.login(&req.email, &req.password, req.app_id))
            .await?;
        Ok(LoginResponse { token })
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, Status> {
        require(!req.email.is_empty(), "email is required")?;
        require(!req.password.is_empty(), "password is required")?;

        let user_id = self
            .call("Auth.RegisterNewUser", self.auth.register_new_user(&req.email, &req.password))
            .await?;
        Ok(RegisterResponse { user_id })
    }

    pub async fn is_admin(&self, user_id: i64) -> Result<IsAdminResponse, Status> {
        require(user_id != 0, "user_id is required")?;

        let is_admin = self.call("Auth.IsAdmin", self.auth.is_admin(user_id)).await?;
        Ok(IsAdminResponse { is_admin })
    }

    pub async fn create_app(&self, req: CreateAppRequest) -> Result<CreateAppResponse, Status> {
        require(req.owner_id != 0, "owner_id is required")?;
        require(!req.name.is_empty(), "name is required")?;
        require(!req.secret.is_empty(), "secret is required")?;

        let (app_id, name) = self
            .call("Auth.CreateApp", self.auth.create_app(req.owner_id, &req.name, &req.secret))
            .await?;
        Ok(CreateAppResponse { app_id, name })
    }

    pub async fn validate_token(
        &self,
        req: ValidateTokenRequest,
    ) -> Result<ValidateTokenResponse, Status> {
        require(!req.token.is_empty(), "token is required")?;
        require(req.app_id != EMPTY_APP_ID, "app_id is required")?;

        let claims = self
            .call("Auth.ValidateToken", self.auth.validate_token(&req.token, req.app_id))
            .await?;
        Ok(ValidateTokenResponse {
            user_id: claims.sub,
            email: claims.email,
            app_id: claims.app_id,
            expires_at: claims.exp,
        })
    }

    /// Tokens are self-contained and there is no revocation list.
    pub async fn logout(&self, _req: LogoutRequest) -> Result<(), Status> {
        Err(Status::unimplemented("logout is not supported"))
    }

    async fn call<T, F>(&self, op: &'static str, fut: F) -> Result<T, Status>
    where
        F: Future<Output = sso_auth::Result<T>>,
    {
        let result = match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AuthError::DeadlineExceeded { op }),
        };

        result.map_err(|err| {
            if err.is_expected() {
                warn!(op = op, error = %err, "request rejected");
            } else {
                error!(op = op, error = %err, "request failed");
            }
            status_from(&err)
        })
    }
}

fn require(ok: bool, message: &'static str) -> Result<(), Status> {
    if ok {
        Ok(())
    } else {
        Err(Status::invalid_argument(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sso_auth::StorageError;
    use tonic::Code;

    #[test]
    fn test_credentials_map_to_unauthenticated_generic_message() {
        let status = status_from(&AuthError::InvalidCredentials);
        assert_eq!(status.code(), Code::Unauthenticated);
        assert_eq!(status.message(), "invalid email or password");
    }

    #[test]
    fn test_internal_errors_hide_detail() {
        let err = AuthError::storage("Auth.Login", StorageError::Backend("db at /var/lib/sso".into()));
        let status = status_from(&err);
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "internal error");

        assert_eq!(status_from(&AuthError::Hashing("rng".into())).code(), Code::Internal);
        assert_eq!(status_from(&AuthError::TokenSigning("key".into())).code(), Code::Internal);
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(status_from(&AuthError::InvalidAppId).code(), Code::InvalidArgument);
        assert_eq!(status_from(&AuthError::UserExists).code(), Code::AlreadyExists);
        assert_eq!(status_from(&AuthError::AppExists).code(), Code::AlreadyExists);
        assert_eq!(status_from(&AuthError::UserNotFound).code(), Code::NotFound);
        assert_eq!(status_from(&AuthError::TokenExpired).code(), Code::Unauthenticated);
        assert_eq!(status_from(&AuthError::Cancelled { op: "x" }).code(), Code::Cancelled);
        assert_eq!(
            status_from(&AuthError::DeadlineExceeded { op: "x" }).code(),
            Code::DeadlineExceeded
        );
    }

    #[test]
    fn test_request_debug_redacts_secrets() {
        let req = LoginRequest { email: "a@x.com".into(), password: "hunter2".into(), app_id: 7 };
        let dbg = format!("{req:?}");
        assert!(dbg.contains("a@x.com"));
        assert!(!dbg.contains("hunter2"));

        let req = CreateAppRequest { owner_id: 1, name: "app7".into(), secret: "s3cr3t".into() };
        assert!(!format!("{req:?}").contains("s3cr3t"));
    }
}
