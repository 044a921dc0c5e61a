//! HTTP/JSON routes over the transport adapter
//!
//! Status codes from the adapter become HTTP statuses with a
//! `{ "code": ..., "message": ... }` body.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tonic::{Code, Status};

use crate::transport::{
    AuthTransport, CreateAppRequest, CreateAppResponse, IsAdminResponse, LoginRequest,
    LoginResponse, LogoutRequest, RegisterRequest, RegisterResponse, ValidateTokenRequest,
    ValidateTokenResponse,
};

/// Client closed request (nginx convention)
const CLIENT_CLOSED_REQUEST: u16 = 499;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Adapter status rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub Status);

impl From<Status> for ApiError {
    fn from(status: Status) -> Self {
        ApiError(status)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(Status::invalid_argument(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(Status::invalid_argument(rejection.body_text()))
    }
}

type JsonBody<T> = Result<Json<T>, JsonRejection>;

/// HTTP status for a gRPC code
pub fn http_status(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists => StatusCode::CONFLICT,
        Code::Cancelled => StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: format!("{:?}", self.0.code()),
            message: self.0.message().to_string(),
        };
        (http_status(self.0.code()), Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

async fn register(
    State(transport): State<AuthTransport>,
    body: JsonBody<RegisterRequest>,
) -> ApiResult<RegisterResponse> {
    let Json(req) = body?;
    Ok(Json(transport.register(req).await?))
}

async fn login(
    State(transport): State<AuthTransport>,
    body: JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let Json(req) = body?;
    Ok(Json(transport.login(req).await?))
}

async fn logout(
    State(transport): State<AuthTransport>,
    body: JsonBody<LogoutRequest>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = body?;
    transport.logout(req).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn validate_token(
    State(transport): State<AuthTransport>,
    body: JsonBody<ValidateTokenRequest>,
) -> ApiResult<ValidateTokenResponse> {
    let Json(req) = body?;
    Ok(Json(transport.validate_token(req).await?))
}

async fn is_admin(
    State(transport): State<AuthTransport>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<IsAdminResponse> {
    let Path(user_id) = path?;
    Ok(Json(transport.is_admin(user_id).await?))
}

async fn create_app(
    State(transport): State<AuthTransport>,
    body: JsonBody<CreateAppRequest>,
) -> ApiResult<CreateAppResponse> {
    let Json(req) = body?;
    Ok(Json(transport.create_app(req).await?))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Build the router for all auth endpoints
pub fn router(transport: AuthTransport) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/logout", post(logout))
        .route("/v1/auth/validate", post(validate_token))
        .route("/v1/users/:id/admin", get(is_admin))
        .route("/v1/apps", post(create_app))
        .with_state(transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(http_status(Code::InvalidArgument), StatusCode::BAD_REQUEST);
        assert_eq!(http_status(Code::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(http_status(Code::AlreadyExists), StatusCode::CONFLICT);
        assert_eq!(http_status(Code::Cancelled).as_u16(), 499);
        assert_eq!(http_status(Code::DeadlineExceeded), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(http_status(Code::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
