use axum::{
    Router,
    routing::post,
    extract::{Extension, Json, rejection::JsonRejection},
    http::StatusCode,
    response::Json as RespJson,
};

use super::{error_response, parse_body, ApiError};
use crate::error::AppError;
use crate::model::user::{LoginRequest, LoginResponse, RegisterRequest};
use crate::services::accounts::AccountService;

// Buat router khusus auth
pub fn auth_router() -> Router {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
}

pub async fn register(
    Extension(accounts): Extension<AccountService>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<RespJson<serde_json::Value>, ApiError> {
    let request = parse_body::<RegisterRequest>(payload)?
        .validate()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))?;

    tracing::info!(email = %request.email, role = %request.role, "Register attempt");

    accounts.register(request).await.map_err(|e| match e {
        AppError::DuplicateAccount => error_response(StatusCode::BAD_REQUEST, "User already exists"),
        other => {
            tracing::error!("❌ Registration failed: {}", other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Registration failed")
        }
    })?;

    Ok(RespJson(serde_json::json!({
        "message": "Registered successfully"
    })))
}

pub async fn login(
    Extension(accounts): Extension<AccountService>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<RespJson<LoginResponse>, ApiError> {
    let request = parse_body::<LoginRequest>(payload)?;

    let account = accounts
        .login(&request.email, &request.password)
        .await
        .map_err(|e| match e {
            AppError::AccountNotFound => error_response(StatusCode::BAD_REQUEST, "User not found"),
            AppError::InvalidCredentials => {
                error_response(StatusCode::UNAUTHORIZED, "Incorrect password")
            }
            other => {
                tracing::error!("❌ Login failed: {}", other);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Login failed")
            }
        })?;

    Ok(RespJson(LoginResponse {
        message: "Login successful",
        account,
    }))
}
