use axum::{
    Router,
    routing::get,
    extract::{Extension, Json, rejection::JsonRejection},
    http::StatusCode,
    response::Json as RespJson,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::services::{accounts::AccountService, wastes::ListingService};

pub mod auth;
pub mod wastes;

pub const LIVENESS_MESSAGE: &str = "Vrishti Bandhan backend is running!";

pub type ApiError = (StatusCode, RespJson<serde_json::Value>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, RespJson(serde_json::json!({ "error": message.into() })))
}

// Malformed JSON and shape mismatches are both the client's fault
pub fn parse_body<T: DeserializeOwned>(
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<T, ApiError> {
    let Json(value) = payload.map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        error_response(StatusCode::BAD_REQUEST, "Request body must be JSON")
    })?;

    serde_json::from_value(value).map_err(|e| {
        error_response(StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
    })
}

// Assemble the full API with its shared services
pub fn app_router(accounts: AccountService, listings: ListingService) -> Router {
    Router::new()
        // Merge auth routes (register & login)
        .merge(auth::auth_router())
        // Merge waste routes (listings CRUD + company notification)
        .merge(wastes::waste_router())
        .route("/", get(|| async { LIVENESS_MESSAGE }))
        .layer(Extension(accounts))
        .layer(Extension(listings))
        .layer(TraceLayer::new_for_http())
        // Add CORS for frontend
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}
