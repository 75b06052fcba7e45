use axum::{
    Router,
    routing::{get, put},
    extract::{Extension, Json, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::Json as RespJson,
};
use uuid::Uuid;

use super::{error_response, parse_body, ApiError};
use crate::error::AppError;
use crate::model::waste::{CreateWasteRequest, Listing, ListingPatch, WasteQuery};
use crate::services::wastes::ListingService;

pub fn waste_router() -> Router {
    Router::new()
        .route("/api/wastes", get(list_wastes).post(create_waste))
        .route("/api/wastes/:id", put(update_waste).delete(delete_waste))
}

// Post waste, then notify companies in the background
async fn create_waste(
    Extension(listings): Extension<ListingService>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(StatusCode, RespJson<serde_json::Value>), ApiError> {
    let new_listing = parse_body::<CreateWasteRequest>(payload)?
        .validate()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))?;

    let created = listings.create(new_listing).await.map_err(|e| {
        tracing::error!("❌ Waste post error: {}", e);
        error_response(StatusCode::BAD_REQUEST, "Failed to post waste")
    })?;

    // Detach the broadcast; its outcome only reaches the log
    drop(created.fanout);

    Ok((
        StatusCode::CREATED,
        RespJson(serde_json::json!({
            "message": "Waste posted and emails sent!",
            "waste": created.listing,
        })),
    ))
}

// Get all or farmer-specific wastes
async fn list_wastes(
    Extension(listings): Extension<ListingService>,
    Query(params): Query<WasteQuery>,
) -> Result<RespJson<Vec<Listing>>, ApiError> {
    let farmer_id = params.farmer_id.as_deref().filter(|f| !f.is_empty());

    let wastes = listings.list(farmer_id).await.map_err(|e| {
        tracing::error!("🚨 Database error: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch wastes")
    })?;

    Ok(RespJson(wastes))
}

async fn update_waste(
    Extension(listings): Extension<ListingService>,
    Path(id): Path<String>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<RespJson<serde_json::Value>, ApiError> {
    tracing::info!("🔄 Updating waste with ID: {}", id);

    let id = Uuid::parse_str(&id)
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Invalid waste id"))?;
    let patch = parse_body::<ListingPatch>(payload)?
        .validate()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))?;

    listings.update(id, patch).await.map_err(|e| {
        tracing::error!("🚨 Database error: {}", e);
        error_response(StatusCode::BAD_REQUEST, "Failed to update waste")
    })?;

    Ok(RespJson(serde_json::json!({
        "message": "Waste updated successfully"
    })))
}

async fn delete_waste(
    Extension(listings): Extension<ListingService>,
    Path(id): Path<String>,
) -> Result<RespJson<serde_json::Value>, ApiError> {
    tracing::info!("🗑️ Deleting waste with ID: {}", id);

    // An id that cannot exist is reported like one that does not
    let id = Uuid::parse_str(&id)
        .map_err(|_| error_response(StatusCode::NOT_FOUND, "Waste not found"))?;

    listings.delete(id).await.map_err(|e| match e {
        AppError::NotFound => error_response(StatusCode::NOT_FOUND, "Waste not found"),
        other => {
            tracing::error!("🚨 Database error: {}", other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete waste")
        }
    })?;

    Ok(RespJson(serde_json::json!({
        "message": "Waste deleted successfully"
    })))
}
