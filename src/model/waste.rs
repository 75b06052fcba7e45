use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

// A posted agricultural waste offer, as stored
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Kilograms. No minimum is enforced.
    pub quantity: f64,
    pub location: String,
    pub contact: String,
    /// Free-form, not checked against the users table.
    pub farmer_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Validated insert payload; id and timestamps are assigned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub title: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub location: String,
    pub contact: String,
    pub farmer_id: String,
}

// Request untuk membuat waste baru
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWasteRequest {
    pub title: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub location: String,
    pub contact: String,
    pub farmer_id: String,
}

impl CreateWasteRequest {
    pub fn validate(self) -> Result<NewListing, AppError> {
        require_text("title", &self.title)?;
        require_text("location", &self.location)?;
        require_text("contact", &self.contact)?;
        require_text("farmerId", &self.farmer_id)?;
        require_finite(self.quantity)?;

        Ok(NewListing {
            title: self.title,
            description: self.description,
            quantity: self.quantity,
            location: self.location,
            contact: self.contact,
            farmer_id: self.farmer_id,
        })
    }
}

/// Partial update. Absent and `null` fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub location: Option<String>,
    pub contact: Option<String>,
    pub farmer_id: Option<String>,
}

impl ListingPatch {
    pub fn validate(self) -> Result<Self, AppError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(location) = &self.location {
            require_text("location", location)?;
        }
        if let Some(contact) = &self.contact {
            require_text("contact", contact)?;
        }
        if let Some(farmer_id) = &self.farmer_id {
            require_text("farmerId", farmer_id)?;
        }
        if let Some(quantity) = self.quantity {
            require_finite(quantity)?;
        }
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteQuery {
    pub farmer_id: Option<String>,
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn require_finite(quantity: f64) -> Result<(), AppError> {
    if !quantity.is_finite() {
        return Err(AppError::Validation("quantity must be a number".to_string()));
    }
    Ok(())
}
