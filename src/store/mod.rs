//! Persistence ports for accounts and waste listings.
//!
//! Services only see these traits; `main` decides which adapter backs them.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::user::{NewUser, Role, User};
use crate::model::waste::{Listing, ListingPatch, NewListing};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("duplicate key")]
    Duplicate,
    #[error("database error: {0}")]
    Backend(#[from] sqlx::Error),
    /// A stored row could not be mapped back into the domain model.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_role(&self, role: Role) -> Result<Vec<User>, StoreError>;

    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] when the email is already taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
}

#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError>;

    /// All listings, or those owned by `farmer_id`, newest first.
    async fn find_listings(&self, farmer_id: Option<&str>) -> Result<Vec<Listing>, StoreError>;

    /// Merge `patch` into the listing. Returns whether a record matched.
    async fn update_listing(&self, id: Uuid, patch: &ListingPatch) -> Result<bool, StoreError>;

    /// Returns whether a record was removed.
    async fn delete_listing(&self, id: Uuid) -> Result<bool, StoreError>;
}
