use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{ListingStore, StoreError, UserStore};
use crate::model::user::{NewUser, Role, User};
use crate::model::waste::{Listing, ListingPatch, NewListing};

/// In-process stand-in for both ports, with switches to simulate outages.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    listings: Mutex<Vec<Listing>>,
    offline: AtomicBool,
    users_offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    // Fails only the user port; listings keep working
    pub fn set_users_offline(&self, offline: bool) {
        self.users_offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    fn check_users_online(&self) -> Result<(), StoreError> {
        self.check_online()?;
        if self.users_offline.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

// Field-by-field merge standing in for the UPDATE ... SET of the Postgres adapter
fn apply_patch(listing: &mut Listing, patch: &ListingPatch) {
    if let Some(title) = &patch.title {
        listing.title = title.clone();
    }
    if let Some(description) = &patch.description {
        listing.description = Some(description.clone());
    }
    if let Some(quantity) = patch.quantity {
        listing.quantity = quantity;
    }
    if let Some(location) = &patch.location {
        listing.location = location.clone();
    }
    if let Some(contact) = &patch.contact {
        listing.contact = contact.clone();
    }
    if let Some(farmer_id) = &patch.farmer_id {
        listing.farmer_id = farmer_id.clone();
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.check_users_online()?;
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        self.check_users_online()?;
        let users = self.users.lock().await;
        Ok(users.iter().filter(|u| u.role == role).cloned().collect())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.check_users_online()?;
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn insert_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        self.check_online()?;
        let mut listings = self.listings.lock().await;
        // Keep creation times strictly increasing so ordering is deterministic
        let mut now = Utc::now();
        if let Some(last) = listings.iter().map(|l| l.created_at).max() {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        let listing = Listing {
            id: Uuid::new_v4(),
            title: listing.title,
            description: listing.description,
            quantity: listing.quantity,
            location: listing.location,
            contact: listing.contact,
            farmer_id: listing.farmer_id,
            created_at: now,
            updated_at: now,
        };
        listings.push(listing.clone());
        Ok(listing)
    }

    async fn find_listings(&self, farmer_id: Option<&str>) -> Result<Vec<Listing>, StoreError> {
        self.check_online()?;
        let listings = self.listings.lock().await;
        let mut found: Vec<Listing> = listings
            .iter()
            .filter(|l| farmer_id.map_or(true, |f| l.farmer_id == f))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn update_listing(&self, id: Uuid, patch: &ListingPatch) -> Result<bool, StoreError> {
        self.check_online()?;
        let mut listings = self.listings.lock().await;
        match listings.iter_mut().find(|l| l.id == id) {
            Some(listing) => {
                apply_patch(listing, patch);
                listing.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_listing(&self, id: Uuid) -> Result<bool, StoreError> {
        self.check_online()?;
        let mut listings = self.listings.lock().await;
        let before = listings.len();
        listings.retain(|l| l.id != id);
        Ok(listings.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straw() -> NewListing {
        NewListing {
            title: "Straw".to_string(),
            description: Some("dry".to_string()),
            quantity: 100.0,
            location: "Pune".to_string(),
            contact: "9999".to_string(),
            farmer_id: "f-1".to_string(),
        }
    }

    #[tokio::test]
    async fn patch_only_touches_supplied_fields() {
        let store = MemoryStore::new();
        let before = store.insert_listing(straw()).await.unwrap();
        let patch: ListingPatch =
            serde_json::from_value(serde_json::json!({"quantity": 50, "description": null})).unwrap();

        assert!(store.update_listing(before.id, &patch).await.unwrap());

        let after = store.find_listings(None).await.unwrap().remove(0);
        assert_eq!(after.quantity, 50.0);
        assert_eq!(after.description, before.description);
        assert_eq!(after.title, before.title);
        assert_eq!(after.location, before.location);
        assert_eq!(after.contact, before.contact);
        assert_eq!(after.farmer_id, before.farmer_id);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn user_outage_leaves_listings_writable() {
        let store = MemoryStore::new();
        store.set_users_offline(true);

        assert!(store.find_by_role(Role::Company).await.is_err());
        assert!(store.insert_listing(straw()).await.is_ok());
    }
}
