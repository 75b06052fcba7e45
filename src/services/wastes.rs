use std::sync::Arc;

use tokio::task::{JoinHandle, JoinSet};
use uuid::Uuid;

use crate::error::AppError;
use crate::model::user::Role;
use crate::model::waste::{Listing, ListingPatch, NewListing};
use crate::notify::{render_new_listing, NotificationSender};
use crate::store::{ListingStore, UserStore};

/// Outcome of one listing's broadcast. Only ever logged or inspected in tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanoutReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

pub struct CreatedListing {
    pub listing: Listing,
    /// Detached broadcast; dropping it does not cancel anything.
    pub fanout: JoinHandle<FanoutReport>,
}

#[derive(Clone)]
pub struct ListingService {
    listings: Arc<dyn ListingStore>,
    users: Arc<dyn UserStore>,
    sender: Arc<dyn NotificationSender>,
}

impl ListingService {
    pub fn new(
        listings: Arc<dyn ListingStore>,
        users: Arc<dyn UserStore>,
        sender: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            listings,
            users,
            sender,
        }
    }

    /// Persist the listing, then hand the company broadcast to a background task.
    ///
    /// Only the write can fail this call. Nothing is sent when it does.
    pub async fn create(&self, new_listing: NewListing) -> Result<CreatedListing, AppError> {
        let listing = self.listings.insert_listing(new_listing).await?;
        tracing::info!(listing_id = %listing.id, farmer_id = %listing.farmer_id, "✅ Waste listing stored");

        let fanout = tokio::spawn(notify_companies(
            self.users.clone(),
            self.sender.clone(),
            listing.clone(),
        ));

        Ok(CreatedListing { listing, fanout })
    }

    pub async fn list(&self, farmer_id: Option<&str>) -> Result<Vec<Listing>, AppError> {
        Ok(self.listings.find_listings(farmer_id).await?)
    }

    /// Merge `patch` into the listing. A missing id is not an error.
    pub async fn update(&self, id: Uuid, patch: ListingPatch) -> Result<(), AppError> {
        let matched = self.listings.update_listing(id, &patch).await?;
        if !matched {
            tracing::debug!(listing_id = %id, "Update matched no listing");
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.listings.delete_listing(id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(listing_id = %id, "🗑️ Waste listing deleted");
        Ok(())
    }
}

// One task per recipient; outcomes are logged as they settle, in any order
async fn notify_companies(
    users: Arc<dyn UserStore>,
    sender: Arc<dyn NotificationSender>,
    listing: Listing,
) -> FanoutReport {
    let companies = match users.find_by_role(Role::Company).await {
        Ok(companies) => companies,
        Err(e) => {
            tracing::error!(listing_id = %listing.id, "❌ Could not load company recipients: {}", e);
            return FanoutReport::default();
        }
    };

    let mut report = FanoutReport::default();
    let mut attempts = JoinSet::new();

    for company in companies {
        let sender = sender.clone();
        let notification = render_new_listing(&company, &listing);
        report.attempted += 1;

        attempts.spawn(async move {
            tracing::info!(recipient = %company.email, "📨 Attempting to send");
            match sender.send(notification).await {
                Ok(()) => {
                    tracing::info!(recipient = %company.email, "✅ Email sent");
                    true
                }
                Err(e) => {
                    tracing::warn!(recipient = %company.email, "❌ Email error: {}", e);
                    false
                }
            }
        });
    }

    while let Some(outcome) = attempts.join_next().await {
        match outcome {
            Ok(true) => report.delivered += 1,
            Ok(false) => report.failed += 1,
            Err(e) => {
                tracing::warn!("❌ Email task aborted: {}", e);
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        listing_id = %listing.id,
        attempted = report.attempted,
        delivered = report.delivered,
        failed = report.failed,
        "Company notification finished"
    );
    report
}
