//! Listing repository.
//!
//! Listings are owned by an external subsystem; the booking engine only
//! reads the terms it needs to price a stay and freeze a policy.

use sea_orm::{DatabaseConnection, EntityTrait};

use hearth_core::booking::{BookingError, ListingTerms};
use hearth_shared::types::{ListingId, UserId};

use crate::entities::listings;

/// Read-only access to listing terms.
#[derive(Debug, Clone)]
pub struct ListingRepository {
    db: DatabaseConnection,
}

impl ListingRepository {
    /// Creates a new listing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetches the booking-relevant terms of a listing.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::ListingNotFound` when the listing does not
    /// exist, or a database error.
    pub async fn find_terms(&self, listing_id: ListingId) -> Result<ListingTerms, BookingError> {
        let listing = listings::Entity::find_by_id(listing_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?
            .ok_or(BookingError::ListingNotFound(listing_id))?;

        Ok(ListingTerms {
            id: ListingId::from_uuid(listing.id),
            host_id: UserId::from_uuid(listing.host_id),
            nightly_rate: listing.nightly_rate,
            cleaning_fee: listing.cleaning_fee,
            cancellation_policy: listing.cancellation_policy.into(),
        })
    }
}
