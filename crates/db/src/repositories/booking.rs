//! Booking repository.
//!
//! Owns all booking row mutations. Creation runs the availability
//! re-check and the insert inside one database transaction under a
//! per-listing row lock, with the storage-level exclusion constraint as
//! a backstop, so two concurrent requests for overlapping dates can
//! never both commit. Transitions are serialized per booking through an
//! optimistic version guard.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};

use hearth_core::booking::{
    self as domain, Booking, BookingError, BookingTransition, CancellationDetails, GuestCount,
    PriceBreakdown,
};
use hearth_shared::types::{BookingId, ListingId, UserId};
use hearth_shared::types::{PageRequest, PageResponse};

use crate::entities::sea_orm_active_enums::BookingStatus as DbBookingStatus;
use crate::entities::{bookings, listings};

/// Filter options for listing bookings.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    /// Filter by lifecycle status.
    pub status: Option<domain::BookingStatus>,
}

/// Booking repository for all booking row access.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    db: DatabaseConnection,
}

impl BookingRepository {
    /// Creates a new booking repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Persists a freshly built booking, atomically with the
    /// availability check.
    ///
    /// Inside one database transaction: locks the listing row
    /// exclusively, re-checks the requested range against active
    /// bookings using the domain overlap predicate, then inserts. The
    /// `bookings_no_active_overlap` exclusion constraint catches
    /// anything that slips past the lock; either path surfaces as
    /// `DatesUnavailable`.
    ///
    /// # Errors
    ///
    /// Returns `ListingNotFound`, `DatesUnavailable`, or a database
    /// error.
    pub async fn create(&self, booking: Booking) -> Result<Booking, BookingError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        // Per-listing mutual exclusion across check + insert
        listings::Entity::find_by_id(booking.listing_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(BookingError::ListingNotFound(booking.listing_id))?;

        let active = self
            .fetch_active(&txn, booking.listing_id)
            .await?
            .into_iter()
            .map(to_domain)
            .collect::<Result<Vec<_>, _>>()?;

        if !domain::is_available(booking.start_date, booking.end_date, &active, None)? {
            return Err(BookingError::DatesUnavailable {
                listing_id: booking.listing_id,
            });
        }

        let model = to_active_model(&booking)?;
        match model.insert(&txn).await {
            Ok(_) => {}
            Err(e) if is_overlap_violation(&e) => {
                return Err(BookingError::DatesUnavailable {
                    listing_id: booking.listing_id,
                });
            }
            Err(e) => return Err(db_err(e)),
        }

        txn.commit().await.map_err(db_err)?;
        Ok(booking)
    }

    /// Fetches a booking by id.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound` or a database error.
    pub async fn find_by_id(&self, booking_id: BookingId) -> Result<Booking, BookingError> {
        let model = bookings::Entity::find_by_id(booking_id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(BookingError::BookingNotFound(booking_id))?;

        to_domain(model)
    }

    /// Returns the active bookings of a listing whose ranges overlap
    /// `[start, end)`, optionally excluding one booking id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` for an empty range, or a database
    /// error.
    pub async fn find_conflicts(
        &self,
        listing_id: ListingId,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<BookingId>,
    ) -> Result<Vec<Booking>, BookingError> {
        domain::availability::validate_range(start, end)?;

        let active = self
            .fetch_active(&self.db, listing_id)
            .await?
            .into_iter()
            .map(to_domain)
            .collect::<Result<Vec<_>, _>>()?;

        let conflicts = domain::find_conflicts(start, end, &active, exclude)?
            .into_iter()
            .cloned()
            .collect();

        Ok(conflicts)
    }

    /// Returns true iff the listing is free for `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` for an empty range, or a database
    /// error.
    pub async fn is_available(
        &self,
        listing_id: ListingId,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<BookingId>,
    ) -> Result<bool, BookingError> {
        Ok(self
            .find_conflicts(listing_id, start, end, exclude)
            .await?
            .is_empty())
    }

    /// Applies a validated transition to a booking row.
    ///
    /// The update is guarded by the version the caller loaded
    /// (`WHERE id = ? AND version = ?`); if another operation won the
    /// race the update hits zero rows and the caller gets
    /// `ConcurrentModification` to retry against fresh state.
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentModification`, `BookingNotFound` (when the
    /// booking vanished), or a database error.
    pub async fn apply_transition(
        &self,
        booking: &Booking,
        transition: &BookingTransition,
    ) -> Result<Booking, BookingError> {
        let mut update = bookings::ActiveModel {
            status: Set(transition.new_status().into()),
            version: Set(booking.version + 1),
            ..Default::default()
        };

        match transition {
            BookingTransition::Confirm {
                payment_status,
                occurred_at,
                ..
            } => {
                update.payment_status = Set((*payment_status).into());
                update.updated_at = Set((*occurred_at).into());
            }
            BookingTransition::Reject { occurred_at, .. }
            | BookingTransition::Complete { occurred_at, .. } => {
                update.updated_at = Set((*occurred_at).into());
            }
            BookingTransition::Cancel {
                details,
                payment_status,
                ..
            } => {
                update.cancelled_at = Set(Some(details.cancelled_at.into()));
                update.cancelled_by = Set(Some(details.cancelled_by.into()));
                update.cancellation_reason = Set(details.reason.clone());
                update.refund_amount = Set(Some(details.refund_amount));
                update.refund_percentage = Set(Some(details.refund_percentage));
                if let Some(payment_status) = payment_status {
                    update.payment_status = Set((*payment_status).into());
                }
                update.updated_at = Set(details.cancelled_at.into());
            }
        }

        let result = bookings::Entity::update_many()
            .set(update)
            .filter(bookings::Column::Id.eq(booking.id.into_inner()))
            .filter(bookings::Column::Version.eq(booking.version))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            // Either the row is gone or someone else transitioned first
            return if bookings::Entity::find_by_id(booking.id.into_inner())
                .one(&self.db)
                .await
                .map_err(db_err)?
                .is_some()
            {
                Err(BookingError::ConcurrentModification(booking.id))
            } else {
                Err(BookingError::BookingNotFound(booking.id))
            };
        }

        self.find_by_id(booking.id).await
    }

    /// Lists a guest's bookings, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn list_for_guest(
        &self,
        guest_id: UserId,
        filter: BookingFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<Booking>, BookingError> {
        self.list(bookings::Column::GuestId, guest_id, filter, page)
            .await
    }

    /// Lists a host's bookings, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error.
    pub async fn list_for_host(
        &self,
        host_id: UserId,
        filter: BookingFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<Booking>, BookingError> {
        self.list(bookings::Column::HostId, host_id, filter, page)
            .await
    }

    async fn list(
        &self,
        owner_column: bookings::Column,
        owner: UserId,
        filter: BookingFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<Booking>, BookingError> {
        let mut query = bookings::Entity::find().filter(owner_column.eq(owner.into_inner()));

        if let Some(status) = filter.status {
            query = query.filter(bookings::Column::Status.eq(DbBookingStatus::from(status)));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let data = query
            .order_by_desc(bookings::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(to_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    async fn fetch_active<C>(
        &self,
        conn: &C,
        listing_id: ListingId,
    ) -> Result<Vec<bookings::Model>, BookingError>
    where
        C: sea_orm::ConnectionTrait,
    {
        bookings::Entity::find()
            .filter(bookings::Column::ListingId.eq(listing_id.into_inner()))
            .filter(
                bookings::Column::Status
                    .is_in([DbBookingStatus::Pending, DbBookingStatus::Confirmed]),
            )
            .all(conn)
            .await
            .map_err(db_err)
    }
}

fn db_err(e: DbErr) -> BookingError {
    BookingError::Database(e.to_string())
}

/// The exclusion constraint rejects with a Postgres exclusion violation,
/// which sea-orm does not classify; match the constraint by name and
/// treat plain unique violations the same way.
fn is_overlap_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || e.to_string().contains("bookings_no_active_overlap")
}

fn to_active_model(booking: &Booking) -> Result<bookings::ActiveModel, BookingError> {
    Ok(bookings::ActiveModel {
        id: Set(booking.id.into_inner()),
        listing_id: Set(booking.listing_id.into_inner()),
        guest_id: Set(booking.guest_id.into_inner()),
        host_id: Set(booking.host_id.into_inner()),
        start_date: Set(booking.start_date),
        end_date: Set(booking.end_date),
        adults: Set(to_i32(booking.guests.adults)?),
        children: Set(to_i32(booking.guests.children)?),
        infants: Set(to_i32(booking.guests.infants)?),
        number_of_nights: Set(to_i32(booking.number_of_nights)?),
        base_price: Set(booking.price_breakdown.base_price),
        cleaning_fee: Set(booking.price_breakdown.cleaning_fee),
        service_fee: Set(booking.price_breakdown.service_fee),
        tax_amount: Set(booking.price_breakdown.tax_amount),
        total_price: Set(booking.price_breakdown.total_price),
        booking_type: Set(booking.booking_type.into()),
        status: Set(booking.status.into()),
        payment_status: Set(booking.payment_status.into()),
        cancellation_policy: Set(booking.cancellation_policy.into()),
        cancelled_at: Set(None),
        cancelled_by: Set(None),
        cancellation_reason: Set(None),
        refund_amount: Set(None),
        refund_percentage: Set(None),
        special_requests: Set(booking.special_requests.clone()),
        version: Set(booking.version),
        created_at: Set(booking.created_at.into()),
        updated_at: Set(booking.updated_at.into()),
    })
}

/// Maps a booking row back onto the domain type.
pub(crate) fn to_domain(model: bookings::Model) -> Result<Booking, BookingError> {
    let cancellation_details = match (model.cancelled_at, model.cancelled_by.clone()) {
        (Some(cancelled_at), Some(cancelled_by)) => Some(CancellationDetails {
            cancelled_at: cancelled_at.with_timezone(&Utc),
            cancelled_by: cancelled_by.into(),
            reason: model.cancellation_reason.clone(),
            refund_amount: model.refund_amount.unwrap_or_default(),
            refund_percentage: model.refund_percentage.unwrap_or_default(),
        }),
        _ => None,
    };

    Ok(Booking {
        id: BookingId::from_uuid(model.id),
        listing_id: ListingId::from_uuid(model.listing_id),
        guest_id: UserId::from_uuid(model.guest_id),
        host_id: UserId::from_uuid(model.host_id),
        start_date: model.start_date,
        end_date: model.end_date,
        guests: GuestCount {
            adults: to_u32(model.adults)?,
            children: to_u32(model.children)?,
            infants: to_u32(model.infants)?,
        },
        number_of_nights: to_u32(model.number_of_nights)?,
        price_breakdown: PriceBreakdown {
            base_price: model.base_price,
            cleaning_fee: model.cleaning_fee,
            service_fee: model.service_fee,
            tax_amount: model.tax_amount,
            total_price: model.total_price,
        },
        booking_type: model.booking_type.into(),
        status: model.status.into(),
        payment_status: model.payment_status.into(),
        cancellation_policy: model.cancellation_policy.into(),
        cancellation_details,
        special_requests: model.special_requests,
        version: model.version,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn to_i32(value: u32) -> Result<i32, BookingError> {
    i32::try_from(value).map_err(|_| BookingError::Database("count out of range".to_string()))
}

fn to_u32(value: i32) -> Result<u32, BookingError> {
    u32::try_from(value).map_err(|_| BookingError::Database("negative count in row".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hearth_core::booking::{BookingLifecycle, BookingStatus, BookingType, CancelledBy};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn model() -> bookings::Model {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        bookings::Model {
            id: Uuid::now_v7(),
            listing_id: Uuid::now_v7(),
            guest_id: Uuid::now_v7(),
            host_id: Uuid::now_v7(),
            start_date: NaiveDate::from_ymd_opt(2026, 6, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 13).unwrap(),
            adults: 2,
            children: 1,
            infants: 0,
            number_of_nights: 3,
            base_price: dec!(300.00),
            cleaning_fee: dec!(20.00),
            service_fee: dec!(36.00),
            tax_amount: dec!(32.00),
            total_price: dec!(388.00),
            booking_type: crate::entities::sea_orm_active_enums::BookingType::Request,
            status: DbBookingStatus::Pending,
            payment_status: crate::entities::sea_orm_active_enums::PaymentStatus::Pending,
            cancellation_policy:
                crate::entities::sea_orm_active_enums::CancellationPolicy::Moderate,
            cancelled_at: None,
            cancelled_by: None,
            cancellation_reason: None,
            refund_amount: None,
            refund_percentage: None,
            special_requests: None,
            version: 0,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn test_to_domain_maps_row() {
        let row = model();
        let booking = to_domain(row.clone()).unwrap();

        assert_eq!(booking.id.into_inner(), row.id);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.booking_type, BookingType::Request);
        assert_eq!(booking.guests.adults, 2);
        assert_eq!(booking.number_of_nights, 3);
        assert_eq!(booking.price_breakdown.total_price, dec!(388.00));
        assert!(booking.price_breakdown.reconciles());
        assert!(booking.cancellation_details.is_none());
    }

    #[test]
    fn test_to_domain_maps_cancellation_details() {
        let mut row = model();
        let cancelled = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        row.status = DbBookingStatus::Cancelled;
        row.cancelled_at = Some(cancelled.into());
        row.cancelled_by = Some(crate::entities::sea_orm_active_enums::CancelledBy::Guest);
        row.cancellation_reason = Some("change of plans".to_string());
        row.refund_amount = Some(dec!(388.00));
        row.refund_percentage = Some(dec!(100));

        let booking = to_domain(row).unwrap();
        let details = booking.cancellation_details.unwrap();
        assert_eq!(details.cancelled_at, cancelled);
        assert_eq!(details.cancelled_by, CancelledBy::Guest);
        assert_eq!(details.refund_amount, dec!(388.00));
        assert_eq!(details.refund_percentage, dec!(100));
    }

    #[test]
    fn test_to_domain_rejects_negative_counts() {
        let mut row = model();
        row.adults = -1;
        assert!(matches!(
            to_domain(row),
            Err(BookingError::Database(_))
        ));
    }

    #[test]
    fn test_roundtrip_through_active_model_values() {
        // build a domain booking the way the lifecycle does and make
        // sure the row mapping preserves every field the engine reads
        let listing = hearth_core::booking::ListingTerms {
            id: ListingId::new(),
            host_id: UserId::new(),
            nightly_rate: dec!(100),
            cleaning_fee: dec!(20),
            cancellation_policy: hearth_core::booking::CancellationPolicy::Strict,
        };
        let input = hearth_core::booking::CreateBookingInput {
            listing_id: listing.id,
            guest_id: UserId::new(),
            start_date: NaiveDate::from_ymd_opt(2026, 6, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 13).unwrap(),
            guests: GuestCount {
                adults: 2,
                children: 0,
                infants: 0,
            },
            booking_type: BookingType::Instant,
            special_requests: Some("late check-in".to_string()),
        };
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let booking = BookingLifecycle::create(input, &listing, now).unwrap();

        let am = to_active_model(&booking).unwrap();
        assert_eq!(am.start_date.as_ref(), &booking.start_date);
        assert_eq!(am.total_price.as_ref(), &booking.price_breakdown.total_price);
        assert_eq!(am.version.as_ref(), &0);
    }
}
