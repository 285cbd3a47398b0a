//! Booking lifecycle routes.
//!
//! Handlers orchestrate the pure engine and the repositories: a creation
//! request flows availability check, pricing, then the atomic insert; a
//! cancellation flows the state machine, the refund engine, then the
//! ledger. Ledger writes happen after the transition commits and are
//! fire-and-forget: failures are logged, never rolled back into the
//! booking.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use hearth_core::booking::{
    Booking, BookingError, BookingLifecycle, BookingStatus, BookingTransition, BookingType,
    CancellationDetails, CancellationPolicy, CancelledBy, CreateBookingInput, GuestCount,
    PaymentStatus, PriceBreakdown,
};
use hearth_core::ledger::{
    TransactionLedger, payment_reference, payout_reference, refund_reference,
};
use hearth_db::repositories::{BookingFilter, BookingRepository, LedgerRepository, ListingRepository};
use hearth_shared::AppError;
use hearth_shared::types::{BookingId, ListingId, PageRequest, PageResponse, UserId};

use crate::AppState;
use crate::routes::listings::GuestCountRequest;
use crate::routes::{app_error_response, error_response};

/// Creates the booking routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/{booking_id}", get(get_booking))
        .route("/bookings/{booking_id}/confirm", post(confirm_booking))
        .route("/bookings/{booking_id}/reject", post(reject_booking))
        .route("/bookings/{booking_id}/cancel", post(cancel_booking))
        .route("/bookings/{booking_id}/complete", post(complete_booking))
        .route("/users/{user_id}/bookings", get(list_bookings))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a booking.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// The listing to book.
    pub listing_id: ListingId,
    /// The requesting guest.
    pub guest_id: UserId,
    /// Check-in date (YYYY-MM-DD).
    pub start_date: NaiveDate,
    /// Check-out date, exclusive (YYYY-MM-DD).
    pub end_date: NaiveDate,
    /// Guest headcount.
    pub guests: GuestCountRequest,
    /// Instant or request-to-book.
    pub booking_type: BookingType,
    /// Free-form guest requests.
    pub special_requests: Option<String>,
}

/// Request body for host confirm/reject.
#[derive(Debug, Deserialize)]
pub struct HostActionRequest {
    /// The acting host.
    pub host_id: UserId,
}

/// Request body for cancelling a booking.
#[derive(Debug, Deserialize)]
pub struct CancelBookingRequest {
    /// The acting user.
    pub actor_id: UserId,
    /// Which party is cancelling.
    pub cancelled_by: CancelledBy,
    /// Free-form reason.
    pub reason: Option<String>,
}

/// Query parameters for listing a user's bookings.
#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    /// View the user as guest (default) or host.
    pub role: Option<String>,
    /// Filter by lifecycle status.
    pub status: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Response for a booking.
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    /// Booking ID.
    pub id: BookingId,
    /// Listing ID.
    pub listing_id: ListingId,
    /// Guest ID.
    pub guest_id: UserId,
    /// Host ID.
    pub host_id: UserId,
    /// Check-in date.
    pub start_date: NaiveDate,
    /// Check-out date (exclusive).
    pub end_date: NaiveDate,
    /// Guest headcount.
    pub guests: GuestCount,
    /// Number of nights.
    pub number_of_nights: u32,
    /// Price breakdown.
    pub price_breakdown: PriceBreakdown,
    /// Booking type.
    pub booking_type: BookingType,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Payment state.
    pub payment_status: PaymentStatus,
    /// Frozen cancellation policy.
    pub cancellation_policy: CancellationPolicy,
    /// Present once cancelled.
    pub cancellation_details: Option<CancellationDetails>,
    /// Free-form guest requests.
    pub special_requests: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            listing_id: booking.listing_id,
            guest_id: booking.guest_id,
            host_id: booking.host_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            guests: booking.guests,
            number_of_nights: booking.number_of_nights,
            price_breakdown: booking.price_breakdown,
            booking_type: booking.booking_type,
            status: booking.status,
            payment_status: booking.payment_status,
            cancellation_policy: booking.cancellation_policy,
            cancellation_details: booking.cancellation_details,
            special_requests: booking.special_requests,
            created_at: booking.created_at.to_rfc3339(),
            updated_at: booking.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/bookings` - Create a booking.
async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> Response {
    let listing_repo = ListingRepository::new((*state.db).clone());
    let booking_repo = BookingRepository::new((*state.db).clone());

    let listing = match listing_repo.find_terms(payload.listing_id).await {
        Ok(listing) => listing,
        Err(e) => return error_response(&e),
    };

    // Fast-path availability check; create() re-checks atomically with
    // the insert, so losing a race here still cannot double-book.
    match booking_repo
        .is_available(payload.listing_id, payload.start_date, payload.end_date, None)
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            return error_response(&BookingError::DatesUnavailable {
                listing_id: payload.listing_id,
            });
        }
        Err(e) => return error_response(&e),
    }

    let input = CreateBookingInput {
        listing_id: payload.listing_id,
        guest_id: payload.guest_id,
        start_date: payload.start_date,
        end_date: payload.end_date,
        guests: payload.guests.into(),
        booking_type: payload.booking_type,
        special_requests: payload.special_requests,
    };

    let booking = match BookingLifecycle::create(input, &listing, Utc::now()) {
        Ok(booking) => booking,
        Err(e) => return error_response(&e),
    };

    match booking_repo.create(booking).await {
        Ok(booking) => {
            info!(
                booking_id = %booking.id,
                listing_id = %booking.listing_id,
                status = %booking.status,
                "booking created"
            );
            (StatusCode::CREATED, Json(BookingResponse::from(booking))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/bookings/{booking_id}` - Fetch a booking.
async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<BookingId>,
) -> Response {
    let booking_repo = BookingRepository::new((*state.db).clone());

    match booking_repo.find_by_id(booking_id).await {
        Ok(booking) => Json(BookingResponse::from(booking)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/bookings/{booking_id}/confirm` - Host approves a request booking.
async fn confirm_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<BookingId>,
    Json(payload): Json<HostActionRequest>,
) -> Response {
    let booking_repo = BookingRepository::new((*state.db).clone());

    let booking = match booking_repo.find_by_id(booking_id).await {
        Ok(booking) => booking,
        Err(e) => return error_response(&e),
    };

    // Re-validate the dates excluding this booking itself before the
    // host commits to them.
    match booking_repo
        .is_available(
            booking.listing_id,
            booking.start_date,
            booking.end_date,
            Some(booking.id),
        )
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            return error_response(&BookingError::DatesUnavailable {
                listing_id: booking.listing_id,
            });
        }
        Err(e) => return error_response(&e),
    }

    let transition = match BookingLifecycle::confirm(&booking, payload.host_id, Utc::now()) {
        Ok(transition) => transition,
        Err(e) => return error_response(&e),
    };

    match booking_repo.apply_transition(&booking, &transition).await {
        Ok(updated) => {
            record_payment(&state, &updated).await;
            Json(BookingResponse::from(updated)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/bookings/{booking_id}/reject` - Host declines a request booking.
async fn reject_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<BookingId>,
    Json(payload): Json<HostActionRequest>,
) -> Response {
    let booking_repo = BookingRepository::new((*state.db).clone());

    let booking = match booking_repo.find_by_id(booking_id).await {
        Ok(booking) => booking,
        Err(e) => return error_response(&e),
    };

    let transition = match BookingLifecycle::reject(&booking, payload.host_id, Utc::now()) {
        Ok(transition) => transition,
        Err(e) => return error_response(&e),
    };

    match booking_repo.apply_transition(&booking, &transition).await {
        Ok(updated) => Json(BookingResponse::from(updated)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/bookings/{booking_id}/cancel` - Guest or host cancels.
async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<BookingId>,
    Json(payload): Json<CancelBookingRequest>,
) -> Response {
    let booking_repo = BookingRepository::new((*state.db).clone());

    let booking = match booking_repo.find_by_id(booking_id).await {
        Ok(booking) => booking,
        Err(e) => return error_response(&e),
    };

    let transition = match BookingLifecycle::cancel(
        &booking,
        payload.actor_id,
        payload.cancelled_by,
        payload.reason,
        Utc::now(),
    ) {
        Ok(transition) => transition,
        Err(e) => return error_response(&e),
    };

    match booking_repo.apply_transition(&booking, &transition).await {
        Ok(updated) => {
            record_refund(&state, &updated, &transition).await;
            Json(BookingResponse::from(updated)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/bookings/{booking_id}/complete` - Mark a finished stay completed.
async fn complete_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<BookingId>,
) -> Response {
    let booking_repo = BookingRepository::new((*state.db).clone());

    let booking = match booking_repo.find_by_id(booking_id).await {
        Ok(booking) => booking,
        Err(e) => return error_response(&e),
    };

    let transition = match BookingLifecycle::complete(&booking, Utc::now()) {
        Ok(transition) => transition,
        Err(e) => return error_response(&e),
    };

    match booking_repo.apply_transition(&booking, &transition).await {
        Ok(updated) => {
            record_payout(&state, &updated).await;
            Json(BookingResponse::from(updated)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/users/{user_id}/bookings` - List a user's bookings.
async fn list_bookings(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(query): Query<ListBookingsQuery>,
) -> Response {
    let booking_repo = BookingRepository::new((*state.db).clone());

    let status = match query.status.as_deref() {
        None => None,
        Some(s) => match BookingStatus::parse(s) {
            Some(status) => Some(status),
            None => {
                return app_error_response(&AppError::Validation(format!(
                    "Unknown booking status: {s}"
                )));
            }
        },
    };

    let filter = BookingFilter { status };
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20).min(100),
    };

    let result = match query.role.as_deref() {
        Some("host") => booking_repo.list_for_host(user_id, filter, &page).await,
        Some("guest") | None => booking_repo.list_for_guest(user_id, filter, &page).await,
        Some(other) => {
            return app_error_response(&AppError::Validation(format!("Unknown role: {other}")));
        }
    };

    match result {
        Ok(bookings) => {
            let PageResponse { data, meta } = bookings;
            let data: Vec<BookingResponse> = data.into_iter().map(BookingResponse::from).collect();
            Json(PageResponse { data, meta }).into_response()
        }
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Ledger side effects (fire-and-forget after the transition commits)
// ============================================================================

async fn record_payment(state: &AppState, booking: &Booking) {
    let ledger = LedgerRepository::new((*state.db).clone());
    let reference = payment_reference(booking.id);
    if let Err(e) = ledger
        .record_payment(
            booking.id,
            booking.guest_id,
            booking.host_id,
            booking.price_breakdown.total_price,
            &reference,
        )
        .await
    {
        warn!(booking_id = %booking.id, error = %e, "failed to record payment, booking stays confirmed");
    }
}

async fn record_refund(state: &AppState, booking: &Booking, transition: &BookingTransition) {
    let BookingTransition::Cancel { details, .. } = transition else {
        return;
    };
    if details.refund_amount <= rust_decimal::Decimal::ZERO {
        return;
    }

    let ledger = LedgerRepository::new((*state.db).clone());
    let reference = refund_reference(booking.id);
    if let Err(e) = ledger
        .record_refund(
            booking.id,
            booking.guest_id,
            details.refund_amount,
            &reference,
            details.reason.as_deref(),
        )
        .await
    {
        warn!(booking_id = %booking.id, error = %e, "failed to record refund, booking stays cancelled");
    }
}

async fn record_payout(state: &AppState, booking: &Booking) {
    let ledger = LedgerRepository::new((*state.db).clone());
    let reference = payout_reference(booking.id);
    // The host earns the base price plus the cleaning fee; the platform
    // keeps the service fee and remits the tax.
    let amount = booking.price_breakdown.base_price + booking.price_breakdown.cleaning_fee;
    if let Err(e) = ledger
        .record_payout(booking.host_id, booking.id, amount, &reference)
        .await
    {
        warn!(booking_id = %booking.id, error = %e, "failed to record payout, booking stays completed");
    }
}
