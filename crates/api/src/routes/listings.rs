//! Listing quote route.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use hearth_core::booking::{BookingError, GuestCount, PriceBreakdown, PricingService};
use hearth_db::ListingRepository;
use hearth_shared::types::ListingId;

use crate::AppState;
use crate::routes::error_response;

/// Creates the listing routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/listings/{listing_id}/quote", post(quote))
}

/// Request body for a price quote.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    /// Check-in date (YYYY-MM-DD).
    pub start_date: NaiveDate,
    /// Check-out date, exclusive (YYYY-MM-DD).
    pub end_date: NaiveDate,
    /// Guest headcount.
    pub guests: GuestCountRequest,
}

/// Guest headcount in a request body.
#[derive(Debug, Deserialize)]
pub struct GuestCountRequest {
    /// Adults (at least one required).
    pub adults: u32,
    /// Children.
    #[serde(default)]
    pub children: u32,
    /// Infants.
    #[serde(default)]
    pub infants: u32,
}

impl From<GuestCountRequest> for GuestCount {
    fn from(guests: GuestCountRequest) -> Self {
        Self {
            adults: guests.adults,
            children: guests.children,
            infants: guests.infants,
        }
    }
}

/// Response for a price quote.
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    /// Number of nights in the stay.
    pub number_of_nights: u32,
    /// The computed price breakdown.
    pub price_breakdown: PriceBreakdown,
}

/// POST `/listings/{listing_id}/quote` - Price a prospective stay.
async fn quote(
    State(state): State<AppState>,
    Path(listing_id): Path<ListingId>,
    Json(payload): Json<QuoteRequest>,
) -> Response {
    if payload.guests.adults < 1 {
        return error_response(&BookingError::NoAdultGuests);
    }

    let listing_repo = ListingRepository::new((*state.db).clone());
    let listing = match listing_repo.find_terms(listing_id).await {
        Ok(listing) => listing,
        Err(e) => return error_response(&e),
    };

    match PricingService::quote(
        listing.nightly_rate,
        listing.cleaning_fee,
        payload.start_date,
        payload.end_date,
    ) {
        Ok(quote) => Json(QuoteResponse {
            number_of_nights: quote.number_of_nights,
            price_breakdown: quote.price_breakdown,
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}
