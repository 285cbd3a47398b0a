//! Booking error types.
//!
//! This module defines all error types that can occur during booking
//! operations: validation, availability conflicts, authorization, and
//! state machine violations.

use chrono::NaiveDate;
use thiserror::Error;

use hearth_shared::types::{BookingId, ListingId, UserId};

use crate::booking::types::{BookingStatus, BookingType};

/// Errors that can occur during booking operations.
#[derive(Debug, Error)]
pub enum BookingError {
    /// The requested date range is empty or inverted.
    #[error("Check-out date {end} must be after check-in date {start}")]
    InvalidDateRange {
        /// Requested check-in date.
        start: NaiveDate,
        /// Requested check-out date.
        end: NaiveDate,
    },

    /// A stay needs at least one adult guest.
    #[error("At least one adult guest is required")]
    NoAdultGuests,

    /// A money input was negative.
    #[error("{field} must not be negative")]
    NegativeAmount {
        /// Which input was negative.
        field: &'static str,
    },

    /// Referenced listing does not exist.
    #[error("Listing {0} not found")]
    ListingNotFound(ListingId),

    /// Referenced booking does not exist.
    #[error("Booking {0} not found")]
    BookingNotFound(BookingId),

    /// Actor is not the guest/host this action requires.
    #[error("User {user_id} is not authorized to perform this action")]
    NotAuthorized {
        /// The user who attempted the action.
        user_id: UserId,
    },

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: BookingStatus,
        /// The attempted target status.
        to: BookingStatus,
    },

    /// Host approval only applies to request-to-book bookings.
    #[error("Only request bookings can be confirmed or rejected, this one is {booking_type}")]
    OnlyRequestBookings {
        /// The booking's actual type.
        booking_type: BookingType,
    },

    /// Completion attempted before the stay's checkout date.
    #[error("Stay has not ended yet, checkout is {checkout}")]
    StayNotEnded {
        /// The booking's checkout date.
        checkout: NaiveDate,
    },

    /// The requested range overlaps an active booking.
    #[error("Listing {listing_id} is not available for the selected dates")]
    DatesUnavailable {
        /// The listing whose dates are taken.
        listing_id: ListingId,
    },

    /// Another operation modified the booking concurrently.
    #[error("Concurrent modification detected for booking {0}, please retry")]
    ConcurrentModification(BookingId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl BookingError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange { .. }
            | Self::NoAdultGuests
            | Self::NegativeAmount { .. }
            | Self::InvalidTransition { .. }
            | Self::OnlyRequestBookings { .. }
            | Self::StayNotEnded { .. } => 400,

            Self::NotAuthorized { .. } => 403,

            Self::ListingNotFound(_) | Self::BookingNotFound(_) => 404,

            Self::DatesUnavailable { .. } | Self::ConcurrentModification(_) => 409,

            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::NoAdultGuests => "NO_ADULT_GUESTS",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::ListingNotFound(_) => "LISTING_NOT_FOUND",
            Self::BookingNotFound(_) => "BOOKING_NOT_FOUND",
            Self::NotAuthorized { .. } => "NOT_AUTHORIZED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::OnlyRequestBookings { .. } => "ONLY_REQUEST_BOOKINGS",
            Self::StayNotEnded { .. } => "STAY_NOT_ENDED",
            Self::DatesUnavailable { .. } => "DATES_UNAVAILABLE",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
