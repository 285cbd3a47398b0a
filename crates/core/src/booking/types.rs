//! Booking domain types.
//!
//! This module defines the core types used for managing bookings through
//! their lifecycle, including the closed status vocabularies and the
//! price breakdown.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use hearth_shared::types::{BookingId, ListingId, UserId};

/// Booking status in the reservation lifecycle.
///
/// Bookings progress through these states from creation to checkout.
/// The valid transitions are:
/// - Pending → Confirmed (confirm)
/// - Pending → Rejected (reject)
/// - Pending → Cancelled (cancel)
/// - Confirmed → Cancelled (cancel)
/// - Confirmed → Completed (complete)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Booking awaits host approval (request-to-book).
    Pending,
    /// Booking is confirmed and blocks the listing's dates.
    Confirmed,
    /// Host declined the booking request (terminal).
    Rejected,
    /// Booking was cancelled by guest or host (terminal).
    Cancelled,
    /// The stay has ended (terminal).
    Completed,
}

impl BookingStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "rejected" => Some(Self::Rejected),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Returns true if the booking blocks the listing's dates.
    ///
    /// Only active bookings count for the no-overlap guarantee.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Returns true if no further transition is permitted.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled | Self::Completed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the booking is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    /// Auto-confirmed on creation, no host approval step.
    Instant,
    /// Requires explicit host confirm/reject before becoming active.
    Request,
}

impl BookingType {
    /// Returns the string representation of the booking type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Request => "request",
        }
    }

    /// Parses a booking type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "instant" => Some(Self::Instant),
            "request" => Some(Self::Request),
            _ => None,
        }
    }
}

impl fmt::Display for BookingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment state of the booking, tracked separately from its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Payment has not completed yet.
    Pending,
    /// Payment was captured.
    Completed,
    /// Payment failed.
    Failed,
    /// Payment was (fully or partially) refunded.
    Refunded,
}

impl PaymentStatus {
    /// Returns the string representation of the payment status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Parses a payment status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cancellation policy tier, copied from the listing at creation time
/// and frozen for the lifetime of the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancellationPolicy {
    /// Full refund up to 1 day before check-in.
    Flexible,
    /// Full refund 5+ days out, half refund 1-4 days out.
    Moderate,
    /// Full refund 14+ days out, half refund 7-13 days out.
    Strict,
}

impl CancellationPolicy {
    /// Returns the string representation of the policy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flexible => "flexible",
            Self::Moderate => "moderate",
            Self::Strict => "strict",
        }
    }

    /// Parses a policy from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "flexible" => Some(Self::Flexible),
            "moderate" => Some(Self::Moderate),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

impl fmt::Display for CancellationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which party cancelled the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelledBy {
    /// The guest cancelled their own stay.
    Guest,
    /// The host cancelled the reservation.
    Host,
}

impl CancelledBy {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Host => "host",
        }
    }

    /// Parses from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "guest" => Some(Self::Guest),
            "host" => Some(Self::Host),
            _ => None,
        }
    }
}

impl fmt::Display for CancelledBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Guest headcount for a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCount {
    /// Adults (at least one required).
    pub adults: u32,
    /// Children.
    pub children: u32,
    /// Infants.
    pub infants: u32,
}

impl GuestCount {
    /// Total number of guests, infants included.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.adults + self.children + self.infants
    }
}

/// Decomposition of a stay's total charge.
///
/// All amounts are rounded to 2 decimal places and `total_price` is
/// always the exact sum of the four components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Nightly rate times number of nights.
    pub base_price: Decimal,
    /// Listing's flat cleaning fee.
    pub cleaning_fee: Decimal,
    /// Platform service fee (12% of the base price).
    pub service_fee: Decimal,
    /// Tax (10% of base price plus cleaning fee).
    pub tax_amount: Decimal,
    /// Sum of the four components above.
    pub total_price: Decimal,
}

impl PriceBreakdown {
    /// Returns true if `total_price` equals the sum of its components.
    #[must_use]
    pub fn reconciles(&self) -> bool {
        self.total_price
            == self.base_price + self.cleaning_fee + self.service_fee + self.tax_amount
    }
}

/// Price quote for a prospective stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Number of nights in the stay.
    pub number_of_nights: u32,
    /// The computed price breakdown.
    pub price_breakdown: PriceBreakdown,
}

/// Details recorded when a booking is cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationDetails {
    /// When the cancellation happened.
    pub cancelled_at: DateTime<Utc>,
    /// Which party cancelled.
    pub cancelled_by: CancelledBy,
    /// Free-form reason, if given.
    pub reason: Option<String>,
    /// Amount refunded to the guest.
    pub refund_amount: Decimal,
    /// Percentage of the total price refunded (0-100).
    pub refund_percentage: Decimal,
}

/// A booking of a listing for a date range.
///
/// Stay dates use exclusive-end semantics: a booking of `[start, end)`
/// occupies the nights from `start` up to but not including `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier.
    pub id: BookingId,
    /// The listing being booked.
    pub listing_id: ListingId,
    /// The guest who requested the stay.
    pub guest_id: UserId,
    /// The listing's host, copied from the listing at creation.
    pub host_id: UserId,
    /// Check-in date.
    pub start_date: NaiveDate,
    /// Check-out date (exclusive).
    pub end_date: NaiveDate,
    /// Guest headcount.
    pub guests: GuestCount,
    /// Derived number of nights (>= 1).
    pub number_of_nights: u32,
    /// Price breakdown computed at creation.
    pub price_breakdown: PriceBreakdown,
    /// Instant or request-to-book.
    pub booking_type: BookingType,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Payment state.
    pub payment_status: PaymentStatus,
    /// Refund policy frozen from the listing at creation time.
    pub cancellation_policy: CancellationPolicy,
    /// Present only once the booking is cancelled.
    pub cancellation_details: Option<CancellationDetails>,
    /// Free-form guest requests.
    pub special_requests: Option<String>,
    /// Optimistic-concurrency counter, bumped on every transition.
    pub version: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}
