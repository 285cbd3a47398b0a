//! Booking domain for Hearth.
//!
//! This module implements the booking lifecycle state machine, the
//! availability check that guards against double-booking, the pricing
//! calculator, and the cancellation refund policy engine.
//!
//! # Modules
//!
//! - `types` - Booking domain types (Booking, statuses, price breakdown)
//! - `error` - Booking-specific error types
//! - `availability` - Half-open date range overlap checks
//! - `pricing` - Stay price calculation
//! - `refund` - Cancellation refund tiers
//! - `lifecycle` - State transition logic

pub mod availability;
pub mod error;
pub mod lifecycle;
pub mod pricing;
pub mod refund;
pub mod types;

#[cfg(test)]
mod props;

pub use availability::{find_conflicts, is_available, ranges_overlap};
pub use error::BookingError;
pub use lifecycle::{BookingLifecycle, BookingTransition, CreateBookingInput, ListingTerms};
pub use pricing::PricingService;
pub use refund::{Refund, RefundPolicyEngine};
pub use types::{
    Booking, BookingStatus, BookingType, CancellationDetails, CancellationPolicy, CancelledBy,
    GuestCount, PaymentStatus, PriceBreakdown, Quote,
};
