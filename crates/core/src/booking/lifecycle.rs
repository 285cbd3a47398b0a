//! Booking lifecycle state machine.
//!
//! This module implements the core state machine logic for driving a
//! booking from creation through confirmation, rejection, cancellation,
//! and completion. All methods are pure: they validate the requested
//! transition against the current booking and return a typed
//! `BookingTransition` for the persistence layer to apply, never touching
//! storage themselves. Callers supply `now` explicitly.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use hearth_shared::types::{BookingId, ListingId, UserId};

use crate::booking::error::BookingError;
use crate::booking::pricing::PricingService;
use crate::booking::refund::RefundPolicyEngine;
use crate::booking::types::{
    Booking, BookingStatus, BookingType, CancellationDetails, CancellationPolicy, CancelledBy,
    GuestCount, PaymentStatus,
};

/// Input for creating a booking.
#[derive(Debug, Clone)]
pub struct CreateBookingInput {
    /// The listing to book.
    pub listing_id: ListingId,
    /// The requesting guest.
    pub guest_id: UserId,
    /// Check-in date.
    pub start_date: NaiveDate,
    /// Check-out date (exclusive).
    pub end_date: NaiveDate,
    /// Guest headcount.
    pub guests: GuestCount,
    /// Instant or request-to-book.
    pub booking_type: BookingType,
    /// Free-form guest requests.
    pub special_requests: Option<String>,
}

/// The slice of a listing the booking engine needs.
///
/// Read-only: listings are owned by an external subsystem.
#[derive(Debug, Clone)]
pub struct ListingTerms {
    /// The listing's id.
    pub id: ListingId,
    /// The listing's host.
    pub host_id: UserId,
    /// Price per night.
    pub nightly_rate: Decimal,
    /// Flat cleaning fee per stay.
    pub cleaning_fee: Decimal,
    /// The listing's cancellation policy at booking time.
    pub cancellation_policy: CancellationPolicy,
}

/// A validated state transition with the data to persist alongside it.
///
/// Each variant captures the resulting status plus the audit fields the
/// transition writes.
#[derive(Debug, Clone)]
pub enum BookingTransition {
    /// Host approved a pending request booking.
    Confirm {
        /// The new status after confirmation.
        new_status: BookingStatus,
        /// Payment state once the booking is confirmed.
        payment_status: PaymentStatus,
        /// When the confirmation happened.
        occurred_at: DateTime<Utc>,
    },
    /// Host declined a pending request booking.
    Reject {
        /// The new status after rejection.
        new_status: BookingStatus,
        /// When the rejection happened.
        occurred_at: DateTime<Utc>,
    },
    /// Guest or host cancelled the booking.
    Cancel {
        /// The new status after cancellation.
        new_status: BookingStatus,
        /// Cancellation audit record, including the computed refund.
        details: CancellationDetails,
        /// New payment state, set to refunded iff any money goes back.
        payment_status: Option<PaymentStatus>,
    },
    /// The stay ended.
    Complete {
        /// The new status after completion.
        new_status: BookingStatus,
        /// When the completion was applied.
        occurred_at: DateTime<Utc>,
    },
}

impl BookingTransition {
    /// Returns the new status resulting from this transition.
    #[must_use]
    pub fn new_status(&self) -> BookingStatus {
        match self {
            Self::Confirm { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Cancel { new_status, .. }
            | Self::Complete { new_status, .. } => *new_status,
        }
    }
}

/// Stateless service for booking state transitions.
pub struct BookingLifecycle;

impl BookingLifecycle {
    /// Initial status for a new booking: instant bookings are confirmed
    /// on creation, request bookings await host approval.
    #[must_use]
    pub fn initial_status(booking_type: BookingType) -> BookingStatus {
        match booking_type {
            BookingType::Instant => BookingStatus::Confirmed,
            BookingType::Request => BookingStatus::Pending,
        }
    }

    /// Builds a new booking from a creation request and the listing's
    /// terms: validates guests and dates, computes the price breakdown,
    /// and freezes the listing's host and cancellation policy onto the
    /// booking.
    ///
    /// Availability must be checked by the caller; persistence re-checks
    /// it atomically with the insert.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed guest counts, an empty
    /// date range, or negative price inputs.
    pub fn create(
        input: CreateBookingInput,
        listing: &ListingTerms,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        if input.guests.adults < 1 {
            return Err(BookingError::NoAdultGuests);
        }

        let quote = PricingService::quote(
            listing.nightly_rate,
            listing.cleaning_fee,
            input.start_date,
            input.end_date,
        )?;

        Ok(Booking {
            id: BookingId::new(),
            listing_id: listing.id,
            guest_id: input.guest_id,
            host_id: listing.host_id,
            start_date: input.start_date,
            end_date: input.end_date,
            guests: input.guests,
            number_of_nights: quote.number_of_nights,
            price_breakdown: quote.price_breakdown,
            booking_type: input.booking_type,
            status: Self::initial_status(input.booking_type),
            payment_status: PaymentStatus::Pending,
            cancellation_policy: listing.cancellation_policy,
            cancellation_details: None,
            special_requests: input.special_requests,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Host approves a pending request booking.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthorized` when the actor is not the booking's host,
    /// `OnlyRequestBookings` for instant bookings, and
    /// `InvalidTransition` unless the booking is pending.
    pub fn confirm(
        booking: &Booking,
        host_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<BookingTransition, BookingError> {
        if booking.host_id != host_id {
            return Err(BookingError::NotAuthorized { user_id: host_id });
        }
        if booking.booking_type != BookingType::Request {
            return Err(BookingError::OnlyRequestBookings {
                booking_type: booking.booking_type,
            });
        }

        match booking.status {
            BookingStatus::Pending => Ok(BookingTransition::Confirm {
                new_status: BookingStatus::Confirmed,
                payment_status: PaymentStatus::Completed,
                occurred_at: now,
            }),
            _ => Err(BookingError::InvalidTransition {
                from: booking.status,
                to: BookingStatus::Confirmed,
            }),
        }
    }

    /// Host declines a pending request booking.
    ///
    /// # Errors
    ///
    /// Same guards as [`Self::confirm`].
    pub fn reject(
        booking: &Booking,
        host_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<BookingTransition, BookingError> {
        if booking.host_id != host_id {
            return Err(BookingError::NotAuthorized { user_id: host_id });
        }
        if booking.booking_type != BookingType::Request {
            return Err(BookingError::OnlyRequestBookings {
                booking_type: booking.booking_type,
            });
        }

        match booking.status {
            BookingStatus::Pending => Ok(BookingTransition::Reject {
                new_status: BookingStatus::Rejected,
                occurred_at: now,
            }),
            _ => Err(BookingError::InvalidTransition {
                from: booking.status,
                to: BookingStatus::Rejected,
            }),
        }
    }

    /// Guest or host cancels the booking.
    ///
    /// The refund is computed from the booking's frozen cancellation
    /// policy and the time remaining until check-in; the payment state
    /// flips to refunded iff any money goes back.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthorized` when the actor does not match the party
    /// named by `cancelled_by`, and `InvalidTransition` for bookings
    /// already in a terminal state.
    pub fn cancel(
        booking: &Booking,
        actor_id: UserId,
        cancelled_by: CancelledBy,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<BookingTransition, BookingError> {
        let expected = match cancelled_by {
            CancelledBy::Guest => booking.guest_id,
            CancelledBy::Host => booking.host_id,
        };
        if actor_id != expected {
            return Err(BookingError::NotAuthorized { user_id: actor_id });
        }

        if booking.status.is_terminal() {
            return Err(BookingError::InvalidTransition {
                from: booking.status,
                to: BookingStatus::Cancelled,
            });
        }

        let refund = RefundPolicyEngine::compute(
            booking.cancellation_policy,
            booking.start_date,
            now,
            booking.price_breakdown.total_price,
        );

        let payment_status =
            (refund.amount > Decimal::ZERO).then_some(PaymentStatus::Refunded);

        Ok(BookingTransition::Cancel {
            new_status: BookingStatus::Cancelled,
            details: CancellationDetails {
                cancelled_at: now,
                cancelled_by,
                reason,
                refund_amount: refund.amount,
                refund_percentage: refund.percentage,
            },
            payment_status,
        })
    }

    /// Marks a confirmed booking completed once its checkout date has
    /// passed.
    ///
    /// Completion is applied on demand (there is no background sweep);
    /// the date guard here makes any trigger safe.
    ///
    /// # Errors
    ///
    /// Returns `StayNotEnded` before the checkout date and
    /// `InvalidTransition` unless the booking is confirmed.
    pub fn complete(
        booking: &Booking,
        now: DateTime<Utc>,
    ) -> Result<BookingTransition, BookingError> {
        match booking.status {
            BookingStatus::Confirmed => {
                if now.date_naive() < booking.end_date {
                    return Err(BookingError::StayNotEnded {
                        checkout: booking.end_date,
                    });
                }
                Ok(BookingTransition::Complete {
                    new_status: BookingStatus::Completed,
                    occurred_at: now,
                })
            }
            _ => Err(BookingError::InvalidTransition {
                from: booking.status,
                to: BookingStatus::Completed,
            }),
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Pending → Confirmed (confirm)
    /// - Pending → Rejected (reject)
    /// - Pending → Cancelled (cancel)
    /// - Confirmed → Cancelled (cancel)
    /// - Confirmed → Completed (complete)
    #[must_use]
    pub fn is_valid_transition(from: BookingStatus, to: BookingStatus) -> bool {
        matches!(
            (from, to),
            (
                BookingStatus::Pending,
                BookingStatus::Confirmed | BookingStatus::Rejected | BookingStatus::Cancelled
            ) | (
                BookingStatus::Confirmed,
                BookingStatus::Cancelled | BookingStatus::Completed
            )
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    /// Builds a booking in the given state for transition tests.
    pub(crate) fn make_booking(booking_type: BookingType, status: BookingStatus) -> Booking {
        Booking {
            id: BookingId::new(),
            listing_id: ListingId::new(),
            guest_id: UserId::new(),
            host_id: UserId::new(),
            start_date: date(2026, 6, 10),
            end_date: date(2026, 6, 13),
            guests: GuestCount {
                adults: 2,
                children: 0,
                infants: 0,
            },
            number_of_nights: 3,
            price_breakdown: crate::booking::types::PriceBreakdown {
                base_price: dec!(300.00),
                cleaning_fee: dec!(20.00),
                service_fee: dec!(36.00),
                tax_amount: dec!(32.00),
                total_price: dec!(388.00),
            },
            booking_type,
            status,
            payment_status: PaymentStatus::Pending,
            cancellation_policy: CancellationPolicy::Moderate,
            cancellation_details: None,
            special_requests: None,
            version: 0,
            created_at: at(2026, 5, 1, 12),
            updated_at: at(2026, 5, 1, 12),
        }
    }

    fn terms() -> ListingTerms {
        ListingTerms {
            id: ListingId::new(),
            host_id: UserId::new(),
            nightly_rate: dec!(100),
            cleaning_fee: dec!(20),
            cancellation_policy: CancellationPolicy::Flexible,
        }
    }

    fn create_input(booking_type: BookingType) -> CreateBookingInput {
        CreateBookingInput {
            listing_id: ListingId::new(),
            guest_id: UserId::new(),
            start_date: date(2026, 6, 10),
            end_date: date(2026, 6, 13),
            guests: GuestCount {
                adults: 2,
                children: 1,
                infants: 0,
            },
            booking_type,
            special_requests: None,
        }
    }

    #[test]
    fn test_instant_booking_starts_confirmed() {
        let listing = terms();
        let booking =
            BookingLifecycle::create(create_input(BookingType::Instant), &listing, at(2026, 5, 1, 9))
                .unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn test_request_booking_starts_pending() {
        let listing = terms();
        let booking =
            BookingLifecycle::create(create_input(BookingType::Request), &listing, at(2026, 5, 1, 9))
                .unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
    }

    #[test]
    fn test_create_copies_listing_terms() {
        let listing = terms();
        let booking =
            BookingLifecycle::create(create_input(BookingType::Instant), &listing, at(2026, 5, 1, 9))
                .unwrap();
        assert_eq!(booking.host_id, listing.host_id);
        assert_eq!(booking.listing_id, listing.id);
        assert_eq!(booking.cancellation_policy, CancellationPolicy::Flexible);
        assert_eq!(booking.number_of_nights, 3);
        assert_eq!(booking.price_breakdown.total_price, dec!(388.00));
        assert!(booking.price_breakdown.reconciles());
    }

    #[test]
    fn test_create_requires_an_adult() {
        let listing = terms();
        let mut input = create_input(BookingType::Instant);
        input.guests = GuestCount {
            adults: 0,
            children: 2,
            infants: 0,
        };
        let result = BookingLifecycle::create(input, &listing, at(2026, 5, 1, 9));
        assert!(matches!(result, Err(BookingError::NoAdultGuests)));
    }

    #[test]
    fn test_create_rejects_inverted_dates() {
        let listing = terms();
        let mut input = create_input(BookingType::Instant);
        input.start_date = date(2026, 6, 13);
        input.end_date = date(2026, 6, 10);
        let result = BookingLifecycle::create(input, &listing, at(2026, 5, 1, 9));
        assert!(matches!(
            result,
            Err(BookingError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_confirm_pending_request() {
        let booking = make_booking(BookingType::Request, BookingStatus::Pending);
        let transition =
            BookingLifecycle::confirm(&booking, booking.host_id, at(2026, 5, 2, 9)).unwrap();

        assert_eq!(transition.new_status(), BookingStatus::Confirmed);
        match transition {
            BookingTransition::Confirm { payment_status, .. } => {
                assert_eq!(payment_status, PaymentStatus::Completed);
            }
            _ => panic!("expected a confirm transition"),
        }
    }

    #[test]
    fn test_confirm_by_wrong_host_fails() {
        let booking = make_booking(BookingType::Request, BookingStatus::Pending);
        let result = BookingLifecycle::confirm(&booking, UserId::new(), at(2026, 5, 2, 9));
        assert!(matches!(result, Err(BookingError::NotAuthorized { .. })));
    }

    #[test]
    fn test_confirm_instant_booking_fails() {
        let booking = make_booking(BookingType::Instant, BookingStatus::Confirmed);
        let result = BookingLifecycle::confirm(&booking, booking.host_id, at(2026, 5, 2, 9));
        assert!(matches!(
            result,
            Err(BookingError::OnlyRequestBookings { .. })
        ));
    }

    #[test]
    fn test_confirm_non_pending_fails() {
        let booking = make_booking(BookingType::Request, BookingStatus::Cancelled);
        let result = BookingLifecycle::confirm(&booking, booking.host_id, at(2026, 5, 2, 9));
        assert!(matches!(
            result,
            Err(BookingError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_reject_pending_request() {
        let booking = make_booking(BookingType::Request, BookingStatus::Pending);
        let transition =
            BookingLifecycle::reject(&booking, booking.host_id, at(2026, 5, 2, 9)).unwrap();
        assert_eq!(transition.new_status(), BookingStatus::Rejected);
    }

    #[test]
    fn test_reject_by_wrong_host_fails() {
        let booking = make_booking(BookingType::Request, BookingStatus::Pending);
        let result = BookingLifecycle::reject(&booking, UserId::new(), at(2026, 5, 2, 9));
        assert!(matches!(result, Err(BookingError::NotAuthorized { .. })));
    }

    #[test]
    fn test_guest_cancel_far_out_gets_full_refund() {
        let booking = make_booking(BookingType::Instant, BookingStatus::Confirmed);
        let transition = BookingLifecycle::cancel(
            &booking,
            booking.guest_id,
            CancelledBy::Guest,
            Some("change of plans".to_string()),
            at(2026, 6, 1, 9), // 9 days before check-in, moderate policy
        )
        .unwrap();

        match transition {
            BookingTransition::Cancel {
                new_status,
                details,
                payment_status,
            } => {
                assert_eq!(new_status, BookingStatus::Cancelled);
                assert_eq!(details.refund_percentage, dec!(100));
                assert_eq!(details.refund_amount, dec!(388.00));
                assert_eq!(details.cancelled_by, CancelledBy::Guest);
                assert_eq!(payment_status, Some(PaymentStatus::Refunded));
            }
            _ => panic!("expected a cancel transition"),
        }
    }

    #[test]
    fn test_guest_cancel_day_of_check_in_refunds_nothing() {
        let booking = make_booking(BookingType::Instant, BookingStatus::Confirmed);
        let transition = BookingLifecycle::cancel(
            &booking,
            booking.guest_id,
            CancelledBy::Guest,
            None,
            at(2026, 6, 10, 8),
        )
        .unwrap();

        match transition {
            BookingTransition::Cancel {
                details,
                payment_status,
                ..
            } => {
                assert_eq!(details.refund_percentage, dec!(0));
                assert_eq!(details.refund_amount, dec!(0.00));
                // no money moved, payment state untouched
                assert_eq!(payment_status, None);
            }
            _ => panic!("expected a cancel transition"),
        }
    }

    #[test]
    fn test_host_cancel_requires_host_actor() {
        let booking = make_booking(BookingType::Instant, BookingStatus::Confirmed);
        let result = BookingLifecycle::cancel(
            &booking,
            booking.guest_id, // guest pretending to cancel as host
            CancelledBy::Host,
            None,
            at(2026, 6, 1, 9),
        );
        assert!(matches!(result, Err(BookingError::NotAuthorized { .. })));
    }

    #[test]
    fn test_cancel_cancelled_booking_fails() {
        let booking = make_booking(BookingType::Instant, BookingStatus::Cancelled);
        let result = BookingLifecycle::cancel(
            &booking,
            booking.guest_id,
            CancelledBy::Guest,
            None,
            at(2026, 6, 1, 9),
        );
        assert!(matches!(
            result,
            Err(BookingError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_cancel_completed_booking_fails() {
        let booking = make_booking(BookingType::Instant, BookingStatus::Completed);
        let result = BookingLifecycle::cancel(
            &booking,
            booking.guest_id,
            CancelledBy::Guest,
            None,
            at(2026, 6, 20, 9),
        );
        assert!(matches!(
            result,
            Err(BookingError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_cancel_rejected_booking_fails() {
        let booking = make_booking(BookingType::Request, BookingStatus::Rejected);
        let result = BookingLifecycle::cancel(
            &booking,
            booking.guest_id,
            CancelledBy::Guest,
            None,
            at(2026, 6, 1, 9),
        );
        assert!(matches!(
            result,
            Err(BookingError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_complete_after_checkout() {
        let booking = make_booking(BookingType::Instant, BookingStatus::Confirmed);
        let transition = BookingLifecycle::complete(&booking, at(2026, 6, 13, 11)).unwrap();
        assert_eq!(transition.new_status(), BookingStatus::Completed);
    }

    #[test]
    fn test_complete_before_checkout_fails() {
        let booking = make_booking(BookingType::Instant, BookingStatus::Confirmed);
        let result = BookingLifecycle::complete(&booking, at(2026, 6, 12, 11));
        assert!(matches!(result, Err(BookingError::StayNotEnded { .. })));
    }

    #[test]
    fn test_complete_pending_booking_fails() {
        let booking = make_booking(BookingType::Request, BookingStatus::Pending);
        let result = BookingLifecycle::complete(&booking, at(2026, 6, 20, 11));
        assert!(matches!(
            result,
            Err(BookingError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_is_valid_transition() {
        // Valid transitions
        assert!(BookingLifecycle::is_valid_transition(
            BookingStatus::Pending,
            BookingStatus::Confirmed
        ));
        assert!(BookingLifecycle::is_valid_transition(
            BookingStatus::Pending,
            BookingStatus::Rejected
        ));
        assert!(BookingLifecycle::is_valid_transition(
            BookingStatus::Pending,
            BookingStatus::Cancelled
        ));
        assert!(BookingLifecycle::is_valid_transition(
            BookingStatus::Confirmed,
            BookingStatus::Cancelled
        ));
        assert!(BookingLifecycle::is_valid_transition(
            BookingStatus::Confirmed,
            BookingStatus::Completed
        ));

        // Invalid transitions
        assert!(!BookingLifecycle::is_valid_transition(
            BookingStatus::Pending,
            BookingStatus::Completed
        ));
        assert!(!BookingLifecycle::is_valid_transition(
            BookingStatus::Cancelled,
            BookingStatus::Confirmed
        ));
        assert!(!BookingLifecycle::is_valid_transition(
            BookingStatus::Rejected,
            BookingStatus::Pending
        ));
        assert!(!BookingLifecycle::is_valid_transition(
            BookingStatus::Completed,
            BookingStatus::Cancelled
        ));
    }
}
