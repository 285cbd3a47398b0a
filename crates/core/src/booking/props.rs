//! Property-based tests for the booking engine invariants.

use chrono::{Days, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::booking::availability::ranges_overlap;
use crate::booking::lifecycle::{BookingLifecycle, tests::make_booking};
use crate::booking::pricing::PricingService;
use crate::booking::refund::RefundPolicyEngine;
use crate::booking::types::{BookingStatus, BookingType, CancellationPolicy, CancelledBy};

/// Strategy for generating money amounts with cent precision.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_00).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating stay start dates.
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..700).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    })
}

fn policy_strategy() -> impl Strategy<Value = CancellationPolicy> {
    prop_oneof![
        Just(CancellationPolicy::Flexible),
        Just(CancellationPolicy::Moderate),
        Just(CancellationPolicy::Strict),
    ]
}

fn terminal_status_strategy() -> impl Strategy<Value = BookingStatus> {
    prop_oneof![
        Just(BookingStatus::Rejected),
        Just(BookingStatus::Cancelled),
        Just(BookingStatus::Completed),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every computed breakdown reconciles: total equals the sum of its
    /// components, and every component is non-negative.
    #[test]
    fn prop_breakdown_reconciles(
        rate in amount_strategy(),
        cleaning in amount_strategy(),
        start in date_strategy(),
        nights in 1u64..60,
    ) {
        let end = start.checked_add_days(Days::new(nights)).unwrap();
        let quote = PricingService::quote(rate, cleaning, start, end).unwrap();
        let b = quote.price_breakdown;

        prop_assert_eq!(u64::from(quote.number_of_nights), nights);
        prop_assert!(b.reconciles());
        prop_assert!(b.base_price >= Decimal::ZERO);
        prop_assert!(b.cleaning_fee >= Decimal::ZERO);
        prop_assert!(b.service_fee >= Decimal::ZERO);
        prop_assert!(b.tax_amount >= Decimal::ZERO);
        prop_assert!(b.total_price >= Decimal::ZERO);
    }

    /// The calculator is a pure function of its inputs.
    #[test]
    fn prop_pricing_is_deterministic(
        rate in amount_strategy(),
        cleaning in amount_strategy(),
        start in date_strategy(),
        nights in 1u64..60,
    ) {
        let end = start.checked_add_days(Days::new(nights)).unwrap();
        let a = PricingService::quote(rate, cleaning, start, end).unwrap();
        let b = PricingService::quote(rate, cleaning, start, end).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Refunds never exceed the total price and percentages stay in
    /// [0, 100], for any policy and any cancellation instant.
    #[test]
    fn prop_refund_within_bounds(
        policy in policy_strategy(),
        start in date_strategy(),
        days_offset in -30i64..60,
        hour in 0u32..24,
        total in amount_strategy(),
    ) {
        let now_date = if days_offset >= 0 {
            start.checked_sub_days(Days::new(days_offset.unsigned_abs())).unwrap()
        } else {
            start.checked_add_days(Days::new(days_offset.unsigned_abs())).unwrap()
        };
        let now = Utc
            .from_utc_datetime(&now_date.and_hms_opt(hour, 0, 0).unwrap());

        let refund = RefundPolicyEngine::compute(policy, start, now, total);

        prop_assert!(refund.percentage >= Decimal::ZERO);
        prop_assert!(refund.percentage <= Decimal::ONE_HUNDRED);
        prop_assert!(refund.amount >= Decimal::ZERO);
        prop_assert!(refund.amount <= total);
    }

    /// Refund percentage is monotone in the days remaining: cancelling
    /// earlier never refunds less.
    #[test]
    fn prop_refund_monotone_in_days(
        policy in policy_strategy(),
        days in -5i64..40,
    ) {
        let earlier = RefundPolicyEngine::refund_percentage(policy, days + 1);
        let later = RefundPolicyEngine::refund_percentage(policy, days);
        prop_assert!(earlier >= later);
    }

    /// Overlap is symmetric.
    #[test]
    fn prop_overlap_symmetric(
        a_start in date_strategy(),
        a_len in 1u64..30,
        b_start in date_strategy(),
        b_len in 1u64..30,
    ) {
        let a_end = a_start.checked_add_days(Days::new(a_len)).unwrap();
        let b_end = b_start.checked_add_days(Days::new(b_len)).unwrap();
        prop_assert_eq!(
            ranges_overlap(a_start, a_end, b_start, b_end),
            ranges_overlap(b_start, b_end, a_start, a_end)
        );
    }

    /// Back-to-back stays never conflict under half-open semantics.
    #[test]
    fn prop_adjacent_ranges_do_not_overlap(
        start in date_strategy(),
        first_len in 1u64..30,
        second_len in 1u64..30,
    ) {
        let middle = start.checked_add_days(Days::new(first_len)).unwrap();
        let end = middle.checked_add_days(Days::new(second_len)).unwrap();
        prop_assert!(!ranges_overlap(start, middle, middle, end));
    }

    /// Terminal states absorb every transition attempt.
    #[test]
    fn prop_terminal_states_reject_all_transitions(
        status in terminal_status_strategy(),
    ) {
        let booking = make_booking(BookingType::Request, status);
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();

        prop_assert!(BookingLifecycle::confirm(&booking, booking.host_id, now).is_err());
        prop_assert!(BookingLifecycle::reject(&booking, booking.host_id, now).is_err());
        prop_assert!(
            BookingLifecycle::cancel(
                &booking,
                booking.guest_id,
                CancelledBy::Guest,
                None,
                now
            )
            .is_err()
        );
        prop_assert!(BookingLifecycle::complete(&booking, now).is_err());

        // and no transition out of a terminal state is in the table
        for to in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Rejected,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            prop_assert!(!BookingLifecycle::is_valid_transition(status, to));
        }
    }
}
