//! Cancellation refund policy engine.
//!
//! Computes the refund owed for a cancellation from the booking's frozen
//! policy tier and the time remaining until check-in. Pure and
//! deterministic given `now`; callers always supply the clock so the
//! tiers stay testable.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::booking::types::CancellationPolicy;

/// The outcome of a refund computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refund {
    /// Amount refunded to the guest, rounded to 2 decimal places.
    pub amount: Decimal,
    /// Percentage of the total price refunded (0-100).
    pub percentage: Decimal,
}

/// Stateless refund calculator.
pub struct RefundPolicyEngine;

impl RefundPolicyEngine {
    /// Whole days remaining until check-in, rounded up.
    ///
    /// Check-in is taken as midnight UTC of the start date. Anything at
    /// or past check-in yields zero or a negative count.
    #[must_use]
    pub fn days_until_check_in(start_date: NaiveDate, now: DateTime<Utc>) -> i64 {
        let check_in = start_date.and_time(NaiveTime::MIN).and_utc();
        let seconds = (check_in - now).num_seconds();
        // Stable equivalent of `i64::div_ceil(86_400)` (still unstable: int_roundings).
        let quotient = seconds / 86_400;
        if seconds % 86_400 > 0 {
            quotient + 1
        } else {
            quotient
        }
    }

    /// Refund percentage for a policy tier and days-to-check-in.
    ///
    /// | policy   | 100%       | 50%          | 0%       |
    /// |----------|------------|--------------|----------|
    /// | flexible | days >= 1  | -            | days < 1 |
    /// | moderate | days >= 5  | 1 <= d < 5   | days < 1 |
    /// | strict   | days >= 14 | 7 <= d < 14  | days < 7 |
    #[must_use]
    pub fn refund_percentage(policy: CancellationPolicy, days_until_check_in: i64) -> Decimal {
        let percent = match policy {
            CancellationPolicy::Flexible => {
                if days_until_check_in >= 1 {
                    100
                } else {
                    0
                }
            }
            CancellationPolicy::Moderate => {
                if days_until_check_in >= 5 {
                    100
                } else if days_until_check_in >= 1 {
                    50
                } else {
                    0
                }
            }
            CancellationPolicy::Strict => {
                if days_until_check_in >= 14 {
                    100
                } else if days_until_check_in >= 7 {
                    50
                } else {
                    0
                }
            }
        };
        Decimal::from(percent)
    }

    /// Computes the refund for cancelling a stay starting on
    /// `start_date` at instant `now`.
    #[must_use]
    pub fn compute(
        policy: CancellationPolicy,
        start_date: NaiveDate,
        now: DateTime<Utc>,
        total_price: Decimal,
    ) -> Refund {
        let days = Self::days_until_check_in(start_date, now);
        let percentage = Self::refund_percentage(policy, days);
        let amount = (total_price * percentage / Decimal::ONE_HUNDRED).round_dp(2);

        Refund { amount, percentage }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_days_until_check_in_rounds_up() {
        // 4 days and 14 hours out counts as 5 days
        let days = RefundPolicyEngine::days_until_check_in(date(2026, 6, 10), at(2026, 6, 5, 10));
        assert_eq!(days, 5);

        // exactly 5 days out stays 5
        let days = RefundPolicyEngine::days_until_check_in(date(2026, 6, 10), at(2026, 6, 5, 0));
        assert_eq!(days, 5);
    }

    #[test]
    fn test_days_until_check_in_after_check_in() {
        // an hour past check-in midnight rounds up to zero, a day past is negative
        assert_eq!(
            RefundPolicyEngine::days_until_check_in(date(2026, 6, 10), at(2026, 6, 10, 1)),
            0
        );
        assert_eq!(
            RefundPolicyEngine::days_until_check_in(date(2026, 6, 10), at(2026, 6, 11, 0)),
            -1
        );
    }

    #[rstest]
    #[case(CancellationPolicy::Flexible, 30, dec!(100))]
    #[case(CancellationPolicy::Flexible, 1, dec!(100))]
    #[case(CancellationPolicy::Flexible, 0, dec!(0))]
    #[case(CancellationPolicy::Moderate, 6, dec!(100))]
    #[case(CancellationPolicy::Moderate, 5, dec!(100))]
    #[case(CancellationPolicy::Moderate, 4, dec!(50))]
    #[case(CancellationPolicy::Moderate, 1, dec!(50))]
    #[case(CancellationPolicy::Moderate, 0, dec!(0))]
    #[case(CancellationPolicy::Strict, 14, dec!(100))]
    #[case(CancellationPolicy::Strict, 13, dec!(50))]
    #[case(CancellationPolicy::Strict, 10, dec!(50))]
    #[case(CancellationPolicy::Strict, 7, dec!(50))]
    #[case(CancellationPolicy::Strict, 6, dec!(0))]
    #[case(CancellationPolicy::Strict, 0, dec!(0))]
    fn test_refund_tiers(
        #[case] policy: CancellationPolicy,
        #[case] days: i64,
        #[case] expected: Decimal,
    ) {
        assert_eq!(RefundPolicyEngine::refund_percentage(policy, days), expected);
    }

    #[test]
    fn test_negative_days_refund_nothing() {
        for policy in [
            CancellationPolicy::Flexible,
            CancellationPolicy::Moderate,
            CancellationPolicy::Strict,
        ] {
            assert_eq!(RefundPolicyEngine::refund_percentage(policy, -3), dec!(0));
        }
    }

    #[test]
    fn test_compute_full_refund() {
        let refund = RefundPolicyEngine::compute(
            CancellationPolicy::Moderate,
            date(2026, 6, 10),
            at(2026, 6, 1, 12),
            dec!(388.00),
        );
        assert_eq!(refund.percentage, dec!(100));
        assert_eq!(refund.amount, dec!(388.00));
    }

    #[test]
    fn test_compute_half_refund_rounds() {
        let refund = RefundPolicyEngine::compute(
            CancellationPolicy::Strict,
            date(2026, 6, 10),
            at(2026, 6, 1, 12), // 9 days out
            dec!(388.33),
        );
        assert_eq!(refund.percentage, dec!(50));
        // 194.165 rounds (banker's) to 194.16
        assert_eq!(refund.amount, dec!(194.16));
    }

    #[test]
    fn test_compute_day_of_check_in_refunds_nothing() {
        let refund = RefundPolicyEngine::compute(
            CancellationPolicy::Flexible,
            date(2026, 6, 10),
            at(2026, 6, 10, 1),
            dec!(500.00),
        );
        assert_eq!(refund.percentage, dec!(0));
        assert_eq!(refund.amount, dec!(0.00));
    }
}
