//! Stay price calculation.
//!
//! Pure and deterministic: the same inputs always produce the same
//! breakdown. Every component is rounded to 2 decimal places and the
//! total is the sum of the rounded components, so the breakdown always
//! reconciles exactly.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::booking::availability::validate_range;
use crate::booking::error::BookingError;
use crate::booking::types::{PriceBreakdown, Quote};

/// Platform service fee rate (12% of the base price).
fn service_fee_rate() -> Decimal {
    Decimal::new(12, 2)
}

/// Tax rate (10% of base price plus cleaning fee).
fn tax_rate() -> Decimal {
    Decimal::new(10, 2)
}

/// Stateless price calculator.
pub struct PricingService;

impl PricingService {
    /// Computes the number of nights in `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidDateRange` when the range is empty
    /// or inverted (nights < 1).
    pub fn number_of_nights(start: NaiveDate, end: NaiveDate) -> Result<u32, BookingError> {
        validate_range(start, end)?;
        let nights = (end - start).num_days();
        u32::try_from(nights).map_err(|_| BookingError::InvalidDateRange { start, end })
    }

    /// Computes the price breakdown for a stay.
    ///
    /// `base = nightly_rate * nights`, service fee is 12% of base, tax
    /// is 10% of (base + cleaning fee), total is the sum of the four
    /// components.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidDateRange` for an empty range, or
    /// `BookingError::NegativeAmount` when the rate or cleaning fee is
    /// negative.
    pub fn quote(
        nightly_rate: Decimal,
        cleaning_fee: Decimal,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Quote, BookingError> {
        if nightly_rate.is_sign_negative() && !nightly_rate.is_zero() {
            return Err(BookingError::NegativeAmount {
                field: "nightly rate",
            });
        }
        if cleaning_fee.is_sign_negative() && !cleaning_fee.is_zero() {
            return Err(BookingError::NegativeAmount {
                field: "cleaning fee",
            });
        }

        let nights = Self::number_of_nights(start, end)?;

        let base_price = (nightly_rate * Decimal::from(nights)).round_dp(2);
        let cleaning_fee = cleaning_fee.round_dp(2);
        let service_fee = (base_price * service_fee_rate()).round_dp(2);
        let tax_amount = ((base_price + cleaning_fee) * tax_rate()).round_dp(2);
        let total_price = base_price + cleaning_fee + service_fee + tax_amount;

        Ok(Quote {
            number_of_nights: nights,
            price_breakdown: PriceBreakdown {
                base_price,
                cleaning_fee,
                service_fee,
                tax_amount,
                total_price,
            },
        })
    }
}
