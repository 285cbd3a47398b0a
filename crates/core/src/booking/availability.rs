//! Availability checks for listings.
//!
//! The sole guard against double-booking: a listing is free for a
//! requested range iff no active (pending or confirmed) booking overlaps
//! it. Date ranges are half-open, `[start, end)`, so back-to-back stays
//! sharing a checkout/check-in day do not conflict.

use chrono::NaiveDate;

use hearth_shared::types::BookingId;

use crate::booking::error::BookingError;
use crate::booking::types::Booking;

/// Tests whether two half-open date ranges share at least one night.
#[must_use]
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Validates that a requested range is non-empty.
///
/// # Errors
///
/// Returns `BookingError::InvalidDateRange` when `start >= end`.
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), BookingError> {
    if start >= end {
        return Err(BookingError::InvalidDateRange { start, end });
    }
    Ok(())
}

/// Returns the active bookings among `candidates` whose range overlaps
/// the requested one.
///
/// `exclude` skips one booking id, used when re-validating a booking's
/// own dates (e.g. before confirming it).
///
/// Side-effect free; safe to call repeatedly.
///
/// # Errors
///
/// Returns `BookingError::InvalidDateRange` when `start >= end`.
pub fn find_conflicts<'a, I>(
    start: NaiveDate,
    end: NaiveDate,
    candidates: I,
    exclude: Option<BookingId>,
) -> Result<Vec<&'a Booking>, BookingError>
where
    I: IntoIterator<Item = &'a Booking>,
{
    validate_range(start, end)?;

    let conflicts = candidates
        .into_iter()
        .filter(|b| b.status.is_active())
        .filter(|b| exclude != Some(b.id))
        .filter(|b| ranges_overlap(start, end, b.start_date, b.end_date))
        .collect();

    Ok(conflicts)
}

/// Returns true iff no active booking among `candidates` overlaps the
/// requested range.
///
/// # Errors
///
/// Returns `BookingError::InvalidDateRange` when `start >= end`.
pub fn is_available<'a, I>(
    start: NaiveDate,
    end: NaiveDate,
    candidates: I,
    exclude: Option<BookingId>,
) -> Result<bool, BookingError>
where
    I: IntoIterator<Item = &'a Booking>,
{
    Ok(find_conflicts(start, end, candidates, exclude)?.is_empty())
}
