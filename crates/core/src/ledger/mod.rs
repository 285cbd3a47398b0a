//! Transaction ledger collaborator interface.
//!
//! The booking engine records payment, refund, and payout events against
//! bookings but does not implement the ledger itself. Calls are
//! fire-and-forget from the engine's perspective: a ledger failure is
//! logged by the caller and never rolls back an already-committed
//! booking transition.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use hearth_shared::types::{BookingId, UserId};

/// Kind of money movement recorded against a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEntryKind {
    /// Guest payment captured for a booking.
    Payment,
    /// Money returned to the guest after cancellation.
    Refund,
    /// Host payout after a completed stay.
    Payout,
}

impl LedgerEntryKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Refund => "refund",
            Self::Payout => "payout",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "payment" => Some(Self::Payment),
            "refund" => Some(Self::Refund),
            "payout" => Some(Self::Payout),
            _ => None,
        }
    }
}

impl std::fmt::Display for LedgerEntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors from the ledger collaborator.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The backing store rejected or failed the write.
    #[error("Ledger storage error: {0}")]
    Storage(String),
}

/// Ledger operations the booking engine invokes but does not implement.
///
/// Implementations must be idempotent per `reference`: recording the
/// same reference twice is a no-op, so duplicate delivery (e.g. a
/// retried cancellation request) cannot double-book money movements.
#[async_trait]
pub trait TransactionLedger: Send + Sync {
    /// Records a captured guest payment for a booking.
    async fn record_payment(
        &self,
        booking_id: BookingId,
        guest_id: UserId,
        host_id: UserId,
        amount: Decimal,
        reference: &str,
    ) -> Result<(), LedgerError>;

    /// Records a refund issued to the guest for a cancelled booking.
    async fn record_refund(
        &self,
        booking_id: BookingId,
        guest_id: UserId,
        amount: Decimal,
        reference: &str,
        reason: Option<&str>,
    ) -> Result<(), LedgerError>;

    /// Records a payout owed to the host for a completed booking.
    async fn record_payout(
        &self,
        host_id: UserId,
        booking_id: BookingId,
        amount: Decimal,
        reference: &str,
    ) -> Result<(), LedgerError>;
}

/// Idempotency reference for the payment captured on confirmation.
#[must_use]
pub fn payment_reference(booking_id: BookingId) -> String {
    format!("payment-{booking_id}")
}

/// Idempotency reference for the refund of a cancellation.
///
/// One per booking: a booking cancels at most once, so replays of the
/// same cancellation map to the same reference.
#[must_use]
pub fn refund_reference(booking_id: BookingId) -> String {
    format!("refund-{booking_id}")
}

/// Idempotency reference for the host payout after completion.
#[must_use]
pub fn payout_reference(booking_id: BookingId) -> String {
    format!("payout-{booking_id}")
}
