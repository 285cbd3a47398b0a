//! Postgres enum types backing the booking vocabularies.
//!
//! Each enum converts to and from its `hearth_core` counterpart so the
//! repositories can move between rows and domain values without string
//! matching.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use hearth_core::booking;
use hearth_core::ledger;

/// Booking lifecycle status (`booking_status` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "booking_status")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting host approval.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Confirmed, blocks the listing's dates.
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Declined by the host.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Cancelled by guest or host.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Stay ended.
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl From<booking::BookingStatus> for BookingStatus {
    fn from(status: booking::BookingStatus) -> Self {
        match status {
            booking::BookingStatus::Pending => Self::Pending,
            booking::BookingStatus::Confirmed => Self::Confirmed,
            booking::BookingStatus::Rejected => Self::Rejected,
            booking::BookingStatus::Cancelled => Self::Cancelled,
            booking::BookingStatus::Completed => Self::Completed,
        }
    }
}

impl From<BookingStatus> for booking::BookingStatus {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Pending => Self::Pending,
            BookingStatus::Confirmed => Self::Confirmed,
            BookingStatus::Rejected => Self::Rejected,
            BookingStatus::Cancelled => Self::Cancelled,
            BookingStatus::Completed => Self::Completed,
        }
    }
}

/// Instant vs request-to-book (`booking_type` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "booking_type")]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    /// Auto-confirmed on creation.
    #[sea_orm(string_value = "instant")]
    Instant,
    /// Requires host approval.
    #[sea_orm(string_value = "request")]
    Request,
}

impl From<booking::BookingType> for BookingType {
    fn from(booking_type: booking::BookingType) -> Self {
        match booking_type {
            booking::BookingType::Instant => Self::Instant,
            booking::BookingType::Request => Self::Request,
        }
    }
}

impl From<BookingType> for booking::BookingType {
    fn from(booking_type: BookingType) -> Self {
        match booking_type {
            BookingType::Instant => Self::Instant,
            BookingType::Request => Self::Request,
        }
    }
}

/// Payment state (`payment_status` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Payment not completed yet.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Payment captured.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Payment failed.
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Payment refunded.
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl From<booking::PaymentStatus> for PaymentStatus {
    fn from(status: booking::PaymentStatus) -> Self {
        match status {
            booking::PaymentStatus::Pending => Self::Pending,
            booking::PaymentStatus::Completed => Self::Completed,
            booking::PaymentStatus::Failed => Self::Failed,
            booking::PaymentStatus::Refunded => Self::Refunded,
        }
    }
}

impl From<PaymentStatus> for booking::PaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Completed => Self::Completed,
            PaymentStatus::Failed => Self::Failed,
            PaymentStatus::Refunded => Self::Refunded,
        }
    }
}

/// Cancellation policy tier (`cancellation_policy` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "cancellation_policy")]
#[serde(rename_all = "lowercase")]
pub enum CancellationPolicy {
    /// Full refund up to 1 day out.
    #[sea_orm(string_value = "flexible")]
    Flexible,
    /// Tiered at 5 days / 1 day.
    #[sea_orm(string_value = "moderate")]
    Moderate,
    /// Tiered at 14 days / 7 days.
    #[sea_orm(string_value = "strict")]
    Strict,
}

impl From<booking::CancellationPolicy> for CancellationPolicy {
    fn from(policy: booking::CancellationPolicy) -> Self {
        match policy {
            booking::CancellationPolicy::Flexible => Self::Flexible,
            booking::CancellationPolicy::Moderate => Self::Moderate,
            booking::CancellationPolicy::Strict => Self::Strict,
        }
    }
}

impl From<CancellationPolicy> for booking::CancellationPolicy {
    fn from(policy: CancellationPolicy) -> Self {
        match policy {
            CancellationPolicy::Flexible => Self::Flexible,
            CancellationPolicy::Moderate => Self::Moderate,
            CancellationPolicy::Strict => Self::Strict,
        }
    }
}

/// Which party cancelled (`cancelled_by` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "cancelled_by")]
#[serde(rename_all = "lowercase")]
pub enum CancelledBy {
    /// The guest cancelled.
    #[sea_orm(string_value = "guest")]
    Guest,
    /// The host cancelled.
    #[sea_orm(string_value = "host")]
    Host,
}

impl From<booking::CancelledBy> for CancelledBy {
    fn from(cancelled_by: booking::CancelledBy) -> Self {
        match cancelled_by {
            booking::CancelledBy::Guest => Self::Guest,
            booking::CancelledBy::Host => Self::Host,
        }
    }
}

impl From<CancelledBy> for booking::CancelledBy {
    fn from(cancelled_by: CancelledBy) -> Self {
        match cancelled_by {
            CancelledBy::Guest => Self::Guest,
            CancelledBy::Host => Self::Host,
        }
    }
}

/// Kind of ledger record (`ledger_entry_kind` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ledger_entry_kind")]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryKind {
    /// Guest payment.
    #[sea_orm(string_value = "payment")]
    Payment,
    /// Refund to the guest.
    #[sea_orm(string_value = "refund")]
    Refund,
    /// Host payout.
    #[sea_orm(string_value = "payout")]
    Payout,
}

impl From<ledger::LedgerEntryKind> for LedgerEntryKind {
    fn from(kind: ledger::LedgerEntryKind) -> Self {
        match kind {
            ledger::LedgerEntryKind::Payment => Self::Payment,
            ledger::LedgerEntryKind::Refund => Self::Refund,
            ledger::LedgerEntryKind::Payout => Self::Payout,
        }
    }
}

impl From<LedgerEntryKind> for ledger::LedgerEntryKind {
    fn from(kind: LedgerEntryKind) -> Self {
        match kind {
            LedgerEntryKind::Payment => Self::Payment,
            LedgerEntryKind::Refund => Self::Refund,
            LedgerEntryKind::Payout => Self::Payout,
        }
    }
}
