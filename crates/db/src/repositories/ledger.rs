//! Ledger repository.
//!
//! Persists payment, refund, and payout records and implements the
//! `TransactionLedger` trait the booking engine calls. Records are
//! idempotent per reference: a duplicate reference means the event was
//! already recorded, so the write degrades to a logged no-op instead of
//! double-booking money movements.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set, SqlErr};
use tracing::warn;

use hearth_core::ledger::{LedgerEntryKind, LedgerError, TransactionLedger};
use hearth_shared::types::{BookingId, LedgerRecordId, UserId};

use crate::entities::ledger_records;

/// All amounts settle in a single currency; multi-currency settlement is
/// out of scope.
const CURRENCY: &str = "USD";

/// Ledger repository recording money movements against bookings.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn insert_record(
        &self,
        kind: LedgerEntryKind,
        booking_id: Option<BookingId>,
        user_id: UserId,
        host_id: Option<UserId>,
        amount: Decimal,
        reference: &str,
        reason: Option<&str>,
    ) -> Result<(), LedgerError> {
        let record = ledger_records::ActiveModel {
            id: Set(LedgerRecordId::new().into_inner()),
            booking_id: Set(booking_id.map(BookingId::into_inner)),
            user_id: Set(user_id.into_inner()),
            host_id: Set(host_id.map(UserId::into_inner)),
            kind: Set(kind.into()),
            amount: Set(amount),
            currency: Set(CURRENCY.to_string()),
            reference: Set(reference.to_string()),
            reason: Set(reason.map(ToString::to_string)),
            created_at: Set(Utc::now().into()),
        };

        match record.insert(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_reference(&e) => {
                warn!(reference, kind = %kind, "ledger record already exists, skipping duplicate");
                Ok(())
            }
            Err(e) => Err(LedgerError::Storage(e.to_string())),
        }
    }
}

fn is_duplicate_reference(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl TransactionLedger for LedgerRepository {
    async fn record_payment(
        &self,
        booking_id: BookingId,
        guest_id: UserId,
        host_id: UserId,
        amount: Decimal,
        reference: &str,
    ) -> Result<(), LedgerError> {
        self.insert_record(
            LedgerEntryKind::Payment,
            Some(booking_id),
            guest_id,
            Some(host_id),
            amount,
            reference,
            None,
        )
        .await
    }

    async fn record_refund(
        &self,
        booking_id: BookingId,
        guest_id: UserId,
        amount: Decimal,
        reference: &str,
        reason: Option<&str>,
    ) -> Result<(), LedgerError> {
        self.insert_record(
            LedgerEntryKind::Refund,
            Some(booking_id),
            guest_id,
            None,
            amount,
            reference,
            reason,
        )
        .await
    }

    async fn record_payout(
        &self,
        host_id: UserId,
        booking_id: BookingId,
        amount: Decimal,
        reference: &str,
    ) -> Result<(), LedgerError> {
        self.insert_record(
            LedgerEntryKind::Payout,
            Some(booking_id),
            host_id,
            Some(host_id),
            amount,
            reference,
            None,
        )
        .await
    }
}
