//! Initial schema for the booking engine.
//!
//! Creates the enum types, users/listings/bookings/ledger_records tables,
//! and the exclusion constraint that makes overlapping active bookings
//! impossible at the storage layer.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP TABLE IF EXISTS ledger_records CASCADE;
DROP TABLE IF EXISTS bookings CASCADE;
DROP TABLE IF EXISTS listings CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TYPE IF EXISTS ledger_entry_kind;
DROP TYPE IF EXISTS cancelled_by;
DROP TYPE IF EXISTS cancellation_policy;
DROP TYPE IF EXISTS payment_status;
DROP TYPE IF EXISTS booking_type;
DROP TYPE IF EXISTS booking_status;
",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- Range overlap exclusion needs gist over scalar equality
CREATE EXTENSION IF NOT EXISTS btree_gist;

CREATE TYPE booking_status AS ENUM ('pending', 'confirmed', 'rejected', 'cancelled', 'completed');
CREATE TYPE booking_type AS ENUM ('instant', 'request');
CREATE TYPE payment_status AS ENUM ('pending', 'completed', 'failed', 'refunded');
CREATE TYPE cancellation_policy AS ENUM ('flexible', 'moderate', 'strict');
CREATE TYPE cancelled_by AS ENUM ('guest', 'host');
CREATE TYPE ledger_entry_kind AS ENUM ('payment', 'refund', 'payout');

CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE listings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    host_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title VARCHAR(255) NOT NULL,
    nightly_rate NUMERIC(12, 2) NOT NULL,
    cleaning_fee NUMERIC(12, 2) NOT NULL DEFAULT 0,
    cancellation_policy cancellation_policy NOT NULL DEFAULT 'moderate',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_listings_rate_non_negative CHECK (nightly_rate >= 0),
    CONSTRAINT chk_listings_fee_non_negative CHECK (cleaning_fee >= 0)
);

CREATE INDEX idx_listings_host ON listings(host_id);

CREATE TABLE bookings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    listing_id UUID NOT NULL REFERENCES listings(id) ON DELETE RESTRICT,
    guest_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    host_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    adults INTEGER NOT NULL,
    children INTEGER NOT NULL DEFAULT 0,
    infants INTEGER NOT NULL DEFAULT 0,
    number_of_nights INTEGER NOT NULL,
    base_price NUMERIC(12, 2) NOT NULL,
    cleaning_fee NUMERIC(12, 2) NOT NULL DEFAULT 0,
    service_fee NUMERIC(12, 2) NOT NULL,
    tax_amount NUMERIC(12, 2) NOT NULL DEFAULT 0,
    total_price NUMERIC(12, 2) NOT NULL,
    booking_type booking_type NOT NULL,
    status booking_status NOT NULL,
    payment_status payment_status NOT NULL DEFAULT 'pending',
    cancellation_policy cancellation_policy NOT NULL,
    cancelled_at TIMESTAMPTZ,
    cancelled_by cancelled_by,
    cancellation_reason TEXT,
    refund_amount NUMERIC(12, 2),
    refund_percentage NUMERIC(5, 2),
    special_requests TEXT,
    version INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_bookings_dates CHECK (end_date > start_date),
    CONSTRAINT chk_bookings_adults CHECK (adults >= 1),
    CONSTRAINT chk_bookings_children CHECK (children >= 0),
    CONSTRAINT chk_bookings_infants CHECK (infants >= 0),
    CONSTRAINT chk_bookings_nights CHECK (number_of_nights >= 1),
    CONSTRAINT chk_bookings_total_reconciles
        CHECK (total_price = base_price + cleaning_fee + service_fee + tax_amount),
    -- No two active bookings of one listing may overlap (half-open ranges)
    CONSTRAINT bookings_no_active_overlap EXCLUDE USING gist (
        listing_id WITH =,
        daterange(start_date, end_date) WITH &&
    ) WHERE (status IN ('pending', 'confirmed'))
);

CREATE INDEX idx_bookings_guest ON bookings(guest_id, created_at DESC);
CREATE INDEX idx_bookings_host ON bookings(host_id, status);
CREATE INDEX idx_bookings_listing_dates ON bookings(listing_id, start_date, end_date);

CREATE TABLE ledger_records (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    booking_id UUID REFERENCES bookings(id) ON DELETE SET NULL,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
    host_id UUID REFERENCES users(id) ON DELETE RESTRICT,
    kind ledger_entry_kind NOT NULL,
    amount NUMERIC(12, 2) NOT NULL,
    currency CHAR(3) NOT NULL DEFAULT 'USD',
    reference VARCHAR(80) NOT NULL,
    reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_ledger_amount_non_negative CHECK (amount >= 0),
    -- Idempotency key: duplicate deliveries collapse onto one record
    CONSTRAINT uq_ledger_reference UNIQUE (reference)
);

CREATE INDEX idx_ledger_booking ON ledger_records(booking_id);
CREATE INDEX idx_ledger_user ON ledger_records(user_id, created_at DESC);
";
