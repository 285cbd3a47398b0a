//! `SeaORM` entity definitions.

pub mod bookings;
pub mod ledger_records;
pub mod listings;
pub mod sea_orm_active_enums;
pub mod users;
