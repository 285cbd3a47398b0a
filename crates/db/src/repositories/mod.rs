//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. All booking mutations go through `BookingRepository`;
//! no other component writes booking rows.

pub mod booking;
pub mod ledger;
pub mod listing;

pub use booking::{BookingFilter, BookingRepository};
pub use ledger::LedgerRepository;
pub use listing::ListingRepository;
