//! Repository implementations
//!
//! Repositories own the SQL for one table each and speak in row types.
//! Conversion to domain types happens in `adapters`.

pub mod admins;
pub mod bill_records;
pub mod rate_entries;

pub use admins::AdminRepository;
pub use bill_records::BillRecordRepository;
pub use rate_entries::RateEntryRepository;
