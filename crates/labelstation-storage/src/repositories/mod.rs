pub mod issuance;

pub use issuance::{IssuanceRepository, SqliteIssuanceRepository};
