pub mod issuance;

pub use issuance::{IssuanceRecord, NewIssuance};
