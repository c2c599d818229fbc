//! Scan confirmation for issued labels.
//!
//! After a label is printed the device travels to a downstream scanner that
//! promotes its record from `preready` to `ready`. This crate answers, for a
//! given barcode, whether that has happened yet.
//!
//! # Sources
//!
//! - [`TrackingClient`] queries the tracking service over HTTP
//! - Any other [`ConfirmationSource`] implementation, such as the station's
//!   reader over the local issuance store
//!
//! A source that cannot be reached returns an error. It never reports
//! "not scanned" on failure, so callers can tell a pending scan apart from
//! an outage and keep polling.

pub mod client;
pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use client::TrackingClient;
pub use config::TrackingConfig;
pub use error::{Result, TrackingError};
pub use source::ConfirmationSource;
pub use types::{ScanConfirmation, TrackedDevice};
