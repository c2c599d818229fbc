//! Label issuance for a manufacturing line station.
//!
//! This crate ties the station together: it reads the attached device,
//! gates on its readiness, composes the label, records the issuance and
//! prints it.
//!
//! # Architecture
//!
//! - [`readiness`] - Pure readiness gate over a device snapshot
//! - [`IssuanceCoordinator`] - The issuance state machine over its
//!   collaborators (device link, composer, store, print sink, confirmation
//!   source)
//! - [`PolicyHandle`] - Operator switches shared across requests
//! - [`printer`] - Print sinks (raw socket, device file, spooler queue)
//! - [`config`] / [`station`] - Building a [`Station`] from a TOML file
//!
//! # Ordering
//!
//! A label is recorded before it is printed, and only after it has been
//! composed:
//!
//! - composition failure: nothing recorded, nothing printed
//! - persistence failure: nothing printed
//! - print failure: the `preready` record stays for a manual reprint
//!
//! # Examples
//!
//! ```no_run
//! use labelstation_station::{StationConfig, station};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StationConfig::load(None)?;
//! let (station, db) = station::open(&config).await?;
//!
//! let outcome = station.issue_label("RC-103-000123").await;
//! println!("{}", outcome.message());
//!
//! db.close().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod confirmation;
pub mod coordinator;
pub mod error;
pub mod mock;
pub mod outcome;
pub mod policy;
pub mod printer;
pub mod readiness;
pub mod state;
pub mod station;

pub use config::StationConfig;
pub use confirmation::{AnyConfirmationSource, StoreConfirmationSource};
pub use coordinator::{DeviceSummary, IssuanceCoordinator, ReadinessStatus, StationIdentity};
pub use error::{Result, StationError};
pub use outcome::{ErrorKind, IssuanceOutcome, IssuanceResponse, OperationFailure};
pub use policy::PolicyHandle;
pub use printer::{AnyPrintSink, PrintError, PrintSink, RawPrinterSink};
pub use readiness::{NotReadyReason, Readiness, ReadinessMode};
pub use state::{IssuanceState, IssuanceTrail, StateTransition};
pub use station::Station;
