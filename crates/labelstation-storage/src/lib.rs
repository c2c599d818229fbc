//! Issuance record storage for the label station.
//!
//! SQLite-backed persistence of the `ready_devices` table, the shared record
//! that downstream scanners also read and update.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool manager with automatic migrations
//! - [`IssuanceRepository`] - Data access trait, with the SQLite
//!   implementation [`SqliteIssuanceRepository`]
//!
//! # Upsert Semantics
//!
//! The station never inserts blindly. Issuing a label for a barcode that
//! already has a row refreshes that row (timestamp, station, status) in a
//! single `INSERT ... ON CONFLICT (barcode) DO UPDATE` statement, so the
//! table holds at most one row per barcode no matter how often a label is
//! reprinted.
//!
//! # Examples
//!
//! ```no_run
//! use labelstation_storage::{Database, DatabaseConfig, IssuanceRepository, NewIssuance};
//! use labelstation_storage::SqliteIssuanceRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::open(DatabaseConfig::new("labelstation.db")).await?;
//! let repo = SqliteIssuanceRepository::new(db.pool().clone());
//!
//! let record = repo
//!     .upsert_preready(&NewIssuance::now("RC-103-000123", "print_label", "bench-1"))
//!     .await?;
//! assert!(record.is_preready());
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod models;
pub mod repositories;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use models::{IssuanceRecord, NewIssuance};
pub use repositories::{IssuanceRepository, SqliteIssuanceRepository};
