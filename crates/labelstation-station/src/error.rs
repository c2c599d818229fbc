//! Station bootstrap errors.
//!
//! Issuance never fails with these: expected outcomes and collaborator
//! faults during a request are reported through
//! [`IssuanceOutcome`](crate::IssuanceOutcome). `StationError` covers
//! assembling a station from configuration.

use labelstation_label::LabelError;
use labelstation_storage::StorageError;
use labelstation_tracking::TrackingError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Issuance store: {0}")]
    Storage(#[from] StorageError),

    #[error("Tracking service: {0}")]
    Tracking(#[from] TrackingError),

    #[error("Label templates: {0}")]
    Templates(#[from] LabelError),
}

impl StationError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, StationError>;
