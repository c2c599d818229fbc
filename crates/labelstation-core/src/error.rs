use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid serial number format: {0}")]
    InvalidSerialFormat(String),

    #[error("Unknown device type: {0}")]
    UnknownDeviceType(String),

    #[error("Unknown policy field: {0}")]
    UnknownPolicyField(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
