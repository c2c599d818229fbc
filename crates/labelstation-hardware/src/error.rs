//! Error types for device link operations.
//!
//! The important split is between a link that could not be reached
//! (process missing, timeout, garbage output) and a link that answered but
//! reported a device count other than one. Both stop an issuance, but they
//! tell the operator different things.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while reading a device snapshot.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The device link could not be reached at all.
    #[error("Device link unreachable: {message}")]
    Unreachable { message: String },

    /// The device link did not answer in time.
    #[error("Device link timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The link answered and reported no attached devices.
    #[error("No devices found, check connection and drivers")]
    NoDevices,

    /// The link answered and reported more than one attached device.
    #[error("Multiple devices found ({count}), only single device mode is supported")]
    MultipleDevices { count: usize },

    /// The link answered but reported a failed command.
    #[error("Device command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    /// The link produced output that could not be interpreted.
    #[error("Invalid data from device link: {message}")]
    InvalidData { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new unreachable error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new command failure error.
    pub fn command_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// `true` when the link itself failed, as opposed to answering with an
    /// unexpected device count.
    pub fn is_link_failure(&self) -> bool {
        matches!(
            self,
            Self::Unreachable { .. } | Self::Timeout { .. } | Self::InvalidData { .. } | Self::Io(_)
        )
    }
}
