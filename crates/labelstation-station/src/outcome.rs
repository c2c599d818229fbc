//! Structured results at the coordinator boundary.
//!
//! Nothing a caller triggers through the coordinator is raised as an error.
//! Every request ends in a value carrying a success flag, a message and, on
//! failure, an [`ErrorKind`] that stays distinguishable all the way to the
//! operator.

use crate::readiness::NotReadyReason;
use labelstation_core::SerialNumber;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure categories, each with its own operator action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidFormat,
    DeviceUnavailable,
    NotReady,
    CompositionError,
    PersistenceError,
    PrintError,
    ConfirmationServiceError,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidFormat => "invalid_format",
            ErrorKind::DeviceUnavailable => "device_unavailable",
            ErrorKind::NotReady => "not_ready",
            ErrorKind::CompositionError => "composition_error",
            ErrorKind::PersistenceError => "persistence_error",
            ErrorKind::PrintError => "print_error",
            ErrorKind::ConfirmationServiceError => "confirmation_service_error",
        }
    }

    /// What the operator should do about it.
    pub fn operator_hint(&self) -> &'static str {
        match self {
            ErrorKind::InvalidFormat => "fix the input",
            ErrorKind::DeviceUnavailable | ErrorKind::NotReady => "check the device",
            ErrorKind::CompositionError => "check the label templates",
            ErrorKind::PersistenceError | ErrorKind::ConfirmationServiceError => {
                "check connectivity"
            }
            ErrorKind::PrintError => "retry printing",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How an `issue_label` request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum IssuanceOutcome {
    /// Label recorded and, unless printing is disabled, printed.
    Issued { serial: SerialNumber, printed: bool },
    InvalidFormat { input: String, reason: String },
    DeviceUnavailable { reason: String },
    NotReady { reasons: Vec<NotReadyReason> },
    /// Nothing was recorded.
    CompositionFailed { serial: SerialNumber, error: String },
    /// Nothing was recorded or printed.
    PersistenceFailed { serial: SerialNumber, error: String },
    /// The `preready` record stays; the label can be reprinted.
    PrintFailed { serial: SerialNumber, error: String },
}

impl IssuanceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, IssuanceOutcome::Issued { .. })
    }

    pub fn printed(&self) -> bool {
        matches!(self, IssuanceOutcome::Issued { printed: true, .. })
    }

    /// Whether a `preready` record exists for the serial afterwards.
    pub fn recorded(&self) -> bool {
        matches!(
            self,
            IssuanceOutcome::Issued { .. } | IssuanceOutcome::PrintFailed { .. }
        )
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            IssuanceOutcome::Issued { .. } => None,
            IssuanceOutcome::InvalidFormat { .. } => Some(ErrorKind::InvalidFormat),
            IssuanceOutcome::DeviceUnavailable { .. } => Some(ErrorKind::DeviceUnavailable),
            IssuanceOutcome::NotReady { .. } => Some(ErrorKind::NotReady),
            IssuanceOutcome::CompositionFailed { .. } => Some(ErrorKind::CompositionError),
            IssuanceOutcome::PersistenceFailed { .. } => Some(ErrorKind::PersistenceError),
            IssuanceOutcome::PrintFailed { .. } => Some(ErrorKind::PrintError),
        }
    }

    pub fn message(&self) -> String {
        match self {
            IssuanceOutcome::Issued {
                serial,
                printed: true,
            } => format!("Label {serial} recorded and sent to the printer"),
            IssuanceOutcome::Issued {
                serial,
                printed: false,
            } => format!("Label {serial} recorded (printing disabled, not printed)"),
            IssuanceOutcome::InvalidFormat { input, reason } => {
                format!("Invalid serial number {input:?}: {reason}")
            }
            IssuanceOutcome::DeviceUnavailable { reason } => {
                format!("Device unavailable: {reason}")
            }
            IssuanceOutcome::NotReady { reasons } => {
                let list: Vec<String> = reasons.iter().map(ToString::to_string).collect();
                format!("Device not ready: {}", list.join(", "))
            }
            IssuanceOutcome::CompositionFailed { serial, error } => {
                format!("Label for {serial} could not be composed: {error}")
            }
            IssuanceOutcome::PersistenceFailed { serial, error } => {
                format!("Issuance of {serial} could not be recorded, nothing printed: {error}")
            }
            IssuanceOutcome::PrintFailed { serial, error } => {
                format!("Label {serial} recorded but printing failed: {error}")
            }
        }
    }

    pub fn to_response(&self) -> IssuanceResponse {
        let kind = self.kind();
        let reasons = match self {
            IssuanceOutcome::NotReady { reasons } => {
                reasons.iter().map(ToString::to_string).collect()
            }
            _ => Vec::new(),
        };

        IssuanceResponse {
            success: self.is_success(),
            message: self.message(),
            printed: self.printed(),
            kind,
            hint: kind.map(|k| k.operator_hint().to_string()),
            reasons,
        }
    }
}

/// Serializable form of an [`IssuanceOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceResponse {
    pub success: bool,
    pub message: String,
    pub printed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

/// Failure of a read-only coordinator query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationFailure {
    pub kind: ErrorKind,
    pub message: String,
    /// Asking again later may succeed without operator action.
    #[serde(default)]
    pub retryable: bool,
}

impl OperationFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn retryable(self, retryable: bool) -> Self {
        Self { retryable, ..self }
    }

    pub fn hint(&self) -> &'static str {
        self.kind.operator_hint()
    }
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind.operator_hint())
    }
}
