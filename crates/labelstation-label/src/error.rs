//! Error types for label composition.

use labelstation_core::DeviceType;
use std::path::PathBuf;
use thiserror::Error;

/// Composition failures. Any of these makes the label unusable.
#[derive(Debug, Error)]
pub enum LabelError {
    /// No template is registered for the device type.
    ///
    /// Serial validation only admits registered prefixes, so reaching this
    /// means the registry and the serial grammar disagree.
    #[error("No label template registered for {device_type}")]
    UnknownTemplate { device_type: DeviceType },

    /// A template element lies outside the label page.
    #[error("{device_type} template element '{element}' at ({x_mm} mm, {y_mm} mm) is outside the {width_mm}x{height_mm} mm page")]
    OutOfBounds {
        device_type: DeviceType,
        element: String,
        x_mm: f64,
        y_mm: f64,
        width_mm: f64,
        height_mm: f64,
    },

    /// The base template asset does not exist.
    #[error("Base template asset missing: {}", path.display())]
    AssetMissing { path: PathBuf },

    /// The base template asset exists but could not be decoded.
    #[error("Base template asset unreadable: {}: {message}", path.display())]
    AssetUnreadable { path: PathBuf, message: String },
}

impl LabelError {
    /// `true` for failures that indicate a programming or registry defect
    /// rather than a station-side problem.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::UnknownTemplate { .. } | Self::OutOfBounds { .. })
    }
}

pub type Result<T> = std::result::Result<T, LabelError>;

/// Symbol renderer failures.
///
/// The symbol is decoration; the composer logs these and carries on without
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// No symbol encoder is installed or configured.
    #[error("Symbol encoder unavailable: {0}")]
    Unavailable(String),

    /// The encoder rejected the payload.
    #[error("Unsupported symbol payload: {0}")]
    Unsupported(String),

    /// The encoder ran but its output could not be used.
    #[error("Symbol rendering failed: {0}")]
    Failed(String),
}
