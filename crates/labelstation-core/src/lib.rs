//! Shared domain types for the label station.
//!
//! Everything that more than one station crate needs to agree on lives here:
//! the serial-number grammar and the device types it selects, the operator
//! validation policy, and the lifecycle status of an issued label.
//!
//! ```
//! use labelstation_core::{DeviceType, SerialNumber};
//!
//! let serial: SerialNumber = "RC-103G-000123".parse().unwrap();
//! assert_eq!(serial.device_type(), DeviceType::Rc103G);
//! assert_eq!(serial.number(), "000123");
//! ```

pub mod constants;
pub mod error;
pub mod policy;
pub mod types;

pub use error::{Error, Result};
pub use policy::{PolicyField, ValidationPolicy};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
