//! Device snapshot reader for the label station.
//!
//! The station talks to exactly one attached measurement unit. This crate
//! hides how that unit is reached and exposes a single question: "what does
//! the attached device report right now?" The answer is a [`DeviceSnapshot`],
//! a point-in-time copy of the device's serial number, fingerprint and
//! test/calibration record.
//!
//! # Device Links
//!
//! A [`DeviceLink`] is anything that can count attached devices and read a
//! snapshot by handle:
//!
//! - [`WrapperDeviceLink`] drives the vendor helper executable, which prints
//!   one JSON document per invocation.
//! - [`mock::MockDeviceLink`] is controlled from tests through a
//!   [`mock::MockDeviceLinkHandle`].
//!
//! [`AnyDeviceLink`] wraps both for concrete dispatch, since native `async fn`
//! traits cannot be used as trait objects.
//!
//! # Single Device Resolution
//!
//! [`single_snapshot`] enforces the one-device rule: zero or several attached
//! units yield [`HardwareError::NoDevices`] or
//! [`HardwareError::MultipleDevices`], which callers must keep distinct from
//! a link that could not be reached at all.
//!
//! ```
//! use labelstation_hardware::mock::{MockDeviceLink, passing_snapshot};
//! use labelstation_hardware::single_snapshot;
//!
//! #[tokio::main]
//! async fn main() -> labelstation_hardware::Result<()> {
//!     let (link, handle) = MockDeviceLink::new();
//!     handle.attach(passing_snapshot(1, "RC-102-000001")).await;
//!
//!     let snapshot = single_snapshot(&link).await?;
//!     assert_eq!(snapshot.serial.as_deref(), Some("RC-102-000001"));
//!     Ok(())
//! }
//! ```

pub mod devices;
pub mod error;
pub mod mock;
pub mod snapshot;
pub mod traits;
pub mod wrapper;

pub use devices::AnyDeviceLink;
pub use error::{HardwareError, Result};
pub use snapshot::{DatabaseStatus, DeviceHandle, DeviceSnapshot};
pub use traits::{DeviceLink, single_snapshot};
pub use wrapper::{WrapperDeviceLink, WrapperVersion};
