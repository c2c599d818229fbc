//! Device link trait definition.
//!
//! Uses native `async fn` in traits (Edition 2024), so implementations are
//! dispatched through generics or [`AnyDeviceLink`](crate::AnyDeviceLink)
//! rather than trait objects.

#![allow(async_fn_in_trait)]

use crate::error::{HardwareError, Result};
use crate::snapshot::{DeviceHandle, DeviceSnapshot};
use tracing::debug;

/// Read access to the attached measurement devices.
pub trait DeviceLink: Send + Sync {
    /// Number of currently attached devices.
    ///
    /// # Errors
    ///
    /// Returns a link failure if the device library cannot be reached. A
    /// successful answer of zero is `Ok(0)`, never an error.
    async fn device_count(&self) -> Result<usize>;

    /// Handles of the currently attached devices.
    async fn device_handles(&self) -> Result<Vec<DeviceHandle>>;

    /// Read a fresh snapshot of one device.
    async fn snapshot(&self, handle: DeviceHandle) -> Result<DeviceSnapshot>;
}

/// Read the snapshot of the one and only attached device.
///
/// # Errors
///
/// - [`HardwareError::NoDevices`] when nothing is attached
/// - [`HardwareError::MultipleDevices`] when more than one unit is attached
/// - any link failure reported by `link`
pub async fn single_snapshot<L: DeviceLink>(link: &L) -> Result<DeviceSnapshot> {
    // One enumeration serves as both the count and the handle list.
    let handles = link.device_handles().await?;
    debug!("Device link reports {} attached device(s)", handles.len());

    let handle = match handles.as_slice() {
        [] => return Err(HardwareError::NoDevices),
        [handle] => *handle,
        many => return Err(HardwareError::MultipleDevices { count: many.len() }),
    };

    link.snapshot(handle).await
}
