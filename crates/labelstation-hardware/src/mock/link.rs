//! Mock device link implementation.
//!
//! The link and its handle share state, so a test can plug devices in and
//! out, or make the link unreachable, while the code under test holds the
//! link.

use crate::{
    DeviceLink, HardwareError, Result,
    snapshot::{DatabaseStatus, DeviceHandle, DeviceSnapshot},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MockState {
    devices: Vec<DeviceSnapshot>,
    unreachable: Option<String>,
}

/// Mock device link for testing and development.
///
/// # Examples
///
/// ```
/// use labelstation_hardware::mock::{MockDeviceLink, passing_snapshot};
/// use labelstation_hardware::{DeviceLink, HardwareError, single_snapshot};
///
/// #[tokio::main]
/// async fn main() {
///     let (link, handle) = MockDeviceLink::new();
///     assert!(matches!(single_snapshot(&link).await, Err(HardwareError::NoDevices)));
///
///     handle.attach(passing_snapshot(1, "RC-103-000001")).await;
///     handle.attach(passing_snapshot(2, "RC-103-000002")).await;
///     assert!(matches!(
///         single_snapshot(&link).await,
///         Err(HardwareError::MultipleDevices { count: 2 })
///     ));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockDeviceLink {
    state: Arc<RwLock<MockState>>,
    queries: Arc<AtomicUsize>,
}

impl MockDeviceLink {
    /// Create a mock link with no devices attached.
    ///
    /// Returns a tuple of (MockDeviceLink, MockDeviceLinkHandle) where the
    /// handle controls what the link reports.
    pub fn new() -> (Self, MockDeviceLinkHandle) {
        Self::from_devices(Vec::new())
    }

    /// Create a mock link with one device already attached.
    pub fn with_device(snapshot: DeviceSnapshot) -> (Self, MockDeviceLinkHandle) {
        Self::from_devices(vec![snapshot])
    }

    fn from_devices(devices: Vec<DeviceSnapshot>) -> (Self, MockDeviceLinkHandle) {
        let state = Arc::new(RwLock::new(MockState {
            devices,
            unreachable: None,
        }));
        let queries = Arc::new(AtomicUsize::new(0));

        let link = Self {
            state: Arc::clone(&state),
            queries: Arc::clone(&queries),
        };
        let handle = MockDeviceLinkHandle { state, queries };

        (link, handle)
    }

    async fn check_reachable(&self) -> Result<()> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        match &self.state.read().await.unreachable {
            Some(message) => Err(HardwareError::unreachable(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MockDeviceLink {
    fn default() -> Self {
        Self::new().0
    }
}

impl DeviceLink for MockDeviceLink {
    async fn device_count(&self) -> Result<usize> {
        self.check_reachable().await?;
        Ok(self.state.read().await.devices.len())
    }

    async fn device_handles(&self) -> Result<Vec<DeviceHandle>> {
        self.check_reachable().await?;
        Ok(self.state.read().await.devices.iter().map(|d| d.handle).collect())
    }

    async fn snapshot(&self, handle: DeviceHandle) -> Result<DeviceSnapshot> {
        self.check_reachable().await?;
        self.state
            .read()
            .await
            .devices
            .iter()
            .find(|d| d.handle == handle)
            .cloned()
            .ok_or_else(|| HardwareError::command_failed("db_info", format!("unknown handle {handle}")))
    }
}

/// Handle for controlling a [`MockDeviceLink`].
#[derive(Debug, Clone)]
pub struct MockDeviceLinkHandle {
    state: Arc<RwLock<MockState>>,
    queries: Arc<AtomicUsize>,
}

impl MockDeviceLinkHandle {
    /// Attach a device. Replaces any attached device with the same handle.
    pub async fn attach(&self, snapshot: DeviceSnapshot) {
        let mut state = self.state.write().await;
        state.devices.retain(|d| d.handle != snapshot.handle);
        state.devices.push(snapshot);
    }

    /// Detach the device with `handle`, if attached.
    pub async fn detach(&self, handle: DeviceHandle) {
        self.state.write().await.devices.retain(|d| d.handle != handle);
    }

    /// Detach every device.
    pub async fn detach_all(&self) {
        self.state.write().await.devices.clear();
    }

    /// Make every link call fail with [`HardwareError::Unreachable`], or
    /// restore normal behavior with `None`.
    pub async fn set_unreachable(&self, message: Option<&str>) {
        self.state.write().await.unreachable = message.map(str::to_string);
    }

    /// Number of link calls made so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

/// Snapshot of a device that passes every readiness condition.
pub fn passing_snapshot(handle: u64, serial: &str) -> DeviceSnapshot {
    DeviceSnapshot {
        handle: DeviceHandle(handle),
        mcu_id: Some(vec![0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0]),
        serial: Some(serial.to_string()),
        db_status: DatabaseStatus::Ok,
        tests_ok: true,
        calibration_ok: true,
        prog_time: 1_700_000_000,
        calib_time: 1_700_000_600,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::single_snapshot;

    #[tokio::test]
    async fn test_single_device_snapshot() {
        let (link, _handle) = MockDeviceLink::with_device(passing_snapshot(7, "RC-110-000007"));

        let snapshot = single_snapshot(&link).await.unwrap();
        assert_eq!(snapshot.handle, DeviceHandle(7));
        assert_eq!(snapshot.serial.as_deref(), Some("RC-110-000007"));
    }

    #[tokio::test]
    async fn test_zero_devices() {
        let (link, _handle) = MockDeviceLink::new();
        let err = single_snapshot(&link).await.unwrap_err();
        assert!(matches!(err, HardwareError::NoDevices));
        assert!(!err.is_link_failure());
    }

    #[tokio::test]
    async fn test_two_devices() {
        let (link, handle) = MockDeviceLink::new();
        handle.attach(passing_snapshot(1, "RC-102-000001")).await;
        handle.attach(passing_snapshot(2, "RC-102-000002")).await;

        let err = single_snapshot(&link).await.unwrap_err();
        assert!(matches!(err, HardwareError::MultipleDevices { count: 2 }));
    }

    #[tokio::test]
    async fn test_unreachable_is_distinct_from_zero() {
        let (link, handle) = MockDeviceLink::new();
        handle.set_unreachable(Some("helper missing")).await;

        let err = single_snapshot(&link).await.unwrap_err();
        assert!(err.is_link_failure());

        handle.set_unreachable(None).await;
        assert!(matches!(
            single_snapshot(&link).await,
            Err(HardwareError::NoDevices)
        ));
    }

    #[tokio::test]
    async fn test_attach_replaces_same_handle() {
        let (link, handle) = MockDeviceLink::new();
        handle.attach(passing_snapshot(1, "RC-102-000001")).await;
        handle.attach(passing_snapshot(1, "RC-102-000009")).await;

        assert_eq!(link.device_count().await.unwrap(), 1);
        let snapshot = single_snapshot(&link).await.unwrap();
        assert_eq!(snapshot.serial.as_deref(), Some("RC-102-000009"));

        handle.detach(DeviceHandle(1)).await;
        assert_eq!(link.device_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_query_count() {
        let (link, handle) = MockDeviceLink::with_device(passing_snapshot(1, "RC-102-000001"));
        single_snapshot(&link).await.unwrap();
        assert_eq!(handle.query_count(), 2);
    }
}
