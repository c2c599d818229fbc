//! Enum wrapper for device link dispatch.
//!
//! Native `async fn` in traits are not object-safe, so `Box<dyn DeviceLink>`
//! is not available. The station holds an [`AnyDeviceLink`] instead and picks
//! the variant from configuration.

use crate::mock::MockDeviceLink;
use crate::wrapper::WrapperDeviceLink;
use crate::{DeviceHandle, DeviceLink, DeviceSnapshot, Result};

/// Enum wrapper for device link dispatch.
///
/// # Examples
///
/// ```
/// use labelstation_hardware::{AnyDeviceLink, DeviceLink};
/// use labelstation_hardware::mock::MockDeviceLink;
///
/// #[tokio::main]
/// async fn main() -> labelstation_hardware::Result<()> {
///     let (mock, _handle) = MockDeviceLink::new();
///     let link = AnyDeviceLink::Mock(mock);
///
///     assert_eq!(link.device_count().await?, 0);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnyDeviceLink {
    /// Vendor helper executable.
    Wrapper(WrapperDeviceLink),
    /// Mock link for development and testing.
    Mock(MockDeviceLink),
}

impl DeviceLink for AnyDeviceLink {
    async fn device_count(&self) -> Result<usize> {
        match self {
            Self::Wrapper(link) => link.device_count().await,
            Self::Mock(link) => link.device_count().await,
        }
    }

    async fn device_handles(&self) -> Result<Vec<DeviceHandle>> {
        match self {
            Self::Wrapper(link) => link.device_handles().await,
            Self::Mock(link) => link.device_handles().await,
        }
    }

    async fn snapshot(&self, handle: DeviceHandle) -> Result<DeviceSnapshot> {
        match self {
            Self::Wrapper(link) => link.snapshot(handle).await,
            Self::Mock(link) => link.snapshot(handle).await,
        }
    }
}

impl From<WrapperDeviceLink> for AnyDeviceLink {
    fn from(link: WrapperDeviceLink) -> Self {
        Self::Wrapper(link)
    }
}

impl From<MockDeviceLink> for AnyDeviceLink {
    fn from(link: MockDeviceLink) -> Self {
        Self::Mock(link)
    }
}
