//! Mock device link for testing and development.

mod link;

pub use link::{MockDeviceLink, MockDeviceLinkHandle, passing_snapshot};
