#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{ScanConfirmation, TrackedDevice};

/// Read-only view of downstream scan progress.
///
/// Uses native async trait methods (Edition 2024); implementations are
/// consumed through generics or the station's enum dispatch.
pub trait ConfirmationSource: Send + Sync {
    /// Whether `barcode` has been scanned since it was issued.
    ///
    /// An unknown barcode is `Ok` with `scanned == false`; errors are
    /// reserved for the source itself being unavailable.
    async fn check_status(&self, barcode: &str) -> Result<ScanConfirmation>;

    /// Devices issued within the last `window_minutes`, newest first.
    async fn list_recent(&self, limit: u32, window_minutes: u32) -> Result<Vec<TrackedDevice>>;
}
