//! Confirmation sources available to the station.

use labelstation_storage::{IssuanceRecord, IssuanceRepository, SqliteIssuanceRepository};
use labelstation_tracking::{
    ConfirmationSource, ScanConfirmation, TrackedDevice, TrackingClient, TrackingError,
};

/// Reads scan progress from the issuance store itself.
///
/// Downstream scanners update the same `ready_devices` table the station
/// writes, so a station without a tracking service can watch it directly.
#[derive(Debug, Clone)]
pub struct StoreConfirmationSource<S> {
    store: S,
}

impl<S: IssuanceRepository> StoreConfirmationSource<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

fn tracked(record: IssuanceRecord) -> TrackedDevice {
    TrackedDevice {
        status: Some(record.get_status()),
        scan_timestamp: Some(record.scan_timestamp),
        station_id: Some(record.station_id),
        scanner_id: Some(record.scanner_id),
        barcode: record.barcode,
    }
}

impl<S: IssuanceRepository> ConfirmationSource for StoreConfirmationSource<S> {
    async fn check_status(&self, barcode: &str) -> labelstation_tracking::Result<ScanConfirmation> {
        let record = self
            .store
            .find_by_barcode(barcode)
            .await
            .map_err(|e| TrackingError::store(e.to_string()))?;

        Ok(match record {
            Some(record) => ScanConfirmation::from_device(&tracked(record)),
            None => ScanConfirmation::unknown(),
        })
    }

    async fn list_recent(
        &self,
        limit: u32,
        window_minutes: u32,
    ) -> labelstation_tracking::Result<Vec<TrackedDevice>> {
        let records = self
            .store
            .list_recent(limit, window_minutes)
            .await
            .map_err(|e| TrackingError::store(e.to_string()))?;

        Ok(records.into_iter().map(tracked).collect())
    }
}

/// Enum wrapper for confirmation source dispatch.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnyConfirmationSource {
    Tracking(TrackingClient),
    Store(StoreConfirmationSource<SqliteIssuanceRepository>),
}

impl ConfirmationSource for AnyConfirmationSource {
    async fn check_status(&self, barcode: &str) -> labelstation_tracking::Result<ScanConfirmation> {
        match self {
            Self::Tracking(source) => source.check_status(barcode).await,
            Self::Store(source) => source.check_status(barcode).await,
        }
    }

    async fn list_recent(
        &self,
        limit: u32,
        window_minutes: u32,
    ) -> labelstation_tracking::Result<Vec<TrackedDevice>> {
        match self {
            Self::Tracking(source) => source.list_recent(limit, window_minutes).await,
            Self::Store(source) => source.list_recent(limit, window_minutes).await,
        }
    }
}

impl From<TrackingClient> for AnyConfirmationSource {
    fn from(client: TrackingClient) -> Self {
        Self::Tracking(client)
    }
}

impl From<StoreConfirmationSource<SqliteIssuanceRepository>> for AnyConfirmationSource {
    fn from(source: StoreConfirmationSource<SqliteIssuanceRepository>) -> Self {
        Self::Store(source)
    }
}
