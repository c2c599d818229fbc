use chrono::{DateTime, Utc};
use labelstation_core::IssuanceStatus;
use serde::{Deserialize, Serialize};

/// Issuance record: one label issued for one barcode.
///
/// Maps to the `ready_devices` table. `barcode` is unique; re-issuing a
/// barcode updates its row in place.
///
/// # Fields
///
/// * `id` - Auto-increment primary key
/// * `barcode` - Serial number printed on the label
/// * `scanner_id` - Role tag of the writer (`print_label` for this station)
/// * `scan_timestamp` - Time of the latest issuance
/// * `station_id` - Host name of the issuing station
/// * `status` - `preready` until a downstream scan moves it to `ready`
/// * `created_at` - First issuance
/// * `updated_at` - Last write by anyone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct IssuanceRecord {
    pub id: i64,
    pub barcode: String,
    pub scanner_id: String,
    pub scan_timestamp: DateTime<Utc>,
    pub station_id: String,
    /// Raw status text. Use `get_status()` for the typed value.
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IssuanceRecord {
    /// Typed status.
    pub fn get_status(&self) -> IssuanceStatus {
        IssuanceStatus::from(self.status.as_str())
    }

    /// Whether the record still waits for a downstream scan.
    pub fn is_preready(&self) -> bool {
        self.get_status() == IssuanceStatus::Preready
    }
}

/// Values the station writes when it issues a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssuance {
    pub barcode: String,
    pub scanner_id: String,
    pub station_id: String,
    pub scan_timestamp: DateTime<Utc>,
}

impl NewIssuance {
    /// Issuance of `barcode` stamped with the current time.
    pub fn now(
        barcode: impl Into<String>,
        scanner_id: impl Into<String>,
        station_id: impl Into<String>,
    ) -> Self {
        Self {
            barcode: barcode.into(),
            scanner_id: scanner_id.into(),
            station_id: station_id.into(),
            scan_timestamp: Utc::now(),
        }
    }
}
