use chrono::{DateTime, Utc};
use labelstation_core::IssuanceStatus;
use serde::{Deserialize, Serialize};

/// Device record as reported by the tracking service.
///
/// Unknown fields are ignored; everything but the barcode is optional so
/// older service versions still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedDevice {
    pub barcode: String,
    #[serde(default)]
    pub status: Option<IssuanceStatus>,
    #[serde(default, alias = "timestamp")]
    pub scan_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub station_id: Option<String>,
    #[serde(default)]
    pub scanner_id: Option<String>,
}

/// Answer to "has this barcode been scanned downstream?"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfirmation {
    pub scanned: bool,
    pub status: Option<IssuanceStatus>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ScanConfirmation {
    /// No record exists for the barcode.
    pub fn unknown() -> Self {
        Self {
            scanned: false,
            status: None,
            timestamp: None,
        }
    }

    /// Derive the confirmation from a record. A record still in `preready`
    /// has been issued but not scanned.
    pub fn from_device(device: &TrackedDevice) -> Self {
        let scanned = device
            .status
            .as_ref()
            .is_some_and(IssuanceStatus::is_past_preready);

        Self {
            scanned,
            status: device.status.clone(),
            timestamp: device.scan_timestamp,
        }
    }

    /// Scanned and promoted to `ready`; the point where polling stops.
    pub fn is_confirmed(&self) -> bool {
        self.scanned && self.status.as_ref().is_some_and(IssuanceStatus::is_ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn device(status: Option<&str>) -> TrackedDevice {
        TrackedDevice {
            barcode: "RC-103-000123".into(),
            status: status.map(IssuanceStatus::from),
            scan_timestamp: None,
            station_id: None,
            scanner_id: None,
        }
    }

    #[rstest]
    #[case(Some("preready"), false, false)]
    #[case(Some("ready"), true, true)]
    #[case(Some("shipped"), true, false)]
    #[case(None, false, false)]
    fn test_confirmation_from_status(
        #[case] status: Option<&str>,
        #[case] scanned: bool,
        #[case] confirmed: bool,
    ) {
        let confirmation = ScanConfirmation::from_device(&device(status));
        assert_eq!(confirmation.scanned, scanned);
        assert_eq!(confirmation.is_confirmed(), confirmed);
    }

    #[test]
    fn test_unknown_is_not_scanned() {
        let confirmation = ScanConfirmation::unknown();
        assert!(!confirmation.scanned);
        assert!(confirmation.status.is_none());
    }

    #[test]
    fn test_tracked_device_tolerates_sparse_json() {
        let device: TrackedDevice = serde_json::from_value(serde_json::json!({
            "barcode": "RC-110-000001",
            "status": "ready",
            "timestamp": "2026-01-15T12:00:00Z",
            "firmware": "4.1"
        }))
        .unwrap();

        assert_eq!(device.status, Some(IssuanceStatus::Ready));
        assert!(device.scan_timestamp.is_some());
        assert!(device.station_id.is_none());
    }
}
