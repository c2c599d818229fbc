//! Point-in-time device state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an attached device, unique among attached devices.
///
/// Displayed in the `0x...` form the helper executable expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceHandle(pub u64);

impl DeviceHandle {
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// Result code of the device's production-database query.
///
/// Codes are defined by the device vendor library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseStatus {
    Ok,
    InvalidParam,
    General,
    NoDevice,
    SerialMismatch,
    CalibData,
    Unknown(i32),
}

impl DatabaseStatus {
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => DatabaseStatus::Ok,
            1 => DatabaseStatus::InvalidParam,
            2 => DatabaseStatus::General,
            3 => DatabaseStatus::NoDevice,
            4 => DatabaseStatus::SerialMismatch,
            5 => DatabaseStatus::CalibData,
            other => DatabaseStatus::Unknown(other),
        }
    }

    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            DatabaseStatus::Ok => 0,
            DatabaseStatus::InvalidParam => 1,
            DatabaseStatus::General => 2,
            DatabaseStatus::NoDevice => 3,
            DatabaseStatus::SerialMismatch => 4,
            DatabaseStatus::CalibData => 5,
            DatabaseStatus::Unknown(code) => *code,
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, DatabaseStatus::Ok)
    }

    /// Short operator-facing description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            DatabaseStatus::Ok => "ok",
            DatabaseStatus::InvalidParam => "invalid parameter",
            DatabaseStatus::General => "general database error",
            DatabaseStatus::NoDevice => "device not found in database",
            DatabaseStatus::SerialMismatch => "serial number mismatch",
            DatabaseStatus::CalibData => "calibration data error",
            DatabaseStatus::Unknown(_) => "unknown database error",
        }
    }
}

impl fmt::Display for DatabaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

/// Readiness-relevant state reported by one attached device.
///
/// Produced fresh on every query and never stored. When `db_status` is not
/// [`DatabaseStatus::Ok`] the flags and timestamps could not be read and are
/// reported as `false`/`0`.
///
/// # Examples
///
/// ```
/// use labelstation_hardware::{DatabaseStatus, DeviceHandle, DeviceSnapshot};
///
/// let snapshot = DeviceSnapshot {
///     handle: DeviceHandle(0x1A),
///     mcu_id: Some(vec![0x0A, 0xFF]),
///     serial: Some("RC-110-000001".to_string()),
///     db_status: DatabaseStatus::Ok,
///     tests_ok: true,
///     calibration_ok: false,
///     prog_time: 100,
///     calib_time: 0,
/// };
///
/// assert!(snapshot.prog_time_set());
/// assert!(!snapshot.calib_time_set());
/// assert_eq!(snapshot.mcu_id_hex().as_deref(), Some("0A FF"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Handle the snapshot was read from.
    pub handle: DeviceHandle,

    /// Hardware fingerprint, if the device reported one.
    pub mcu_id: Option<Vec<u8>>,

    /// Device-reported serial number, if the device reported one.
    pub serial: Option<String>,

    /// Outcome of the production-database query behind the flags below.
    pub db_status: DatabaseStatus,

    /// Production tests passed.
    pub tests_ok: bool,

    /// Calibration passed.
    pub calibration_ok: bool,

    /// Programming time, unix seconds. Zero means not set.
    pub prog_time: i64,

    /// Calibration time, unix seconds. Zero means not set.
    pub calib_time: i64,
}

impl DeviceSnapshot {
    /// Build a snapshot from a raw database record, clearing the flags when
    /// the query itself failed.
    #[must_use]
    pub fn from_db_record(
        handle: DeviceHandle,
        mcu_id: Option<Vec<u8>>,
        serial: Option<String>,
        record: DbRecord,
    ) -> Self {
        let db_status = DatabaseStatus::from_code(record.result);
        let trusted = db_status.is_ok();

        Self {
            handle,
            mcu_id,
            serial,
            db_status,
            tests_ok: trusted && record.tests_ok,
            calibration_ok: trusted && record.calibration_ok,
            prog_time: if trusted { record.prog_time } else { 0 },
            calib_time: if trusted { record.calib_time } else { 0 },
        }
    }

    #[must_use]
    pub fn prog_time_set(&self) -> bool {
        self.prog_time > 0
    }

    #[must_use]
    pub fn calib_time_set(&self) -> bool {
        self.calib_time > 0
    }

    /// Programming time as a UTC timestamp, when set.
    #[must_use]
    pub fn prog_time_utc(&self) -> Option<DateTime<Utc>> {
        unix_to_utc(self.prog_time)
    }

    /// Calibration time as a UTC timestamp, when set.
    #[must_use]
    pub fn calib_time_utc(&self) -> Option<DateTime<Utc>> {
        unix_to_utc(self.calib_time)
    }

    /// Fingerprint as space separated upper-case hex bytes.
    #[must_use]
    pub fn mcu_id_hex(&self) -> Option<String> {
        self.mcu_id.as_ref().map(|bytes| {
            bytes
                .iter()
                .map(|b| format!("{b:02X}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
    }
}

/// Raw production-database record as reported by the device library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DbRecord {
    pub result: i32,
    #[serde(default, deserialize_with = "flag")]
    pub tests_ok: bool,
    #[serde(default, deserialize_with = "flag")]
    pub calibration_ok: bool,
    #[serde(default)]
    pub prog_time: i64,
    #[serde(default)]
    pub calib_time: i64,
}

/// Accept both JSON booleans and the library's 0/1 integers.
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}

fn unix_to_utc(secs: i64) -> Option<DateTime<Utc>> {
    if secs > 0 {
        DateTime::from_timestamp(secs, 0)
    } else {
        None
    }
}
