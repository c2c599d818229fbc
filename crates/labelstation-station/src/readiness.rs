//! Readiness gate.
//!
//! [`evaluate`] decides whether the attached device may receive a label.
//! It is a pure function of the snapshot and the policy in force.
//!
//! # Modes
//!
//! - **Full** (`device_validation_enabled`): tests passed, calibration
//!   passed, programming time set and calibration time set.
//! - **Relaxed** (bench testing): only tests passed. The other conditions
//!   are still checked and reported as waived, never silently dropped.
//!
//! A failed production-database query is never waived: without it none of
//! the flags can be trusted.

use labelstation_core::ValidationPolicy;
use labelstation_hardware::{DatabaseStatus, DeviceSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which set of conditions was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessMode {
    Full,
    Relaxed,
}

impl ReadinessMode {
    pub fn for_policy(policy: &ValidationPolicy) -> Self {
        if policy.device_validation_enabled {
            ReadinessMode::Full
        } else {
            ReadinessMode::Relaxed
        }
    }
}

/// One failed readiness condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotReadyReason {
    TestsFailed,
    CalibrationFailed,
    ProgrammingTimeMissing,
    CalibrationTimeMissing,
    DatabaseQueryFailed(DatabaseStatus),
}

impl NotReadyReason {
    /// Stable identifier for logs and JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            NotReadyReason::TestsFailed => "tests_failed",
            NotReadyReason::CalibrationFailed => "calibration_failed",
            NotReadyReason::ProgrammingTimeMissing => "prog_time_missing",
            NotReadyReason::CalibrationTimeMissing => "calib_time_missing",
            NotReadyReason::DatabaseQueryFailed(_) => "database_query_failed",
        }
    }
}

impl fmt::Display for NotReadyReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NotReadyReason::TestsFailed => write!(f, "device tests not passed"),
            NotReadyReason::CalibrationFailed => write!(f, "calibration not passed"),
            NotReadyReason::ProgrammingTimeMissing => write!(f, "programming time not set"),
            NotReadyReason::CalibrationTimeMissing => write!(f, "calibration time not set"),
            NotReadyReason::DatabaseQueryFailed(status) => {
                write!(f, "device database query failed: {status}")
            }
        }
    }
}

/// Result of the readiness gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    pub ready: bool,
    pub mode: ReadinessMode,
    /// Conditions that block issuance.
    pub reasons: Vec<NotReadyReason>,
    /// Conditions that failed but were not required in relaxed mode.
    pub waived: Vec<NotReadyReason>,
}

/// Evaluate `snapshot` under `policy`.
///
/// # Examples
///
/// ```
/// use labelstation_core::ValidationPolicy;
/// use labelstation_hardware::mock::passing_snapshot;
/// use labelstation_station::readiness::evaluate;
///
/// let mut snapshot = passing_snapshot(1, "RC-102-000001");
/// assert!(evaluate(&snapshot, &ValidationPolicy::default()).ready);
///
/// snapshot.calib_time = 0;
/// let readiness = evaluate(&snapshot, &ValidationPolicy::default());
/// assert!(!readiness.ready);
/// assert_eq!(readiness.reasons.len(), 1);
/// ```
pub fn evaluate(snapshot: &DeviceSnapshot, policy: &ValidationPolicy) -> Readiness {
    let mode = ReadinessMode::for_policy(policy);

    let mut reasons = Vec::new();
    let mut waived = Vec::new();

    if !snapshot.db_status.is_ok() {
        reasons.push(NotReadyReason::DatabaseQueryFailed(snapshot.db_status));
    }

    if !snapshot.tests_ok {
        reasons.push(NotReadyReason::TestsFailed);
    }

    let full_only = [
        (snapshot.calibration_ok, NotReadyReason::CalibrationFailed),
        (snapshot.prog_time_set(), NotReadyReason::ProgrammingTimeMissing),
        (snapshot.calib_time_set(), NotReadyReason::CalibrationTimeMissing),
    ];

    for (passed, reason) in full_only {
        if passed {
            continue;
        }
        match mode {
            ReadinessMode::Full => reasons.push(reason),
            ReadinessMode::Relaxed => waived.push(reason),
        }
    }

    Readiness {
        ready: reasons.is_empty(),
        mode,
        reasons,
        waived,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelstation_core::PolicyField;
    use labelstation_hardware::DeviceHandle;
    use rstest::rstest;

    fn snapshot(tests_ok: bool, calibration_ok: bool, prog_time: i64, calib_time: i64) -> DeviceSnapshot {
        DeviceSnapshot {
            handle: DeviceHandle(1),
            mcu_id: None,
            serial: Some("RC-103-000123".into()),
            db_status: DatabaseStatus::Ok,
            tests_ok,
            calibration_ok,
            prog_time,
            calib_time,
        }
    }

    fn relaxed() -> ValidationPolicy {
        ValidationPolicy::default().with(PolicyField::DeviceValidation, false)
    }

    #[rstest]
    #[case(true, true, 100, 200, true)]
    #[case(false, true, 100, 200, false)]
    #[case(true, false, 100, 200, false)]
    #[case(true, true, 0, 200, false)]
    #[case(true, true, 100, 0, false)]
    #[case(false, false, 0, 0, false)]
    fn test_full_mode_requires_all_conditions(
        #[case] tests_ok: bool,
        #[case] calibration_ok: bool,
        #[case] prog_time: i64,
        #[case] calib_time: i64,
        #[case] ready: bool,
    ) {
        let readiness = evaluate(
            &snapshot(tests_ok, calibration_ok, prog_time, calib_time),
            &ValidationPolicy::default(),
        );
        assert_eq!(readiness.ready, ready);
        assert_eq!(readiness.mode, ReadinessMode::Full);
        assert!(readiness.waived.is_empty());
    }

    #[rstest]
    #[case(true, false, 0, 0, true)]
    #[case(true, true, 100, 200, true)]
    #[case(false, true, 100, 200, false)]
    fn test_relaxed_mode_requires_only_tests(
        #[case] tests_ok: bool,
        #[case] calibration_ok: bool,
        #[case] prog_time: i64,
        #[case] calib_time: i64,
        #[case] ready: bool,
    ) {
        let readiness = evaluate(&snapshot(tests_ok, calibration_ok, prog_time, calib_time), &relaxed());
        assert_eq!(readiness.ready, ready);
        assert_eq!(readiness.mode, ReadinessMode::Relaxed);
    }

    #[test]
    fn test_uncalibrated_device_reasons_are_itemized() {
        let readiness = evaluate(&snapshot(true, false, 100, 0), &ValidationPolicy::default());

        assert!(!readiness.ready);
        assert_eq!(
            readiness.reasons,
            vec![
                NotReadyReason::CalibrationFailed,
                NotReadyReason::CalibrationTimeMissing
            ]
        );
    }

    #[test]
    fn test_relaxed_mode_reports_waived_conditions() {
        let readiness = evaluate(&snapshot(true, false, 100, 0), &relaxed());

        assert!(readiness.ready);
        assert!(readiness.reasons.is_empty());
        assert_eq!(
            readiness.waived,
            vec![
                NotReadyReason::CalibrationFailed,
                NotReadyReason::CalibrationTimeMissing
            ]
        );
    }

    #[rstest]
    #[case(ValidationPolicy::default())]
    #[case(relaxed())]
    fn test_database_failure_is_never_waived(#[case] policy: ValidationPolicy) {
        let mut device = snapshot(false, false, 0, 0);
        device.db_status = DatabaseStatus::SerialMismatch;

        let readiness = evaluate(&device, &policy);
        assert!(!readiness.ready);
        assert_eq!(
            readiness.reasons[0],
            NotReadyReason::DatabaseQueryFailed(DatabaseStatus::SerialMismatch)
        );
    }

    #[test]
    fn test_reason_display_and_code() {
        let reason = NotReadyReason::DatabaseQueryFailed(DatabaseStatus::CalibData);
        assert_eq!(reason.code(), "database_query_failed");
        assert_eq!(
            reason.to_string(),
            "device database query failed: calibration data error (5)"
        );
        assert_eq!(NotReadyReason::CalibrationTimeMissing.to_string(), "calibration time not set");
    }
}
