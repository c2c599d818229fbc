//! Issuance coordinator.
//!
//! Drives one label from serial number to printed, recorded label:
//! validate, evaluate, compose, persist, print. The record is written
//! before anything is printed, and only for a label that was composed.
//!
//! Calls are expected to be operator-paced. Overlapping calls for
//! different serials are safe; for the same serial the store's upsert keeps
//! one row.

use crate::outcome::{ErrorKind, IssuanceOutcome, OperationFailure};
use crate::policy::PolicyHandle;
use crate::printer::PrintSink;
use crate::readiness::{self, NotReadyReason, Readiness, ReadinessMode};
use crate::state::{IssuanceState, IssuanceTrail};
use chrono::{DateTime, Utc};
use labelstation_core::constants::{DEFAULT_PRINTER_ID, DEFAULT_SCANNER_ID, UNKNOWN_STATION_ID};
use labelstation_core::{DeviceType, PolicyField, SerialNumber, ValidationPolicy};
use labelstation_hardware::{DatabaseStatus, DeviceLink, DeviceSnapshot, single_snapshot};
use labelstation_label::{LabelComposer, PageArtifact};
use labelstation_storage::{IssuanceRecord, IssuanceRepository, NewIssuance};
use labelstation_tracking::{ConfirmationSource, ScanConfirmation, TrackedDevice};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Who is issuing: recorded on every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationIdentity {
    /// Host name of the issuing machine.
    pub station_id: String,
    /// Role tag of this writer.
    pub scanner_id: String,
}

impl Default for StationIdentity {
    fn default() -> Self {
        Self {
            station_id: UNKNOWN_STATION_ID.to_string(),
            scanner_id: DEFAULT_SCANNER_ID.to_string(),
        }
    }
}

/// Device fields shown to the operator next to the readiness verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSummary {
    pub handle: String,
    pub serial: Option<String>,
    pub mcu_id: Option<String>,
    pub tests_ok: bool,
    pub calibration_ok: bool,
    pub prog_time: Option<DateTime<Utc>>,
    pub calib_time: Option<DateTime<Utc>>,
    pub db_status: DatabaseStatus,
}

impl From<&DeviceSnapshot> for DeviceSummary {
    fn from(snapshot: &DeviceSnapshot) -> Self {
        Self {
            handle: snapshot.handle.to_string(),
            serial: snapshot.serial.clone(),
            mcu_id: snapshot.mcu_id_hex(),
            tests_ok: snapshot.tests_ok,
            calibration_ok: snapshot.calibration_ok,
            prog_time: snapshot.prog_time_utc(),
            calib_time: snapshot.calib_time_utc(),
            db_status: snapshot.db_status,
        }
    }
}

/// Answer to `readiness_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessStatus {
    pub ready: bool,
    /// `DeviceUnavailable` or `NotReady` when not ready.
    pub kind: Option<ErrorKind>,
    pub message: String,
    pub mode: ReadinessMode,
    pub reasons: Vec<NotReadyReason>,
    pub waived: Vec<NotReadyReason>,
    pub device: Option<DeviceSummary>,
    pub validation_enabled: bool,
    pub print_enabled: bool,
}

impl ReadinessStatus {
    fn unavailable(policy: &ValidationPolicy, reason: String) -> Self {
        Self {
            ready: false,
            kind: Some(ErrorKind::DeviceUnavailable),
            message: format!("Device unavailable: {reason}"),
            mode: ReadinessMode::for_policy(policy),
            reasons: Vec::new(),
            waived: Vec::new(),
            device: None,
            validation_enabled: policy.device_validation_enabled,
            print_enabled: policy.physical_print_enabled,
        }
    }

    fn evaluated(policy: &ValidationPolicy, snapshot: &DeviceSnapshot, readiness: Readiness) -> Self {
        let message = if readiness.ready {
            match readiness.mode {
                ReadinessMode::Full => "Device ready".to_string(),
                ReadinessMode::Relaxed => "Device ready (relaxed validation)".to_string(),
            }
        } else {
            let list: Vec<String> = readiness.reasons.iter().map(ToString::to_string).collect();
            format!("Device not ready: {}", list.join(", "))
        };

        Self {
            ready: readiness.ready,
            kind: (!readiness.ready).then_some(ErrorKind::NotReady),
            message,
            mode: readiness.mode,
            reasons: readiness.reasons,
            waived: readiness.waived,
            device: Some(DeviceSummary::from(snapshot)),
            validation_enabled: policy.device_validation_enabled,
            print_enabled: policy.physical_print_enabled,
        }
    }
}

/// The issuance workflow over its collaborators.
///
/// Collaborators are generic so tests can use mocks; a deployed station uses
/// [`Station`](crate::Station).
pub struct IssuanceCoordinator<L, S, P, C> {
    link: L,
    composer: Arc<LabelComposer>,
    store: S,
    sink: P,
    confirmations: C,
    policy: PolicyHandle,
    identity: StationIdentity,
    printer_id: String,
}

impl<L, S, P, C> IssuanceCoordinator<L, S, P, C>
where
    L: DeviceLink,
    S: IssuanceRepository,
    P: PrintSink,
    C: ConfirmationSource,
{
    pub fn new(link: L, composer: LabelComposer, store: S, sink: P, confirmations: C) -> Self {
        Self {
            link,
            composer: Arc::new(composer),
            store,
            sink,
            confirmations,
            policy: PolicyHandle::default(),
            identity: StationIdentity::default(),
            printer_id: DEFAULT_PRINTER_ID.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: PolicyHandle) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_identity(mut self, identity: StationIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_printer(mut self, printer_id: impl Into<String>) -> Self {
        self.printer_id = printer_id.into();
        self
    }

    pub fn policy(&self) -> &PolicyHandle {
        &self.policy
    }

    pub fn identity(&self) -> &StationIdentity {
        &self.identity
    }

    pub fn printer_id(&self) -> &str {
        &self.printer_id
    }

    pub fn composer(&self) -> &LabelComposer {
        &self.composer
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Read the attached device and apply the readiness gate.
    ///
    /// Zero or several attached devices, or an unreachable hardware link,
    /// report `DeviceUnavailable`, never `NotReady`.
    pub async fn readiness_status(&self) -> ReadinessStatus {
        let policy = self.policy.current();

        match single_snapshot(&self.link).await {
            Ok(snapshot) => {
                let readiness = readiness::evaluate(&snapshot, &policy);
                ReadinessStatus::evaluated(&policy, &snapshot, readiness)
            }
            Err(e) => ReadinessStatus::unavailable(&policy, e.to_string()),
        }
    }

    /// Flip a policy switch and return its new value.
    pub fn toggle_policy(&self, field: PolicyField) -> bool {
        self.policy.toggle(field)
    }

    /// Issue a label for `serial`.
    pub async fn issue_label(&self, serial: &str) -> IssuanceOutcome {
        let mut trail = IssuanceTrail::new();
        self.issue_label_traced(serial, &mut trail).await
    }

    /// Issue a label for `serial`, recording the states passed through in
    /// `trail`.
    pub async fn issue_label_traced(&self, serial: &str, trail: &mut IssuanceTrail) -> IssuanceOutcome {
        let outcome = self.run(serial, trail).await;

        let terminal = match &outcome {
            IssuanceOutcome::Issued { .. } => IssuanceState::Done,
            IssuanceOutcome::InvalidFormat { .. }
            | IssuanceOutcome::DeviceUnavailable { .. }
            | IssuanceOutcome::NotReady { .. } => IssuanceState::Rejected,
            _ => IssuanceState::Failed,
        };
        self.advance(trail, terminal);

        match &outcome {
            IssuanceOutcome::Issued { serial, printed } => {
                info!(serial = %serial, printed, station = %self.identity.station_id, "Label issued");
            }
            other => {
                warn!(kind = ?other.kind(), "Issuance stopped: {}", other.message());
            }
        }

        outcome
    }

    async fn run(&self, raw: &str, trail: &mut IssuanceTrail) -> IssuanceOutcome {
        // Validating
        let serial = match SerialNumber::parse(raw) {
            Ok(serial) => serial,
            Err(_) => {
                return IssuanceOutcome::InvalidFormat {
                    input: raw.trim().to_string(),
                    reason: expected_format(),
                };
            }
        };

        // Evaluating: one policy snapshot for the whole call
        self.advance(trail, IssuanceState::Evaluating);
        let policy = self.policy.current();

        let snapshot = match single_snapshot(&self.link).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                return IssuanceOutcome::DeviceUnavailable {
                    reason: e.to_string(),
                };
            }
        };

        if let Some(reported) = snapshot.serial.as_deref()
            && reported != serial.as_str()
        {
            warn!(serial = %serial, reported, "Entered serial differs from the device-reported one");
        }

        let readiness = readiness::evaluate(&snapshot, &policy);
        if !readiness.ready {
            return IssuanceOutcome::NotReady {
                reasons: readiness.reasons,
            };
        }
        if readiness.mode == ReadinessMode::Relaxed {
            warn!(serial = %serial, waived = ?readiness.waived, "Relaxed validation, issuing without full device checks");
        }

        // Composing
        self.advance(trail, IssuanceState::Composing);
        let artifact = match self.compose(&serial).await {
            Ok(artifact) => artifact,
            Err(error) => {
                error!(serial = %serial, device_type = %serial.device_type(), "Label composition failed: {}", error);
                return IssuanceOutcome::CompositionFailed { serial, error };
            }
        };

        // Persisting
        self.advance(trail, IssuanceState::Persisting);
        if let Err(e) = self.persist(&serial).await {
            error!(serial = %serial, unreachable = e.is_unreachable(), "Issuance not recorded: {}", e);
            return IssuanceOutcome::PersistenceFailed {
                serial,
                error: e.to_string(),
            };
        }

        if !policy.physical_print_enabled {
            info!(serial = %serial, "Physical printing disabled, label not printed");
            return IssuanceOutcome::Issued {
                serial,
                printed: false,
            };
        }

        // Printing
        self.advance(trail, IssuanceState::Printing);
        match self.sink.print_page(&artifact, &self.printer_id).await {
            Ok(()) => IssuanceOutcome::Issued {
                serial,
                printed: true,
            },
            Err(e) => {
                warn!(serial = %serial, printer = %self.printer_id, "Print failed, record kept for reprint: {}", e);
                IssuanceOutcome::PrintFailed {
                    serial,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Composition reads artwork and may run the symbol encoder, so it is
    /// moved off the async workers.
    async fn compose(&self, serial: &SerialNumber) -> Result<PageArtifact, String> {
        let composer = Arc::clone(&self.composer);
        let owned = serial.clone();
        let composed = tokio::task::spawn_blocking(move || {
            composer.compose(owned.as_str(), owned.device_type(), owned.as_str().as_bytes())
        })
        .await
        .map_err(|e| format!("label composition did not finish: {e}"))?;

        composed.map_err(|e| {
            if e.is_internal() {
                format!("internal template error: {e}")
            } else {
                e.to_string()
            }
        })
    }

    async fn persist(&self, serial: &SerialNumber) -> labelstation_storage::StorageResult<IssuanceRecord> {
        let issuance = NewIssuance::now(
            serial.as_str(),
            &self.identity.scanner_id,
            &self.identity.station_id,
        );
        self.store.upsert_preready(&issuance).await
    }

    fn advance(&self, trail: &mut IssuanceTrail, state: IssuanceState) {
        if let Err(e) = trail.transition_to(state) {
            error!("Issuance state machine out of sequence: {}", e);
        }
    }

    /// Whether `barcode` has been scanned downstream.
    pub async fn check_scan_confirmation(&self, barcode: &str) -> Result<ScanConfirmation, OperationFailure> {
        self.confirmations.check_status(barcode.trim()).await.map_err(|e| {
            warn!(barcode, "Confirmation service unavailable: {}", e);
            OperationFailure::new(
                ErrorKind::ConfirmationServiceError,
                format!("confirmation service unavailable: {e}"),
            )
            .retryable(e.is_transient())
        })
    }

    /// Issuances recorded by the store within the last `window_minutes`,
    /// newest first.
    pub async fn list_recent_issuances(
        &self,
        limit: u32,
        window_minutes: u32,
    ) -> Result<Vec<IssuanceRecord>, OperationFailure> {
        self.store
            .list_recent(limit, window_minutes)
            .await
            .map_err(|e| OperationFailure::new(ErrorKind::PersistenceError, e.to_string()))
    }

    /// Recent devices as the confirmation source sees them.
    pub async fn list_tracked_devices(
        &self,
        limit: u32,
        window_minutes: u32,
    ) -> Result<Vec<TrackedDevice>, OperationFailure> {
        self.confirmations
            .list_recent(limit, window_minutes)
            .await
            .map_err(|e| {
                OperationFailure::new(
                    ErrorKind::ConfirmationServiceError,
                    format!("confirmation service unavailable: {e}"),
                )
                .retryable(e.is_transient())
            })
    }
}

fn expected_format() -> String {
    let prefixes: Vec<&str> = DeviceType::ALL.iter().map(|t| t.prefix()).collect();
    format!("expected <PREFIX>-NNNNNN with PREFIX one of {}", prefixes.join(", "))
}
