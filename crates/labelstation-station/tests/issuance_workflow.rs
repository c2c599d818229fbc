//! End-to-end issuance workflow tests
//!
//! The coordinator runs over a mock device link, an in-memory issuance
//! store and a recording print sink, so every side effect can be counted.
//!
//! Run with: cargo test --package labelstation-station --test issuance_workflow

use labelstation_core::{DeviceType, IssuanceStatus, PolicyField};
use labelstation_hardware::mock::{MockDeviceLink, MockDeviceLinkHandle, passing_snapshot};
use labelstation_hardware::{DeviceHandle, DeviceSnapshot};
use labelstation_label::{BaseAssets, LabelComposer, TemplateRegistry};
use labelstation_label::mock::FixedSymbolRenderer;
use labelstation_station::mock::RecordingPrintSink;
use labelstation_station::{
    ErrorKind, IssuanceCoordinator, IssuanceOutcome, IssuanceState, IssuanceTrail, NotReadyReason,
    StationIdentity, StoreConfirmationSource,
};
use labelstation_storage::{Database, IssuanceRepository, SqliteIssuanceRepository};
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type Coordinator = IssuanceCoordinator<
    MockDeviceLink,
    SqliteIssuanceRepository,
    RecordingPrintSink,
    StoreConfirmationSource<SqliteIssuanceRepository>,
>;

struct Harness {
    coordinator: Coordinator,
    device: MockDeviceLinkHandle,
    store: SqliteIssuanceRepository,
    sink: RecordingPrintSink,
    db: Database,
}

async fn harness_with(composer: LabelComposer) -> Harness {
    let db = Database::in_memory().await.unwrap();
    let store = SqliteIssuanceRepository::new(db.pool().clone());
    let sink = RecordingPrintSink::new();
    let (link, device) = MockDeviceLink::new();

    let coordinator = IssuanceCoordinator::new(
        link,
        composer,
        store.clone(),
        sink.clone(),
        StoreConfirmationSource::new(store.clone()),
    )
    .with_identity(StationIdentity {
        station_id: "bench-1".into(),
        scanner_id: "print_label".into(),
    })
    .with_printer("10.0.0.20:9100");

    Harness {
        coordinator,
        device,
        store,
        sink,
        db,
    }
}

async fn harness() -> Harness {
    harness_with(LabelComposer::new(
        TemplateRegistry::builtin(),
        BaseAssets::Blank,
        FixedSymbolRenderer::new(),
    ))
    .await
}

fn uncalibrated(serial: &str) -> DeviceSnapshot {
    DeviceSnapshot {
        handle: DeviceHandle(1),
        mcu_id: None,
        serial: Some(serial.to_string()),
        db_status: labelstation_hardware::DatabaseStatus::Ok,
        tests_ok: true,
        calibration_ok: false,
        prog_time: 100,
        calib_time: 0,
    }
}

#[rstest]
#[case("")]
#[case("RC-104-000123")]
#[case("RC-103-12345")]
#[case("RC-103-1234567")]
#[case("rc-103-000123")]
#[case("RC-103G000123")]
#[case("000123")]
#[tokio::test]
async fn test_invalid_serial_has_no_side_effects(#[case] serial: &str) {
    let h = harness().await;
    h.device.attach(passing_snapshot(1, "RC-103-000123")).await;

    let outcome = h.coordinator.issue_label(serial).await;

    assert_eq!(outcome.kind(), Some(ErrorKind::InvalidFormat));
    assert_eq!(h.store.count().await.unwrap(), 0);
    assert_eq!(h.sink.calls(), 0);
    assert_eq!(h.device.query_count(), 0);
}

#[tokio::test]
async fn test_happy_path_records_and_prints() {
    let h = harness().await;
    h.device.attach(passing_snapshot(1, "RC-103-000123")).await;

    let mut trail = IssuanceTrail::new();
    let outcome = h
        .coordinator
        .issue_label_traced("RC-103-000123", &mut trail)
        .await;

    assert_eq!(
        outcome,
        IssuanceOutcome::Issued {
            serial: "RC-103-000123".parse().unwrap(),
            printed: true
        }
    );
    assert_eq!(
        trail.states(),
        vec![
            IssuanceState::Validating,
            IssuanceState::Evaluating,
            IssuanceState::Composing,
            IssuanceState::Persisting,
            IssuanceState::Printing,
            IssuanceState::Done,
        ]
    );

    let record = h.store.find_by_barcode("RC-103-000123").await.unwrap().unwrap();
    assert!(record.is_preready());
    assert_eq!(record.station_id, "bench-1");
    assert_eq!(record.scanner_id, "print_label");

    let jobs = h.sink.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].printer_id, "10.0.0.20:9100");
    assert!(jobs[0].has_symbol);
}

#[tokio::test]
async fn test_reissue_keeps_one_row_and_advances_timestamp() {
    let h = harness().await;
    h.device.attach(passing_snapshot(1, "RC-110-000042")).await;

    assert!(h.coordinator.issue_label("RC-110-000042").await.is_success());
    let first = h.store.find_by_barcode("RC-110-000042").await.unwrap().unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;

    assert!(h.coordinator.issue_label("RC-110-000042").await.is_success());
    let second = h.store.find_by_barcode("RC-110-000042").await.unwrap().unwrap();

    assert_eq!(h.store.count().await.unwrap(), 1);
    assert_eq!(first.id, second.id);
    assert!(second.scan_timestamp > first.scan_timestamp);
    assert_eq!(h.sink.calls(), 2);
}

#[tokio::test]
async fn test_readiness_reports_calibration_failures() {
    let h = harness().await;
    h.device.attach(uncalibrated("RC-103-000123")).await;

    let status = h.coordinator.readiness_status().await;

    assert!(!status.ready);
    assert_eq!(status.kind, Some(ErrorKind::NotReady));
    assert!(status.validation_enabled);
    assert!(status.reasons.contains(&NotReadyReason::CalibrationFailed));
    assert!(status.reasons.contains(&NotReadyReason::CalibrationTimeMissing));
    assert!(!status.reasons.contains(&NotReadyReason::TestsFailed));
    assert_eq!(status.device.as_ref().unwrap().serial.as_deref(), Some("RC-103-000123"));
}

#[tokio::test]
async fn test_relaxed_validation_passes_uncalibrated_device() {
    let h = harness().await;
    h.device.attach(uncalibrated("RC-103-000123")).await;

    assert!(!h.coordinator.toggle_policy(PolicyField::DeviceValidation));

    let status = h.coordinator.readiness_status().await;
    assert!(status.ready);
    assert!(!status.validation_enabled);
    assert_eq!(status.waived.len(), 2);

    assert!(h.coordinator.issue_label("RC-103-000123").await.is_success());
}

#[tokio::test]
async fn test_not_ready_device_is_not_recorded() {
    let h = harness().await;
    h.device.attach(uncalibrated("RC-103-000123")).await;

    let outcome = h.coordinator.issue_label("RC-103-000123").await;

    match &outcome {
        IssuanceOutcome::NotReady { reasons } => assert_eq!(reasons.len(), 2),
        other => panic!("expected NotReady, got {other:?}"),
    }
    assert_eq!(h.store.count().await.unwrap(), 0);
    assert_eq!(h.sink.calls(), 0);
}

#[rstest]
#[case(0)]
#[case(2)]
#[tokio::test]
async fn test_device_count_other_than_one_is_unavailable(#[case] devices: u64) {
    let h = harness().await;
    for handle in 1..=devices {
        h.device.attach(passing_snapshot(handle, "RC-103-000123")).await;
    }

    let status = h.coordinator.readiness_status().await;
    assert!(!status.ready);
    assert_eq!(status.kind, Some(ErrorKind::DeviceUnavailable));
    assert!(status.device.is_none());

    let outcome = h.coordinator.issue_label("RC-103-000123").await;
    assert_eq!(outcome.kind(), Some(ErrorKind::DeviceUnavailable));
    assert_eq!(h.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unreachable_hardware_is_unavailable_not_not_ready() {
    let h = harness().await;
    h.device.attach(passing_snapshot(1, "RC-103-000123")).await;
    h.device.set_unreachable(Some("helper not found")).await;

    let outcome = h.coordinator.issue_label("RC-103-000123").await;
    assert_eq!(outcome.kind(), Some(ErrorKind::DeviceUnavailable));
    assert!(outcome.message().contains("helper not found"));
}

#[tokio::test]
async fn test_persistence_failure_never_prints() {
    let h = harness().await;
    h.device.attach(passing_snapshot(1, "RC-102-000001")).await;
    h.db.close().await;

    let mut trail = IssuanceTrail::new();
    let outcome = h
        .coordinator
        .issue_label_traced("RC-102-000001", &mut trail)
        .await;

    assert_eq!(outcome.kind(), Some(ErrorKind::PersistenceError));
    assert!(!outcome.recorded());
    assert_eq!(h.sink.calls(), 0);
    assert_eq!(trail.current_state(), IssuanceState::Failed);
    assert!(!trail.states().contains(&IssuanceState::Printing));
}

#[tokio::test]
async fn test_print_failure_keeps_preready_record() {
    let h = harness().await;
    h.device.attach(passing_snapshot(1, "RC-102-000001")).await;
    h.sink.set_failure(Some("paper out".into()));

    let outcome = h.coordinator.issue_label("RC-102-000001").await;

    assert_eq!(outcome.kind(), Some(ErrorKind::PrintError));
    assert_eq!(outcome.to_response().hint.as_deref(), Some("retry printing"));
    assert!(!outcome.printed());

    let recent = h.coordinator.list_recent_issuances(10, 60).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].barcode, "RC-102-000001");
    assert!(recent[0].is_preready());
}

#[rstest]
#[case("RC-103-000123", DeviceType::Rc103)]
#[case("RC-103G-000123", DeviceType::Rc103G)]
#[tokio::test]
async fn test_template_follows_serial_prefix(#[case] serial: &str, #[case] device_type: DeviceType) {
    let h = harness().await;
    h.device.attach(passing_snapshot(1, serial)).await;

    assert!(h.coordinator.issue_label(serial).await.is_success());
    assert_eq!(h.sink.jobs()[0].device_type, device_type);
}

#[tokio::test]
async fn test_dry_run_records_once_without_printing() {
    let h = harness().await;
    h.device.attach(passing_snapshot(1, "RC-110-000001")).await;
    h.coordinator.toggle_policy(PolicyField::PhysicalPrint);

    let mut trail = IssuanceTrail::new();
    let outcome = h
        .coordinator
        .issue_label_traced("RC-110-000001", &mut trail)
        .await;

    assert!(outcome.is_success());
    assert!(!outcome.printed());
    assert!(!outcome.to_response().printed);
    assert_eq!(h.store.count().await.unwrap(), 1);
    assert_eq!(h.sink.calls(), 0);
    assert!(!trail.states().contains(&IssuanceState::Printing));
}

#[tokio::test]
async fn test_composition_failure_is_not_recorded() {
    let assets = tempfile::tempdir().unwrap();
    let h = harness_with(LabelComposer::new(
        TemplateRegistry::builtin(),
        BaseAssets::directory(assets.path()),
        FixedSymbolRenderer::new(),
    ))
    .await;
    h.device.attach(passing_snapshot(1, "RC-102-000001")).await;

    let outcome = h.coordinator.issue_label("RC-102-000001").await;

    assert_eq!(outcome.kind(), Some(ErrorKind::CompositionError));
    assert!(outcome.message().contains("templ_102.png"));
    assert_eq!(h.store.count().await.unwrap(), 0);
    assert_eq!(h.sink.calls(), 0);
}

#[tokio::test]
async fn test_missing_symbol_encoder_still_issues() {
    let h = harness_with(LabelComposer::new(
        TemplateRegistry::builtin(),
        BaseAssets::Blank,
        labelstation_label::UnavailableRenderer,
    ))
    .await;
    h.device.attach(passing_snapshot(1, "RC-102-000001")).await;

    assert!(h.coordinator.issue_label("RC-102-000001").await.is_success());
    assert!(!h.sink.jobs()[0].has_symbol);
}

#[tokio::test(flavor = "current_thread")]
async fn test_slow_symbol_encoder_leaves_the_runtime_running() {
    let h = harness_with(LabelComposer::new(
        TemplateRegistry::builtin(),
        BaseAssets::Blank,
        FixedSymbolRenderer::new().with_delay(Duration::from_millis(300)),
    ))
    .await;
    h.device.attach(passing_snapshot(1, "RC-102-000001")).await;

    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ticks);
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(10));
        loop {
            interval.tick().await;
            counter.fetch_add(1, Ordering::Relaxed);
        }
    });

    assert!(h.coordinator.issue_label("RC-102-000001").await.is_success());
    ticker.abort();

    assert!(ticks.load(Ordering::Relaxed) >= 5, "ticks: {}", ticks.load(Ordering::Relaxed));
}

#[tokio::test]
async fn test_scan_confirmation_follows_store() {
    let h = harness().await;
    h.device.attach(passing_snapshot(1, "RC-103-000123")).await;
    h.coordinator.issue_label("RC-103-000123").await;

    let pending = h.coordinator.check_scan_confirmation("RC-103-000123").await.unwrap();
    assert!(!pending.scanned);

    h.store
        .update_status("RC-103-000123", &IssuanceStatus::Ready)
        .await
        .unwrap();

    let confirmed = h.coordinator.check_scan_confirmation("RC-103-000123").await.unwrap();
    assert!(confirmed.scanned);
    assert!(confirmed.is_confirmed());

    let unknown = h.coordinator.check_scan_confirmation("RC-102-999999").await.unwrap();
    assert!(!unknown.scanned);
}

#[tokio::test]
async fn test_confirmation_outage_is_distinct_from_not_scanned() {
    let h = harness().await;
    h.db.close().await;

    let failure = h
        .coordinator
        .check_scan_confirmation("RC-103-000123")
        .await
        .unwrap_err();
    assert_eq!(failure.kind, ErrorKind::ConfirmationServiceError);
    assert_eq!(failure.hint(), "check connectivity");
}
