//! Text rendering of station answers.

use chrono::{DateTime, Local, Utc};
use labelstation_label::{BaseAssets, LabelTemplate};
use labelstation_station::{IssuanceOutcome, OperationFailure, ReadinessStatus};
use labelstation_storage::IssuanceRecord;
use labelstation_tracking::{ScanConfirmation, TrackedDevice};
use std::fmt::Write;

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn pass_fail(flag: bool) -> &'static str {
    if flag { "passed" } else { "FAILED" }
}

fn timestamp(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(time) => time.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "not set".to_string(),
    }
}

pub fn readiness(status: &ReadinessStatus) -> String {
    let mut text = status.message.clone();

    if let Some(device) = &status.device {
        let _ = write!(
            text,
            "\n  device:      {} (handle {})",
            device.serial.as_deref().unwrap_or("no serial"),
            device.handle
        );
        if let Some(mcu) = &device.mcu_id {
            let _ = write!(text, "\n  mcu id:      {mcu}");
        }
        let _ = write!(text, "\n  tests:       {}", pass_fail(device.tests_ok));
        let _ = write!(text, "\n  calibration: {}", pass_fail(device.calibration_ok));
        let _ = write!(text, "\n  programmed:  {}", timestamp(device.prog_time));
        let _ = write!(text, "\n  calibrated:  {}", timestamp(device.calib_time));
        let _ = write!(text, "\n  database:    {}", device.db_status);
    }

    if !status.waived.is_empty() {
        let waived: Vec<String> = status.waived.iter().map(ToString::to_string).collect();
        let _ = write!(text, "\n  waived:      {}", waived.join(", "));
    }

    let _ = write!(
        text,
        "\n  validation {}, printing {}",
        on_off(status.validation_enabled),
        on_off(status.print_enabled)
    );

    if let Some(kind) = status.kind {
        let _ = write!(text, "\n  -> {}", kind.operator_hint());
    }

    text
}

pub fn outcome(outcome: &IssuanceOutcome) -> String {
    match outcome.kind() {
        Some(kind) => format!("{}\n  -> {}", outcome.message(), kind.operator_hint()),
        None => outcome.message(),
    }
}

pub fn failure(failure: &OperationFailure) -> String {
    format!("{}\n  -> {}", failure.message, failure.hint())
}

pub fn confirmation(barcode: &str, confirmation: &ScanConfirmation) -> String {
    match (&confirmation.status, confirmation.scanned) {
        (None, _) => format!("{barcode}: no record"),
        (Some(status), true) => format!(
            "{barcode}: scanned, status {status} at {}",
            timestamp(confirmation.timestamp)
        ),
        (Some(status), false) => format!("{barcode}: not scanned yet (status {status})"),
    }
}

pub fn records(records: &[IssuanceRecord]) -> String {
    if records.is_empty() {
        return "No labels issued in this window".to_string();
    }

    let mut text = format!("{:<19}  {:<16}  {:<9}  {}", "ISSUED", "SERIAL", "STATUS", "STATION");
    for record in records {
        let _ = write!(
            text,
            "\n{:<19}  {:<16}  {:<9}  {}",
            timestamp(Some(record.scan_timestamp)),
            record.barcode,
            record.status,
            record.station_id
        );
    }
    text
}

pub fn tracked(devices: &[TrackedDevice]) -> String {
    if devices.is_empty() {
        return "No devices tracked in this window".to_string();
    }

    let mut text = format!("{:<19}  {:<16}  {:<9}  {}", "SEEN", "SERIAL", "STATUS", "STATION");
    for device in devices {
        let status = device
            .status
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        let _ = write!(
            text,
            "\n{:<19}  {:<16}  {:<9}  {}",
            timestamp(device.scan_timestamp),
            device.barcode,
            status,
            device.station_id.as_deref().unwrap_or("-")
        );
    }
    text
}

pub fn template(template: &LabelTemplate, assets: &BaseAssets) -> String {
    let asset = match assets.path_for(template) {
        Some(path) if path.is_file() => path.display().to_string(),
        Some(path) => format!("{} (missing)", path.display()),
        None => format!("{} (blank stock)", template.base_asset),
    };
    let symbol = &template.symbol;

    format!(
        "{:<8} {} x {} mm, {} fields, symbol {} mm at ({}, {}), base {}",
        template.device_type.prefix(),
        template.page.width_mm,
        template.page.height_mm,
        template.fields.len(),
        symbol.size_mm,
        symbol.x_mm,
        symbol.y_mm,
        asset
    )
}
