//! # Check and Watch Subcommands
//!
//! Scan confirmation from the operator's side. `check` asks once; `watch`
//! keeps asking on an interval until the label is scanned and marked ready,
//! the optional timeout runs out, or the operator presses Ctrl-C.
//!
//! Polling is best effort. A confirmation service outage is reported on
//! each attempt and polling carries on; a refused query ends the watch.

use anyhow::Result;
use clap::Args;
use labelstation_station::{Station, station};
use labelstation_tracking::ScanConfirmation;
use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{Context, EXIT_FAILED, EXIT_INTERRUPTED, EXIT_OK, Output, render};

/// Arguments for the `labelstation check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Barcode (serial number) printed on the label.
    #[arg(value_name = "BARCODE")]
    pub barcode: String,
}

/// Arguments for the `labelstation watch` subcommand.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Barcode (serial number) printed on the label.
    #[arg(value_name = "BARCODE")]
    pub barcode: String,

    /// Seconds between checks.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Give up after this many seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Execute the check subcommand.
///
/// Returns 0 when the service answered, 2 when it could not be reached.
pub async fn run_check(args: &CheckArgs, ctx: &Context) -> Result<u8> {
    let (station, db) = station::open(&ctx.config).await?;
    let result = station.check_scan_confirmation(&args.barcode).await;
    db.close().await;

    let mut out = io::stdout();
    match result {
        Ok(confirmation) => {
            ctx.output.emit(&mut out, &confirmation, || {
                render::confirmation(&args.barcode, &confirmation)
            })?;
            Ok(EXIT_OK)
        }
        Err(failure) => {
            ctx.output
                .emit(&mut out, &failure, || render::failure(&failure))?;
            Ok(EXIT_FAILED)
        }
    }
}

/// Execute the watch subcommand.
///
/// Returns 0 once confirmed, 2 on timeout or a refused query, 130 when
/// cancelled.
pub async fn run_watch(args: &WatchArgs, ctx: &Context) -> Result<u8> {
    let (station, db) = station::open(&ctx.config).await?;

    let code = watch_until(
        &station,
        &args.barcode,
        Duration::from_secs(args.interval),
        args.timeout.map(Duration::from_secs),
        interrupted(),
        ctx.output,
        &mut io::stdout(),
    )
    .await;

    db.close().await;
    code
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Poll `barcode` every `interval` until it is confirmed, `timeout` has
/// passed, or `cancel` resolves.
///
/// In text mode every change of the answer is written to `out`; in JSON mode
/// only the final answer is.
pub async fn watch_until<F, W>(
    station: &Station,
    barcode: &str,
    interval: Duration,
    timeout: Option<Duration>,
    cancel: F,
    output: Output,
    out: &mut W,
) -> Result<u8>
where
    F: Future<Output = ()>,
    W: Write,
{
    let deadline = timeout.map(|t| Instant::now() + t);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(cancel);

    let mut last: Option<ScanConfirmation> = None;
    info!(barcode, interval_ms = interval.as_millis() as u64, "Watching for scan confirmation");

    loop {
        tokio::select! {
            biased;
            _ = &mut cancel => {
                info!(barcode, "Watch cancelled");
                return Ok(EXIT_INTERRUPTED);
            }
            _ = ticker.tick() => {}
        }

        match station.check_scan_confirmation(barcode).await {
            Ok(confirmation) if confirmation.is_confirmed() => {
                info!(barcode, "Label scan confirmed");
                output.emit(out, &confirmation, || {
                    render::confirmation(barcode, &confirmation)
                })?;
                return Ok(EXIT_OK);
            }
            Ok(confirmation) => {
                debug!(barcode, scanned = confirmation.scanned, "Not confirmed yet");
                if !output.is_json() && last.as_ref() != Some(&confirmation) {
                    writeln!(out, "{}", render::confirmation(barcode, &confirmation))?;
                }
                last = Some(confirmation);
            }
            Err(failure) if !failure.retryable => {
                warn!(barcode, "Confirmation service refused the query, not retrying");
                output.emit(out, &failure, || render::failure(&failure))?;
                return Ok(EXIT_FAILED);
            }
            Err(failure) => {
                if !output.is_json() {
                    writeln!(out, "{}, retrying", failure.message)?;
                }
            }
        }

        if deadline.is_some_and(|d| Instant::now() >= d) {
            warn!(barcode, "Gave up waiting for scan confirmation");
            let last = last.unwrap_or_else(ScanConfirmation::unknown);
            output.emit(out, &last, || format!("{barcode}: not confirmed before the timeout"))?;
            return Ok(EXIT_FAILED);
        }
    }
}
