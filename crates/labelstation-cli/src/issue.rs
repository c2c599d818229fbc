//! # Status and Issue Subcommands
//!
//! `status` reads the attached device and reports the readiness verdict.
//! `issue` runs one label through the station: validate, evaluate, compose,
//! record, print.

use anyhow::Result;
use clap::Args;
use labelstation_core::PolicyField;
use labelstation_station::{IssuanceTrail, station};
use std::io;
use tracing::debug;

use crate::{Context, EXIT_FAILED, EXIT_OK, render};

/// Arguments for the `labelstation issue` subcommand.
#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Serial number, e.g. RC-103-000123.
    #[arg(value_name = "SERIAL")]
    pub serial: String,

    /// Record the issuance without printing.
    #[arg(long)]
    pub no_print: bool,

    /// Skip the calibration and timestamp checks for this issuance.
    #[arg(long)]
    pub relaxed: bool,
}

/// Execute the status subcommand.
///
/// Returns 0 when the device is ready, 2 otherwise.
pub async fn run_status(ctx: &Context) -> Result<u8> {
    let (station, db) = station::open(&ctx.config).await?;
    let status = station.readiness_status().await;
    db.close().await;

    ctx.output
        .emit(&mut io::stdout(), &status, || render::readiness(&status))?;

    Ok(if status.ready { EXIT_OK } else { EXIT_FAILED })
}

/// Execute the issue subcommand.
///
/// Returns 0 when the label was issued, 2 otherwise.
pub async fn run_issue(args: &IssueArgs, ctx: &Context) -> Result<u8> {
    let (station, db) = station::open(&ctx.config).await?;

    if args.no_print {
        station.policy().set(PolicyField::PhysicalPrint, false);
    }
    if args.relaxed {
        station.policy().set(PolicyField::DeviceValidation, false);
    }

    let mut trail = IssuanceTrail::new();
    let outcome = station.issue_label_traced(&args.serial, &mut trail).await;
    db.close().await;

    debug!(
        states = ?trail.states(),
        elapsed_ms = trail.elapsed().as_millis() as u64,
        "Issuance finished"
    );

    ctx.output.emit(&mut io::stdout(), &outcome.to_response(), || {
        render::outcome(&outcome)
    })?;

    Ok(if outcome.is_success() { EXIT_OK } else { EXIT_FAILED })
}
