//! # Recent Subcommand
//!
//! Labels issued in a recent time window, newest first. With `--tracked`
//! the list comes from the confirmation source instead of the local store,
//! showing what the downstream scanners have seen.

use anyhow::Result;
use clap::Args;
use labelstation_station::station;
use std::io;

use crate::{Context, EXIT_FAILED, EXIT_OK, render};

/// Arguments for the `labelstation recent` subcommand.
#[derive(Args, Debug)]
pub struct RecentArgs {
    /// Maximum number of labels listed.
    #[arg(long, default_value_t = 10)]
    pub limit: u32,

    /// Only labels issued within this many minutes.
    #[arg(long, default_value_t = 60)]
    pub window: u32,

    /// Ask the confirmation source instead of the local store.
    #[arg(long)]
    pub tracked: bool,
}

/// Execute the recent subcommand.
pub async fn run_recent(args: &RecentArgs, ctx: &Context) -> Result<u8> {
    let (station, db) = station::open(&ctx.config).await?;
    let mut out = io::stdout();

    let result = if args.tracked {
        station
            .list_tracked_devices(args.limit, args.window)
            .await
            .map(|devices| ctx.output.emit(&mut out, &devices, || render::tracked(&devices)))
    } else {
        station
            .list_recent_issuances(args.limit, args.window)
            .await
            .map(|records| ctx.output.emit(&mut out, &records, || render::records(&records)))
    };
    db.close().await;

    match result {
        Ok(written) => {
            written?;
            Ok(EXIT_OK)
        }
        Err(failure) => {
            ctx.output
                .emit(&mut out, &failure, || render::failure(&failure))?;
            Ok(EXIT_FAILED)
        }
    }
}
