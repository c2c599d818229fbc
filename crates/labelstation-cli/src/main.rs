//! # labelstation CLI entry point
//!
//! Parses command-line arguments, loads the station configuration and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use labelstation_cli::confirm::{CheckArgs, WatchArgs, run_check, run_watch};
use labelstation_cli::issue::{IssueArgs, run_issue, run_status};
use labelstation_cli::recent::{RecentArgs, run_recent};
use labelstation_cli::session::run_session;
use labelstation_cli::templates::{PreviewArgs, run_preview, run_templates};
use labelstation_cli::{Context, Output};
use labelstation_station::StationConfig;

/// Label station driver
///
/// Issues serial-number labels for devices on the production line: checks
/// the attached device, composes the label, records it and prints it.
#[derive(Parser, Debug)]
#[command(name = "labelstation", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the station configuration file (TOML).
    #[arg(long, global = true, env = "LABELSTATION_CONFIG")]
    config: Option<PathBuf>,

    /// Write answers as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read the attached device and report whether a label can be issued.
    Status,

    /// Issue a label for a serial number.
    Issue(IssueArgs),

    /// Ask once whether a label has been scanned downstream.
    Check(CheckArgs),

    /// Poll until a label has been scanned downstream.
    Watch(WatchArgs),

    /// List recently issued labels.
    Recent(RecentArgs),

    /// List the label templates.
    Templates,

    /// Compose a label into a printer job file without issuing it.
    Preview(PreviewArgs),

    /// Read operator commands from stdin against one station.
    Session,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("labelstation v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match StationConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("failed to load configuration: {e}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(station = %config.station.station_id, "configuration loaded");

    let ctx = Context::new(config, Output::new(cli.json));

    let result = match &cli.command {
        Commands::Status => run_status(&ctx).await,
        Commands::Issue(args) => run_issue(args, &ctx).await,
        Commands::Check(args) => run_check(args, &ctx).await,
        Commands::Watch(args) => run_watch(args, &ctx).await,
        Commands::Recent(args) => run_recent(args, &ctx).await,
        Commands::Templates => run_templates(&ctx),
        Commands::Preview(args) => run_preview(args, &ctx),
        Commands::Session => run_session(&ctx).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
