//! # labelstation CLI
//!
//! Drives a label station from the command line, for operators at the bench
//! and for automation on the line.
//!
//! ## Subcommands
//!
//! - `labelstation status` - Read the attached device and report readiness.
//! - `labelstation issue <SERIAL>` - Issue one label.
//! - `labelstation check <BARCODE>` - Ask once whether a label was scanned.
//! - `labelstation watch <BARCODE>` - Poll until the label is scanned.
//! - `labelstation recent` - Recently issued labels.
//! - `labelstation templates` - List the label templates.
//! - `labelstation preview <SERIAL>` - Compose a label into a file.
//! - `labelstation session` - Line-oriented operator session on stdin.
//!
//! Every subcommand accepts `--json` for machine-readable output:
//!
//! ```bash
//! labelstation --config station.toml status
//! labelstation issue RC-103-000123 --no-print
//! labelstation watch RC-103-000123 --interval 2 --timeout 120
//! labelstation --json recent --limit 20 --window 240
//! ```
//!
//! ## Exit Codes
//!
//! `0` success, `1` configuration or startup failure, `2` the station
//! refused or failed the request, `130` interrupted.

pub mod confirm;
pub mod issue;
pub mod output;
pub mod recent;
pub mod render;
pub mod session;
pub mod templates;

use labelstation_station::StationConfig;

pub use output::Output;

/// The request was carried out.
pub const EXIT_OK: u8 = 0;
/// The station refused or failed the request.
pub const EXIT_FAILED: u8 = 2;
/// Cancelled with Ctrl-C.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: StationConfig,
    pub output: Output,
}

impl Context {
    pub fn new(config: StationConfig, output: Output) -> Self {
        Self { config, output }
    }
}
