//! Station-wide constants.
//!
//! Values shared between the composer, the coordinator and the CLI. Anything
//! an operator may reasonably want to change is also exposed through the
//! station configuration; these are the defaults.

/// Number of digits in the numeric part of a serial number (`PREFIX-NNNNNN`).
pub const SERIAL_DIGITS: usize = 6;

/// Separator between the device prefix and the numeric part.
pub const SERIAL_SEPARATOR: char = '-';

/// Role tag recorded as `scanner_id` on every issuance this station writes.
pub const DEFAULT_SCANNER_ID: &str = "print_label";

/// Station id used when the host name cannot be determined.
pub const UNKNOWN_STATION_ID: &str = "unknown-station";

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Resolution of the label artifact, matching the thermal printer head.
pub const DEFAULT_PRINT_DPI: u32 = 600;

/// Default printer identifier.
pub const DEFAULT_PRINTER_ID: &str = "TSC TE300";

/// Default number of records returned by recent-issuance queries.
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

/// Default look-back window for recent-issuance queries.
pub const DEFAULT_RECENT_WINDOW_MINUTES: u32 = 60;

/// Upper bound accepted for recent-issuance limits.
pub const MAX_RECENT_LIMIT: u32 = 500;
