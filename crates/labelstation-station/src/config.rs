//! Station configuration.
//!
//! Loaded from a TOML file, then overridden by `LABELSTATION_*` environment
//! variables. Every key has a default, so an empty file is a valid config.
//!
//! ```toml
//! [station]
//! station_id = "bench-1"
//!
//! [database]
//! path = "/var/lib/labelstation/labelstation.db"
//!
//! [hardware]
//! wrapper_path = "dll_wrapper.exe"
//! launcher = "wine"
//!
//! [printer]
//! id = "10.0.0.20:9100"
//!
//! [templates]
//! asset_dir = "/usr/share/labelstation/templates"
//!
//! [tracking]
//! base_url = "http://tracking.local:8080"
//! ```

use crate::error::{Result, StationError};
use labelstation_core::ValidationPolicy;
use labelstation_core::constants::{
    DEFAULT_PRINT_DPI, DEFAULT_PRINTER_ID, DEFAULT_SCANNER_ID, UNKNOWN_STATION_ID,
};
use labelstation_label::{BaseAssets, PrintSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const TEMPLATE_DIR_NAME: &str = "templates";

/// Complete station configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub station: StationSection,
    pub database: DatabaseSection,
    pub hardware: HardwareSection,
    pub printer: PrinterSection,
    pub policy: ValidationPolicy,
    pub templates: TemplatesSection,
    pub tracking: TrackingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationSection {
    /// Empty means: use the host name.
    pub station_id: String,
    pub scanner_id: String,
}

impl Default for StationSection {
    fn default() -> Self {
        Self {
            station_id: String::new(),
            scanner_id: DEFAULT_SCANNER_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("labelstation.db"),
            max_connections: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareSection {
    /// Helper executable talking to the device library.
    pub wrapper_path: PathBuf,
    /// Program that runs the helper, e.g. `wine` on Linux.
    pub launcher: Option<PathBuf>,
    pub timeout_secs: u64,
    /// Serve a simulated, fully passing device with this serial instead of
    /// real hardware.
    pub simulate_serial: Option<String>,
}

impl Default for HardwareSection {
    fn default() -> Self {
        Self {
            wrapper_path: PathBuf::from("dll_wrapper.exe"),
            launcher: None,
            timeout_secs: 30,
            simulate_serial: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterSection {
    /// `host:port`, a device path, or a spooler queue name.
    pub id: String,
    /// Composition resolution.
    pub dpi: u32,
    /// Print head resolution.
    pub head_dpi: u32,
    pub timeout_secs: u64,
    pub density: u8,
    pub speed: u8,
    pub gap_mm: f64,
    /// Record the jobs instead of printing them.
    pub simulate: bool,
}

impl Default for PrinterSection {
    fn default() -> Self {
        let settings = PrintSettings::default();
        Self {
            id: DEFAULT_PRINTER_ID.to_string(),
            dpi: DEFAULT_PRINT_DPI,
            head_dpi: settings.dpi,
            timeout_secs: 15,
            density: settings.density,
            speed: settings.speed,
            gap_mm: settings.gap_mm,
            simulate: false,
        }
    }
}

impl PrinterSection {
    pub fn print_settings(&self) -> PrintSettings {
        PrintSettings {
            dpi: self.head_dpi,
            density: self.density,
            speed: self.speed,
            gap_mm: self.gap_mm,
            ..PrintSettings::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesSection {
    /// Directory of base artwork PNGs. Defaults to `templates/` next to
    /// the executable.
    pub asset_dir: PathBuf,
    /// Print on plain stock and ignore `asset_dir`.
    pub blank_stock: bool,
    /// Data Matrix encoder program. Unset disables the symbol.
    pub symbol_encoder: Option<PathBuf>,
    /// Seconds the encoder may run before the symbol is dropped.
    pub encoder_timeout_secs: u64,
}

impl Default for TemplatesSection {
    fn default() -> Self {
        Self {
            asset_dir: default_asset_dir(),
            blank_stock: false,
            symbol_encoder: Some(PathBuf::from("dmtxwrite")),
            encoder_timeout_secs: 5,
        }
    }
}

impl TemplatesSection {
    pub fn base_assets(&self) -> BaseAssets {
        if self.blank_stock {
            BaseAssets::Blank
        } else {
            BaseAssets::directory(&self.asset_dir)
        }
    }
}

fn default_asset_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(TEMPLATE_DIR_NAME)))
        .unwrap_or_else(|| PathBuf::from(TEMPLATE_DIR_NAME))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingSection {
    /// Unset reads scan progress from the issuance store.
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TrackingSection {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 10,
        }
    }
}

impl StationConfig {
    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| StationError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&text)
    }

    /// Load `path` (or defaults), apply environment overrides and fill in
    /// the station id.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.resolve_station_id(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `LABELSTATION_*` overrides looked up through `var`.
    pub fn apply_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("LABELSTATION_STATION_ID") {
            self.station.station_id = v;
        }
        if let Some(v) = var("LABELSTATION_DATABASE_PATH") {
            self.database.path = PathBuf::from(v);
        }
        if let Some(v) = var("LABELSTATION_WRAPPER_PATH") {
            self.hardware.wrapper_path = PathBuf::from(v);
        }
        if let Some(v) = var("LABELSTATION_WRAPPER_LAUNCHER") {
            self.hardware.launcher = non_empty(v).map(PathBuf::from);
        }
        if let Some(v) = var("LABELSTATION_SIMULATE_SERIAL") {
            self.hardware.simulate_serial = non_empty(v);
        }
        if let Some(v) = var("LABELSTATION_PRINTER_ID") {
            self.printer.id = v;
        }
        if let Some(dir) = var("LABELSTATION_TEMPLATE_DIR").and_then(non_empty) {
            self.templates.asset_dir = PathBuf::from(dir);
        }
        if let Some(v) = var("LABELSTATION_BLANK_STOCK") {
            self.templates.blank_stock = parse_flag("LABELSTATION_BLANK_STOCK", &v)?;
        }
        if let Some(v) = var("LABELSTATION_SYMBOL_ENCODER") {
            self.templates.symbol_encoder = non_empty(v).map(PathBuf::from);
        }
        if let Some(v) = var("LABELSTATION_TRACKING_URL") {
            self.tracking.base_url = non_empty(v);
        }
        if let Some(v) = var("LABELSTATION_DEVICE_VALIDATION") {
            self.policy.device_validation_enabled = parse_flag("LABELSTATION_DEVICE_VALIDATION", &v)?;
        }
        if let Some(v) = var("LABELSTATION_PHYSICAL_PRINT") {
            self.policy.physical_print_enabled = parse_flag("LABELSTATION_PHYSICAL_PRINT", &v)?;
        }
        if let Some(v) = var("LABELSTATION_PRINTER_DPI") {
            self.printer.dpi = parse_number("LABELSTATION_PRINTER_DPI", &v)?;
        }
        Ok(())
    }

    /// Use the host name when no station id is configured.
    pub fn resolve_station_id<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.station.station_id.trim().is_empty() {
            self.station.station_id = hostname(var);
        }
    }
}

/// Host name from `HOSTNAME`, `COMPUTERNAME` or `/etc/hostname`.
pub fn hostname<F>(var: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ["HOSTNAME", "COMPUTERNAME"]
        .into_iter()
        .filter_map(|key| var(key))
        .chain(std::fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_STATION_ID.to_string())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(StationError::config(format!("{key}: expected a boolean, got {other:?}"))),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| StationError::config(format!("{key}: expected a number, got {value:?}")))
}
