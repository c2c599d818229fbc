//! Device link backed by the vendor helper executable.
//!
//! The helper is invoked once per query with a command word and optional
//! hex handle argument, and prints a single JSON object on stdout:
//!
//! ```text
//! dll_wrapper list             -> {"success":true,"count":1,"devices":[...]}
//! dll_wrapper mcu_id 0x1A2B    -> {"success":true,"mcu_id":[18,52,...]}
//! dll_wrapper serial 0x1A2B    -> {"success":true,"serial":"RC-103-000123"}
//! dll_wrapper db_info 0x1A2B   -> {"success":true,"db_info":{"result":0,...}}
//! dll_wrapper version          -> {"success":true,"version":"1.0","architecture":"x64"}
//! ```
//!
//! Any failure reports `{"success":false,"error":"..."}`.

use crate::{
    DeviceLink, HardwareError, Result,
    snapshot::{DbRecord, DeviceHandle, DeviceSnapshot},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default time allowed for one helper invocation.
pub const DEFAULT_WRAPPER_TIMEOUT: Duration = Duration::from_secs(30);

/// Version information reported by the helper executable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WrapperVersion {
    pub version: String,
    #[serde(default)]
    pub architecture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListBody {
    count: usize,
    #[serde(default)]
    devices: Vec<ListedDevice>,
}

/// `list` reports devices either as bare handles or as objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListedDevice {
    Handle(u64),
    Entry { handle: u64 },
}

impl ListedDevice {
    fn handle(&self) -> DeviceHandle {
        match self {
            ListedDevice::Handle(h) | ListedDevice::Entry { handle: h } => DeviceHandle(*h),
        }
    }
}

#[derive(Debug, Deserialize)]
struct McuIdBody {
    #[serde(default)]
    mcu_id: Option<Vec<u8>>,
}

#[derive(Debug, Deserialize)]
struct SerialBody {
    #[serde(default)]
    serial: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DbInfoBody {
    db_info: DbRecord,
}

/// Outcome of one helper invocation that produced parseable JSON.
enum Reply<T> {
    Ok(T),
    Failed(String),
}

/// Device link that shells out to the vendor helper executable.
///
/// # Examples
///
/// ```no_run
/// use labelstation_hardware::{WrapperDeviceLink, single_snapshot};
/// use std::time::Duration;
///
/// # async fn example() -> labelstation_hardware::Result<()> {
/// let link = WrapperDeviceLink::new("C:/station/dll_wrapper.exe")
///     .with_timeout(Duration::from_secs(10));
///
/// let snapshot = single_snapshot(&link).await?;
/// println!("attached: {:?}", snapshot.serial);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WrapperDeviceLink {
    program: PathBuf,
    launcher: Option<PathBuf>,
    timeout: Duration,
}

impl WrapperDeviceLink {
    /// Create a link for the helper at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            launcher: None,
            timeout: DEFAULT_WRAPPER_TIMEOUT,
        }
    }

    /// Run the helper through a launcher, e.g. `wine` on a Linux bench.
    pub fn with_launcher(mut self, launcher: impl Into<PathBuf>) -> Self {
        self.launcher = Some(launcher.into());
        self
    }

    /// Set the per-invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the helper executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Query the helper's own version.
    pub async fn version(&self) -> Result<WrapperVersion> {
        self.call_ok("version", None).await
    }

    async fn call_ok<T: DeserializeOwned>(
        &self,
        command: &str,
        handle: Option<DeviceHandle>,
    ) -> Result<T> {
        match self.call(command, handle).await? {
            Reply::Ok(body) => Ok(body),
            Reply::Failed(message) => Err(HardwareError::command_failed(command, message)),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        command: &str,
        handle: Option<DeviceHandle>,
    ) -> Result<Reply<T>> {
        let mut cmd = match &self.launcher {
            Some(launcher) => {
                let mut cmd = Command::new(launcher);
                cmd.arg(&self.program);
                cmd
            }
            None => Command::new(&self.program),
        };
        cmd.arg(command);
        if let Some(handle) = handle {
            cmd.arg(handle.to_string());
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Invoking {} {}", self.program.display(), command);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(HardwareError::unreachable(format!(
                    "failed to run {}: {}",
                    self.program.display(),
                    e
                )));
            }
            Err(_) => return Err(HardwareError::timeout(self.timeout.as_millis() as u64)),
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() && !stderr.trim().is_empty() {
            warn!("{} {} exited with {}", self.program.display(), command, output.status);
            return Err(HardwareError::unreachable(format!(
                "process error: {}",
                stderr.trim()
            )));
        }

        parse_reply(stdout.trim())
    }
}

fn parse_reply<T: DeserializeOwned>(stdout: &str) -> Result<Reply<T>> {
    let value: serde_json::Value = serde_json::from_str(stdout)
        .map_err(|_| HardwareError::invalid_data(format!("invalid JSON response: {stdout}")))?;

    let envelope: Envelope = serde_json::from_value(value.clone())
        .map_err(|e| HardwareError::invalid_data(format!("missing success flag: {e}")))?;

    if !envelope.success {
        return Ok(Reply::Failed(
            envelope.error.unwrap_or_else(|| "unspecified error".to_string()),
        ));
    }

    serde_json::from_value(value)
        .map(Reply::Ok)
        .map_err(|e| HardwareError::invalid_data(format!("unexpected response shape: {e}")))
}

impl DeviceLink for WrapperDeviceLink {
    async fn device_count(&self) -> Result<usize> {
        let body: ListBody = self.call_ok("list", None).await?;
        Ok(body.count)
    }

    async fn device_handles(&self) -> Result<Vec<DeviceHandle>> {
        let body: ListBody = self.call_ok("list", None).await?;
        Ok(body.devices.iter().map(ListedDevice::handle).collect())
    }

    async fn snapshot(&self, handle: DeviceHandle) -> Result<DeviceSnapshot> {
        // The device may fail to report its fingerprint or serial; that is
        // data, not a link failure.
        let mcu_id = match self.call::<McuIdBody>("mcu_id", Some(handle)).await? {
            Reply::Ok(body) => body.mcu_id,
            Reply::Failed(message) => {
                warn!("Device {} did not report an MCU id: {}", handle, message);
                None
            }
        };

        let serial = match self.call::<SerialBody>("serial", Some(handle)).await? {
            Reply::Ok(body) => body.serial,
            Reply::Failed(message) => {
                warn!("Device {} did not report a serial: {}", handle, message);
                None
            }
        };

        let db: DbInfoBody = self.call_ok("db_info", Some(handle)).await?;

        Ok(DeviceSnapshot::from_db_record(handle, mcu_id, serial, db.db_info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_with_bare_handles() {
        let reply: Reply<ListBody> =
            parse_reply(r#"{"success":true,"count":1,"devices":[4660]}"#).unwrap();
        let Reply::Ok(body) = reply else {
            panic!("expected success");
        };
        assert_eq!(body.count, 1);
        assert_eq!(body.devices[0].handle(), DeviceHandle(0x1234));
    }

    #[test]
    fn test_parse_list_with_objects() {
        let reply: Reply<ListBody> = parse_reply(
            r#"{"success":true,"count":2,"devices":[{"handle":1},{"handle":2,"serial":"x"}]}"#,
        )
        .unwrap();
        let Reply::Ok(body) = reply else {
            panic!("expected success");
        };
        let handles: Vec<_> = body.devices.iter().map(ListedDevice::handle).collect();
        assert_eq!(handles, vec![DeviceHandle(1), DeviceHandle(2)]);
    }

    #[test]
    fn test_parse_failure_reply() {
        let reply: Reply<SerialBody> =
            parse_reply(r#"{"success":false,"error":"device busy"}"#).unwrap();
        assert!(matches!(reply, Reply::Failed(ref m) if m == "device busy"));
    }

    #[test]
    fn test_parse_garbage_is_invalid_data() {
        let err = parse_reply::<ListBody>("Segmentation fault").err().unwrap();
        assert!(matches!(err, HardwareError::InvalidData { .. }));
        assert!(err.is_link_failure());
    }

    #[test]
    fn test_parse_db_info_body() {
        let reply: Reply<DbInfoBody> = parse_reply(
            r#"{"success":true,"db_info":{"result":0,"tests_ok":1,"calibration_ok":1,"prog_time":5,"calib_time":6}}"#,
        )
        .unwrap();
        let Reply::Ok(body) = reply else {
            panic!("expected success");
        };
        assert_eq!(body.db_info.result, 0);
        assert!(body.db_info.tests_ok);
        assert_eq!(body.db_info.calib_time, 6);
    }
}
