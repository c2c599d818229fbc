#![allow(async_fn_in_trait)]

//! Print sinks.
//!
//! A sink takes a composed page and a printer id and reports pass or fail.
//! Queueing and status callbacks are the printer's business.

use crate::mock::RecordingPrintSink;
use labelstation_label::PageArtifact;
use labelstation_label::tspl::{self, PrintSettings};
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::process::Command;
use tracing::{debug, info};

/// Default time allowed for one print job to be handed over.
pub const DEFAULT_PRINT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("Cannot reach printer {printer}: {source}")]
    Connect {
        printer: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed sending job to printer {printer}: {source}")]
    Write {
        printer: String,
        #[source]
        source: io::Error,
    },

    #[error("Printer {printer} did not accept the job within {timeout_ms}ms")]
    Timeout { printer: String, timeout_ms: u64 },

    #[error("Printer {printer} rejected the job: {message}")]
    Rejected { printer: String, message: String },
}

impl PrintError {
    pub fn rejected(printer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            printer: printer.into(),
            message: message.into(),
        }
    }
}

/// Write-only printer capability.
pub trait PrintSink: Send + Sync {
    /// Print `artifact` on `printer_id`.
    async fn print_page(&self, artifact: &PageArtifact, printer_id: &str) -> Result<(), PrintError>;
}

/// Where a printer id points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterTarget {
    /// `host:port`, raw socket printing (port 9100 on most printers).
    Tcp(String),
    /// Device node or file, e.g. `/dev/usb/lp0`.
    Device(PathBuf),
    /// Queue name handed to the system `lp` spooler in raw mode.
    Queue(String),
}

impl PrinterTarget {
    /// Classify a printer id.
    ///
    /// ```
    /// use labelstation_station::printer::PrinterTarget;
    ///
    /// assert!(matches!(PrinterTarget::parse("10.0.0.20:9100"), PrinterTarget::Tcp(_)));
    /// assert!(matches!(PrinterTarget::parse("/dev/usb/lp0"), PrinterTarget::Device(_)));
    /// assert!(matches!(PrinterTarget::parse("TSC TE300"), PrinterTarget::Queue(_)));
    /// ```
    pub fn parse(printer_id: &str) -> Self {
        let id = printer_id.trim();

        if id.contains('/') || id.contains('\\') {
            return PrinterTarget::Device(PathBuf::from(id));
        }

        if let Some((host, port)) = id.rsplit_once(':')
            && !host.is_empty()
            && !host.contains(' ')
            && port.parse::<u16>().is_ok()
        {
            return PrinterTarget::Tcp(id.to_string());
        }

        PrinterTarget::Queue(id.to_string())
    }
}

/// Sends TSPL jobs straight to the printer.
#[derive(Debug, Clone)]
pub struct RawPrinterSink {
    settings: PrintSettings,
    timeout: Duration,
    spooler: PathBuf,
}

impl RawPrinterSink {
    pub fn new(settings: PrintSettings) -> Self {
        Self {
            settings,
            timeout: DEFAULT_PRINT_TIMEOUT,
            spooler: PathBuf::from("lp"),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Spooler program used for queue names.
    pub fn with_spooler(mut self, spooler: impl Into<PathBuf>) -> Self {
        self.spooler = spooler.into();
        self
    }

    pub fn settings(&self) -> &PrintSettings {
        &self.settings
    }

    async fn send(&self, target: &PrinterTarget, printer: &str, job: &[u8]) -> Result<(), PrintError> {
        match target {
            PrinterTarget::Tcp(addr) => {
                let mut stream = TcpStream::connect(addr).await.map_err(|e| PrintError::Connect {
                    printer: printer.to_string(),
                    source: e,
                })?;
                write_all(&mut stream, printer, job).await?;
                stream.shutdown().await.map_err(|e| PrintError::Write {
                    printer: printer.to_string(),
                    source: e,
                })
            }
            PrinterTarget::Device(path) => {
                let mut file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await
                    .map_err(|e| PrintError::Connect {
                        printer: printer.to_string(),
                        source: e,
                    })?;
                write_all(&mut file, printer, job).await?;
                file.flush().await.map_err(|e| PrintError::Write {
                    printer: printer.to_string(),
                    source: e,
                })
            }
            PrinterTarget::Queue(queue) => self.spool(queue, job).await,
        }
    }

    async fn spool(&self, queue: &str, job: &[u8]) -> Result<(), PrintError> {
        let mut child = Command::new(&self.spooler)
            .args(["-d", queue, "-o", "raw"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PrintError::Connect {
                printer: queue.to_string(),
                source: e,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            write_all(&mut stdin, queue, job).await?;
        }

        let output = child.wait_with_output().await.map_err(|e| PrintError::Write {
            printer: queue.to_string(),
            source: e,
        })?;

        if !output.status.success() {
            return Err(PrintError::rejected(
                queue,
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }
        Ok(())
    }
}

async fn write_all<W>(writer: &mut W, printer: &str, job: &[u8]) -> Result<(), PrintError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(job).await.map_err(|e| PrintError::Write {
        printer: printer.to_string(),
        source: e,
    })
}

impl PrintSink for RawPrinterSink {
    async fn print_page(&self, artifact: &PageArtifact, printer_id: &str) -> Result<(), PrintError> {
        let job = tspl::encode(artifact, &self.settings);
        let target = PrinterTarget::parse(printer_id);

        debug!(printer = printer_id, bytes = job.len(), ?target, "Sending print job");

        tokio::time::timeout(self.timeout, self.send(&target, printer_id, &job))
            .await
            .map_err(|_| PrintError::Timeout {
                printer: printer_id.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            })??;

        info!(printer = printer_id, serial = %artifact.serial, "Label sent to printer");
        Ok(())
    }
}

/// Enum wrapper for print sink dispatch.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnyPrintSink {
    Raw(RawPrinterSink),
    /// Recording sink for development and testing.
    Recording(RecordingPrintSink),
}

impl PrintSink for AnyPrintSink {
    async fn print_page(&self, artifact: &PageArtifact, printer_id: &str) -> Result<(), PrintError> {
        match self {
            Self::Raw(sink) => sink.print_page(artifact, printer_id).await,
            Self::Recording(sink) => sink.print_page(artifact, printer_id).await,
        }
    }
}

impl From<RawPrinterSink> for AnyPrintSink {
    fn from(sink: RawPrinterSink) -> Self {
        Self::Raw(sink)
    }
}

impl From<RecordingPrintSink> for AnyPrintSink {
    fn from(sink: RecordingPrintSink) -> Self {
        Self::Recording(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelstation_core::DeviceType;
    use labelstation_label::{BaseAssets, LabelComposer, TemplateRegistry, UnavailableRenderer};
    use rstest::rstest;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn page() -> PageArtifact {
        LabelComposer::new(TemplateRegistry::builtin(), BaseAssets::Blank, UnavailableRenderer)
            .compose("RC-102-000001", DeviceType::Rc102, b"RC-102-000001")
            .unwrap()
    }

    #[rstest]
    #[case("127.0.0.1:9100", PrinterTarget::Tcp("127.0.0.1:9100".into()))]
    #[case("printer.local:9100", PrinterTarget::Tcp("printer.local:9100".into()))]
    #[case("/dev/usb/lp0", PrinterTarget::Device("/dev/usb/lp0".into()))]
    #[case("TSC TE300", PrinterTarget::Queue("TSC TE300".into()))]
    #[case("TSC_TE300", PrinterTarget::Queue("TSC_TE300".into()))]
    #[case("label:printer", PrinterTarget::Queue("label:printer".into()))]
    fn test_printer_target_parse(#[case] id: &str, #[case] expected: PrinterTarget) {
        assert_eq!(PrinterTarget::parse(id), expected);
    }

    #[tokio::test]
    async fn test_tcp_printer_receives_tspl_job() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut job = Vec::new();
            socket.read_to_end(&mut job).await.unwrap();
            job
        });

        RawPrinterSink::new(PrintSettings::default())
            .print_page(&page(), &addr)
            .await
            .unwrap();

        let job = String::from_utf8_lossy(&server.await.unwrap()).into_owned();
        assert!(job.starts_with("SIZE 51 mm,25 mm\r\n"));
        assert!(job.ends_with("PRINT 1\r\n"));
    }

    #[tokio::test]
    async fn test_device_file_receives_job() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lp0");

        RawPrinterSink::new(PrintSettings::default())
            .print_page(&page(), path.to_str().unwrap())
            .await
            .unwrap();

        let job = std::fs::read_to_string(&path).unwrap();
        assert!(job.contains("TEXT "));
        assert!(job.contains("RC-102-000001"));
    }

    #[tokio::test]
    async fn test_refused_connection_is_connect_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = RawPrinterSink::new(PrintSettings::default())
            .print_page(&page(), &addr)
            .await
            .unwrap_err();
        assert!(matches!(err, PrintError::Connect { .. }));
    }

    #[tokio::test]
    async fn test_missing_spooler_is_connect_error() {
        let err = RawPrinterSink::new(PrintSettings::default())
            .with_spooler("/nonexistent/lp")
            .print_page(&page(), "TSC TE300")
            .await
            .unwrap_err();
        assert!(matches!(err, PrintError::Connect { .. }));
    }
}
