//! Recording print sink.

use crate::printer::{PrintError, PrintSink};
use labelstation_core::DeviceType;
use labelstation_label::PageArtifact;
use parking_lot::Mutex;
use std::sync::Arc;

/// A job the recording sink accepted or refused.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintJob {
    pub printer_id: String,
    pub serial: String,
    pub device_type: DeviceType,
    pub has_symbol: bool,
}

#[derive(Debug, Default)]
struct SinkState {
    jobs: Vec<PrintJob>,
    failure: Option<String>,
}

/// Print sink that remembers every call instead of printing.
///
/// Clones share state, so a test can keep one clone as a spy while the
/// coordinator owns the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingPrintSink {
    state: Arc<Mutex<SinkState>>,
}

impl RecordingPrintSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        let sink = Self::default();
        sink.set_failure(Some(message.into()));
        sink
    }

    pub fn set_failure(&self, message: Option<String>) {
        self.state.lock().failure = message;
    }

    /// Number of calls, failed ones included.
    pub fn calls(&self) -> usize {
        self.state.lock().jobs.len()
    }

    pub fn jobs(&self) -> Vec<PrintJob> {
        self.state.lock().jobs.clone()
    }
}

impl PrintSink for RecordingPrintSink {
    async fn print_page(&self, artifact: &PageArtifact, printer_id: &str) -> Result<(), PrintError> {
        let mut state = self.state.lock();
        state.jobs.push(PrintJob {
            printer_id: printer_id.to_string(),
            serial: artifact.serial.clone(),
            device_type: artifact.device_type,
            has_symbol: artifact.has_symbol(),
        });

        match &state.failure {
            Some(message) => Err(PrintError::rejected(printer_id, message.clone())),
            None => Ok(()),
        }
    }
}
