//! Mock collaborators for development and testing.

mod sink;

pub use sink::{PrintJob, RecordingPrintSink};
