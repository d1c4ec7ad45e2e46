// Pipeline execution and monitoring module
// Drives extraction across the frames of a sequence

pub mod batch;
pub mod trace;

pub use batch::{BatchOrchestrator, BatchReport, PROGRESS_INTERVAL};
pub use trace::{read_trace_file, TraceEntry, TraceError, TraceWriter};
