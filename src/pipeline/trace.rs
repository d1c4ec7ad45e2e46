// Batch run tracing
// Append-only JSONL trace file recording each batch run over a sequence

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during trace operations
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A single trace entry in a batch run log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// ISO 8601 timestamp of when this entry was created
    pub timestamp: String,

    /// Batch run this entry belongs to
    pub run_id: Uuid,

    /// Run stage ("start", "frame", "progress", "interrupted", "summary")
    pub stage: String,

    /// Human-readable message describing what happened
    pub message: String,

    /// Frame the entry refers to, for per-frame events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<i64>,

    /// Optional structured data (e.g. success/attempt counters)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TraceEntry {
    /// Create a run-level entry with the current timestamp
    pub fn new(run_id: Uuid, stage: impl Into<String>, message: impl Into<String>) -> Self {
        TraceEntry {
            timestamp: Utc::now().to_rfc3339(),
            run_id,
            stage: stage.into(),
            message: message.into(),
            frame_id: None,
            data: None,
        }
    }

    /// Attach the frame this entry refers to
    pub fn with_frame(mut self, frame_id: i64) -> Self {
        self.frame_id = Some(frame_id);
        self
    }

    /// Attach structured data
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Serialize to a JSON line (with newline)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

/// Append-only JSONL trace writer for one sequence's run log
pub struct TraceWriter {
    file_path: PathBuf,
}

impl TraceWriter {
    pub fn new(file_path: PathBuf) -> Self {
        TraceWriter { file_path }
    }

    /// Append a trace entry, creating the file if it doesn't exist
    pub fn write(&self, entry: &TraceEntry) -> Result<(), TraceError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        let json_line = entry.to_json_line()?;
        file.write_all(json_line.as_bytes())?;
        file.flush()?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Read trace entries back from a JSONL file
pub fn read_trace_file(path: &Path) -> Result<Vec<TraceEntry>, TraceError> {
    let contents = std::fs::read_to_string(path)?;
    let mut entries = Vec::new();

    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let entry: TraceEntry = serde_json::from_str(line)?;
        entries.push(entry);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_trace_entry_creation() {
        let run_id = Uuid::new_v4();
        let entry = TraceEntry::new(run_id, "start", "Batch started");

        assert_eq!(entry.run_id, run_id);
        assert_eq!(entry.stage, "start");
        assert!(entry.frame_id.is_none());
        assert!(entry.data.is_none());
    }

    #[test]
    fn test_frame_and_data_attachments() {
        let entry = TraceEntry::new(Uuid::new_v4(), "frame", "Deformation failed")
            .with_frame(42)
            .with_data(serde_json::json!({"side": "left"}));

        assert_eq!(entry.frame_id, Some(42));
        assert_eq!(entry.data.unwrap()["side"], "left");
    }

    #[test]
    fn test_writer_appends_and_reads_back_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run_trace.jsonl");
        let writer = TraceWriter::new(path.clone());
        let run_id = Uuid::new_v4();

        writer.write(&TraceEntry::new(run_id, "start", "go")).unwrap();
        writer
            .write(
                &TraceEntry::new(run_id, "summary", "done")
                    .with_data(serde_json::json!({"succeeded": 2, "attempted": 3})),
            )
            .unwrap();

        let entries = read_trace_file(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].stage, "start");
        assert_eq!(entries[1].stage, "summary");
        assert_eq!(entries[1].data.as_ref().unwrap()["succeeded"], 2);
    }

    #[test]
    fn test_json_line_format() {
        let entry = TraceEntry::new(Uuid::new_v4(), "frame", "testing").with_frame(7);
        let json_line = entry.to_json_line().unwrap();

        assert!(json_line.ends_with('\n'));
        let parsed: TraceEntry = serde_json::from_str(json_line.trim()).unwrap();
        assert_eq!(parsed.frame_id, Some(7));
    }
}
