// Batch orchestration
// Drives extraction, resolution, and storage across the frames of a sequence

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use crate::archive::{extract_frame_params, SequenceArchive};
use crate::mano::{resolve_frame, HandModel};
use crate::storage::{write_frame, FrameKey};

use super::trace::{TraceEntry, TraceWriter};

/// A progress notification is emitted every this many successful frames.
pub const PROGRESS_INTERVAL: u64 = 100;

/// File name of the per-sequence batch run log.
pub const RUN_TRACE_FILE: &str = "run_trace.jsonl";

/// Outcome of one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Frames iterated (every entry of the frame id list that was reached).
    pub attempted: u64,

    /// Frames for which a record was actually written.
    pub succeeded: u64,

    /// Whether iteration stopped early on the interrupt flag.
    pub interrupted: bool,
}

/// Sequential driver for the extract → resolve → store pipeline.
///
/// Owns no cross-frame state beyond its counters; the archive is read-only
/// throughout. Per-frame failures are isolated: every error from parameter
/// extraction, geometry resolution, or storage is logged with the frame id
/// and iteration continues with the next frame.
pub struct BatchOrchestrator<'a> {
    model: &'a dyn HandModel,
    root: PathBuf,
    interrupt: Arc<AtomicBool>,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(model: &'a dyn HandModel, root: impl Into<PathBuf>) -> Self {
        BatchOrchestrator {
            model,
            root: root.into(),
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an externally owned interrupt flag (set from a ctrl-c handler).
    /// The flag is polled between frames, so the frame in flight completes
    /// before iteration stops; records already written stay valid.
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = flag;
        self
    }

    /// Process every frame of the archive's frame id list, in its given
    /// order. Duplicate ids are processed per occurrence; the re-run
    /// overwrites the same record idempotently.
    pub fn process_sequence(&self, sequence_id: &str, archive: &SequenceArchive) -> BatchReport {
        let run_id = Uuid::new_v4();
        let trace = self.open_trace(sequence_id);
        let total = archive.frame_id_list.len();

        log::info!(
            "batch run {} over sequence {}: {} frames",
            run_id,
            sequence_id,
            total
        );
        self.trace(
            &trace,
            TraceEntry::new(run_id, "start", format!("batch over {} frames", total)),
        );

        let mut report = BatchReport {
            attempted: 0,
            succeeded: 0,
            interrupted: false,
        };

        for &frame_id in &archive.frame_id_list {
            if self.interrupt.load(Ordering::Relaxed) {
                log::warn!("batch interrupted after {} frames", report.attempted);
                self.trace(
                    &trace,
                    TraceEntry::new(run_id, "interrupted", "stopped on interrupt"),
                );
                report.interrupted = true;
                break;
            }

            report.attempted += 1;
            if self.process_frame(run_id, trace.as_ref(), sequence_id, archive, frame_id) {
                report.succeeded += 1;
                if report.succeeded % PROGRESS_INTERVAL == 0 {
                    log::info!("processed {} frames...", report.succeeded);
                    self.trace(
                        &trace,
                        TraceEntry::new(
                            run_id,
                            "progress",
                            format!("{} frames written", report.succeeded),
                        )
                        .with_data(serde_json::json!({
                            "succeeded": report.succeeded,
                            "attempted": report.attempted,
                        })),
                    );
                }
            }
        }

        log::info!(
            "batch complete: {}/{} frames written for sequence {}",
            report.succeeded,
            report.attempted,
            sequence_id
        );
        self.trace(
            &trace,
            TraceEntry::new(
                run_id,
                "summary",
                format!("{}/{} frames written", report.succeeded, report.attempted),
            )
            .with_data(serde_json::json!({
                "succeeded": report.succeeded,
                "attempted": report.attempted,
                "interrupted": report.interrupted,
            })),
        );

        report
    }

    /// Process one interactively chosen frame. The id must be a member of
    /// the archive's frame id list; an invalid id is reported and nothing
    /// is written.
    pub fn process_single(
        &self,
        sequence_id: &str,
        archive: &SequenceArchive,
        frame_id: i64,
    ) -> bool {
        if !archive.frame_id_list.contains(&frame_id) {
            log::warn!("{}: invalid frame id", frame_id);
            return false;
        }
        self.process_frame(Uuid::new_v4(), None, sequence_id, archive, frame_id)
    }

    fn process_frame(
        &self,
        run_id: Uuid,
        trace: Option<&TraceWriter>,
        sequence_id: &str,
        archive: &SequenceArchive,
        frame_id: i64,
    ) -> bool {
        let Some(params) = extract_frame_params(frame_id, &archive.raw_mano) else {
            log::debug!("frame {}: no parameters recorded", frame_id);
            return false;
        };

        let Some(geometry) = resolve_frame(self.model, frame_id, &params) else {
            if let Some(writer) = trace {
                self.trace_some(
                    writer,
                    TraceEntry::new(run_id, "frame", "no geometry available").with_frame(frame_id),
                );
            }
            return false;
        };

        let key = match FrameKey::new(sequence_id, frame_id) {
            Ok(key) => key,
            Err(e) => {
                log::error!("frame {}: {}", frame_id, e);
                return false;
            }
        };

        match write_frame(&self.root, &key, &geometry) {
            Ok(summary) => {
                log::debug!(
                    "frame {}: wrote {} artifacts",
                    frame_id,
                    summary.available_data.len()
                );
                true
            }
            Err(e) => {
                log::error!("frame {}: storage failed: {}", frame_id, e);
                if let Some(writer) = trace {
                    self.trace_some(
                        writer,
                        TraceEntry::new(run_id, "frame", format!("storage failed: {}", e))
                            .with_frame(frame_id),
                    );
                }
                false
            }
        }
    }

    fn open_trace(&self, sequence_id: &str) -> Option<TraceWriter> {
        let seq_dir = self.root.join(sequence_id);
        if let Err(e) = fs::create_dir_all(&seq_dir) {
            log::warn!("cannot create {}: {}; run trace disabled", seq_dir.display(), e);
            return None;
        }
        Some(TraceWriter::new(seq_dir.join(RUN_TRACE_FILE)))
    }

    fn trace(&self, trace: &Option<TraceWriter>, entry: TraceEntry) {
        if let Some(writer) = trace {
            self.trace_some(writer, entry);
        }
    }

    fn trace_some(&self, writer: &TraceWriter, entry: TraceEntry) {
        if let Err(e) = writer.write(&entry) {
            log::warn!("run trace write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::RawManoRecord;
    use crate::mano::{
        HandDeformation, HandModelError, HandSide, JOINT_COUNT, TRANSFORM_COUNT, VERTEX_COUNT,
    };
    use crate::pipeline::trace::read_trace_file;
    use crate::storage::DataRoot;
    use ndarray::{Array2, Array3};
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct StubModel {
        fail_side: Option<HandSide>,
    }

    impl StubModel {
        fn ok() -> Self {
            StubModel { fail_side: None }
        }
    }

    impl HandModel for StubModel {
        fn deform(
            &self,
            _pose: &[f32],
            _shape: &[f32],
            side: HandSide,
        ) -> Result<HandDeformation, HandModelError> {
            if self.fail_side == Some(side) {
                return Err(HandModelError::DeformationFailed("stub failure".into()));
            }
            Ok(HandDeformation {
                vertices: Array2::zeros((VERTEX_COUNT, 3)),
                joints: Array2::zeros((JOINT_COUNT, 3)),
                transforms_abs: Array3::zeros((TRANSFORM_COUNT, 4, 4)),
            })
        }
    }

    fn both_hands_record() -> RawManoRecord {
        RawManoRecord {
            rh_pose_coeffs: Some(vec![0.0; 4]),
            rh_betas: Some(vec![0.0; 2]),
            lh_pose_coeffs: Some(vec![0.0; 4]),
            lh_betas: Some(vec![0.0; 2]),
            ..Default::default()
        }
    }

    fn archive_with_frames(frame_id_list: Vec<i64>, recorded: &[i64]) -> SequenceArchive {
        let mut raw_mano = HashMap::new();
        for &frame_id in recorded {
            raw_mano.insert(frame_id, both_hands_record());
        }
        SequenceArchive {
            frame_id_list,
            obj_list: Vec::new(),
            raw_mano,
        }
    }

    #[test]
    fn test_end_to_end_batch_with_gap() {
        let root = TempDir::new().unwrap();
        let model = StubModel::ok();
        let orchestrator = BatchOrchestrator::new(&model, root.path());
        let archive = archive_with_frames(vec![1, 2, 3], &[1, 3]);

        let report = orchestrator.process_sequence("abc", &archive);

        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);
        assert!(!report.interrupted);

        let data = DataRoot::new(root.path());
        assert_eq!(data.frames("abc"), vec![1, 3]);
        assert!(!root.path().join("abc/frame_2").exists());
    }

    #[test]
    fn test_model_failure_drops_frame_without_files() {
        let root = TempDir::new().unwrap();
        let model = StubModel {
            fail_side: Some(HandSide::Left),
        };
        let orchestrator = BatchOrchestrator::new(&model, root.path());
        let archive = archive_with_frames(vec![5], &[5]);

        let report = orchestrator.process_sequence("abc", &archive);

        assert_eq!(report.attempted, 1);
        assert_eq!(report.succeeded, 0);
        // All-or-nothing: neither side's artifacts nor a manifest exist.
        assert!(!root.path().join("abc/frame_5").exists());
    }

    #[test]
    fn test_duplicate_frame_ids_count_per_occurrence() {
        let root = TempDir::new().unwrap();
        let model = StubModel::ok();
        let orchestrator = BatchOrchestrator::new(&model, root.path());
        let archive = archive_with_frames(vec![5, 5], &[5]);

        let report = orchestrator.process_sequence("abc", &archive);

        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 2);
        assert_eq!(DataRoot::new(root.path()).frames("abc"), vec![5]);
    }

    #[test]
    fn test_single_frame_mode_validates_membership() {
        let root = TempDir::new().unwrap();
        let model = StubModel::ok();
        let orchestrator = BatchOrchestrator::new(&model, root.path());
        let archive = archive_with_frames(vec![1, 2], &[1, 2]);

        assert!(!orchestrator.process_single("abc", &archive, 99));
        assert!(!root.path().join("abc/frame_99").exists());

        assert!(orchestrator.process_single("abc", &archive, 2));
        assert!(root.path().join("abc/frame_2").exists());
    }

    #[test]
    fn test_interrupt_flag_stops_iteration() {
        let root = TempDir::new().unwrap();
        let model = StubModel::ok();
        let flag = Arc::new(AtomicBool::new(true));
        let orchestrator =
            BatchOrchestrator::new(&model, root.path()).with_interrupt_flag(flag);
        let archive = archive_with_frames(vec![1, 2, 3], &[1, 2, 3]);

        let report = orchestrator.process_sequence("abc", &archive);

        assert!(report.interrupted);
        assert_eq!(report.attempted, 0);
        assert_eq!(report.succeeded, 0);
    }

    #[test]
    fn test_progress_entries_land_in_the_run_trace() {
        let root = TempDir::new().unwrap();
        let model = StubModel::ok();
        let orchestrator = BatchOrchestrator::new(&model, root.path());

        let ids: Vec<i64> = (0..120).collect();
        let archive = archive_with_frames(ids.clone(), &ids);

        let report = orchestrator.process_sequence("abc", &archive);
        assert_eq!(report.succeeded, 120);

        let entries =
            read_trace_file(&root.path().join("abc").join(RUN_TRACE_FILE)).unwrap();
        let progress: Vec<_> = entries.iter().filter(|e| e.stage == "progress").collect();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].data.as_ref().unwrap()["succeeded"], 100);

        let summary = entries.iter().find(|e| e.stage == "summary").unwrap();
        assert_eq!(summary.data.as_ref().unwrap()["succeeded"], 120);
    }
}
