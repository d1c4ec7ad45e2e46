// Hierarchy walker
// Read-only enumeration of sequences, frames, and artifacts in the storage layout

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::ArrayD;
use walkdir::WalkDir;

use super::key::parse_frame_dir_name;
use super::manifest::{FrameSummary, SUMMARY_FILE};
use super::writer::StorageResult;

/// A storage root to walk.
///
/// Every accessor is tolerant: an unreadable directory, a frame with zero
/// artifacts, or a missing/corrupt manifest is skipped with a diagnostic and
/// never aborts enumeration of siblings.
#[derive(Debug, Clone)]
pub struct DataRoot {
    root: PathBuf,
}

impl DataRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DataRoot { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sequence identifiers: the immediate subdirectories of the root,
    /// sorted by name.
    pub fn sequences(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("cannot read storage root {}: {}", self.root.display(), e);
                return Vec::new();
            }
        };

        let mut sequences: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        sequences.sort();
        sequences
    }

    /// Frame identifiers stored for a sequence, sorted numerically.
    /// Directories not matching the `frame_<id>` convention are ignored.
    pub fn frames(&self, sequence_id: &str) -> Vec<i64> {
        let seq_dir = self.root.join(sequence_id);
        let entries = match fs::read_dir(&seq_dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("cannot read sequence {}: {}", seq_dir.display(), e);
                return Vec::new();
            }
        };

        let mut frames: Vec<i64> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| parse_frame_dir_name(&entry.file_name().to_string_lossy()))
            .collect();
        frames.sort_unstable();
        frames
    }

    /// Location of one frame record.
    pub fn frame_dir(&self, sequence_id: &str, frame_id: i64) -> PathBuf {
        self.root
            .join(sequence_id)
            .join(format!("frame_{}", frame_id))
    }

    /// Numeric artifact files present in one frame record, sorted by name.
    pub fn artifacts(&self, sequence_id: &str, frame_id: i64) -> Vec<PathBuf> {
        let frame_dir = self.frame_dir(sequence_id, frame_id);
        let mut artifacts: Vec<PathBuf> = WalkDir::new(&frame_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "npy"))
            .collect();
        artifacts.sort();
        artifacts
    }

    /// Read back one frame's manifest. A missing or corrupt manifest yields
    /// `None` with a diagnostic.
    pub fn read_summary(&self, sequence_id: &str, frame_id: i64) -> Option<FrameSummary> {
        let path = self.frame_dir(sequence_id, frame_id).join(SUMMARY_FILE);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("no readable manifest at {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(summary) => Some(summary),
            Err(e) => {
                log::warn!("corrupt manifest at {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Load one numeric artifact as a dynamic-dimensional array.
    pub fn load_array(&self, path: &Path) -> StorageResult<ArrayD<f32>> {
        let array = ndarray_npy::read_npy(path)?;
        Ok(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mano::{FrameGeometry, HandDeformation, JOINT_COUNT, TRANSFORM_COUNT, VERTEX_COUNT};
    use crate::storage::key::FrameKey;
    use crate::storage::writer::write_frame;
    use ndarray::{Array2, Array3};
    use tempfile::TempDir;

    fn right_hand_only() -> FrameGeometry {
        FrameGeometry {
            left: None,
            right: Some(HandDeformation {
                vertices: Array2::zeros((VERTEX_COUNT, 3)),
                joints: Array2::zeros((JOINT_COUNT, 3)),
                transforms_abs: Array3::zeros((TRANSFORM_COUNT, 4, 4)),
            }),
        }
    }

    #[test]
    fn test_walk_written_records() {
        let root = TempDir::new().unwrap();
        for frame_id in [12, 3, 7] {
            let key = FrameKey::new("abc", frame_id).unwrap();
            write_frame(root.path(), &key, &right_hand_only()).unwrap();
        }

        let data = DataRoot::new(root.path());
        assert_eq!(data.sequences(), vec!["abc".to_string()]);
        assert_eq!(data.frames("abc"), vec![3, 7, 12]);

        let artifacts = data.artifacts("abc", 7);
        assert_eq!(artifacts.len(), 3);
    }

    #[test]
    fn test_round_trip_manifest_matches_artifacts() {
        let root = TempDir::new().unwrap();
        let key = FrameKey::new("abc", 7).unwrap();
        write_frame(root.path(), &key, &right_hand_only()).unwrap();

        let data = DataRoot::new(root.path());
        let summary = data.read_summary("abc", 7).unwrap();
        let on_disk: Vec<String> = data
            .artifacts("abc", 7)
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        let mut listed: Vec<String> = summary
            .available_data
            .iter()
            .map(|entry| entry.file.clone())
            .collect();
        listed.sort();
        assert_eq!(listed, on_disk);
    }

    #[test]
    fn test_missing_manifest_is_tolerated() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("abc/frame_1")).unwrap();

        let data = DataRoot::new(root.path());
        assert!(data.read_summary("abc", 1).is_none());
        // The frame itself still enumerates.
        assert_eq!(data.frames("abc"), vec![1]);
    }

    #[test]
    fn test_corrupt_manifest_is_tolerated() {
        let root = TempDir::new().unwrap();
        let frame_dir = root.path().join("abc/frame_2");
        fs::create_dir_all(&frame_dir).unwrap();
        fs::write(frame_dir.join(SUMMARY_FILE), "{broken").unwrap();

        let data = DataRoot::new(root.path());
        assert!(data.read_summary("abc", 2).is_none());
    }

    #[test]
    fn test_unconventional_dirs_are_ignored() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("abc/frame_5")).unwrap();
        fs::create_dir_all(root.path().join("abc/notes")).unwrap();
        fs::write(root.path().join("abc/run_trace.jsonl"), "").unwrap();

        let data = DataRoot::new(root.path());
        assert_eq!(data.frames("abc"), vec![5]);
    }

    #[test]
    fn test_missing_root_yields_no_sequences() {
        let data = DataRoot::new("/definitely/not/a/real/root");
        assert!(data.sequences().is_empty());
    }

    #[test]
    fn test_load_array_round_trip() {
        let root = TempDir::new().unwrap();
        let key = FrameKey::new("abc", 9).unwrap();
        write_frame(root.path(), &key, &right_hand_only()).unwrap();

        let data = DataRoot::new(root.path());
        let joints_path = data.frame_dir("abc", 9).join("rh_joints.npy");
        let array = data.load_array(&joints_path).unwrap();
        assert_eq!(array.shape(), &[JOINT_COUNT, 3]);
    }
}
