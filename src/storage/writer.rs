// Frame record writer
// Serializes resolved geometry into the frame-indexed directory layout

use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use ndarray_npy::{ReadNpyError, WriteNpyError, WriteNpyExt};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::mano::{FrameGeometry, HandSide};

use super::key::{FrameKey, KeyError};
use super::manifest::{AvailableData, DataKind, FrameSummary, SUMMARY_FILE};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Artifact serialization failed: {0}")]
    Npy(#[from] WriteNpyError),

    #[error("Artifact read failed: {0}")]
    NpyRead(#[from] ReadNpyError),

    #[error("Invalid storage key: {0}")]
    Key(#[from] KeyError),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Write one frame record under the storage root.
///
/// Idempotent: directories are created if absent and a re-run overwrites the
/// same files in place. Artifacts are written in stable order (right hand
/// before left; vertices, joints, transforms within each hand), then the
/// manifest enumerating exactly what was written. A manifest write failure
/// propagates; partial artifact sets without a manifest are a
/// valid-but-incomplete state the reader tolerates.
pub fn write_frame(
    root: &Path,
    key: &FrameKey,
    geometry: &FrameGeometry,
) -> StorageResult<FrameSummary> {
    let frame_dir = root.join(key.relative_path());
    fs::create_dir_all(&frame_dir)?;

    let mut available_data = Vec::new();
    for side in [HandSide::Right, HandSide::Left] {
        let Some(deformation) = geometry.side(side) else {
            continue;
        };
        for kind in DataKind::ORDERED {
            let bytes = match kind {
                DataKind::Vertices => npy_bytes(&deformation.vertices)?,
                DataKind::Joints => npy_bytes(&deformation.joints)?,
                DataKind::TransformsAbs => npy_bytes(&deformation.transforms_abs)?,
            };

            let file_name = kind.file_name(side);
            fs::write(frame_dir.join(&file_name), &bytes)?;

            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            log::debug!(
                "stored {} ({} bytes, sha256 {})",
                frame_dir.join(&file_name).display(),
                bytes.len(),
                hex::encode(hasher.finalize())
            );

            available_data.push(AvailableData {
                kind,
                hand: side,
                file: file_name,
            });
        }
    }

    let summary = FrameSummary {
        sequence_id: key.sequence_id().to_string(),
        frame_id: key.frame_id(),
        timestamp: dir_mtime_secs(&frame_dir),
        available_data,
    };

    let manifest = serde_json::to_string_pretty(&summary)?;
    fs::write(frame_dir.join(SUMMARY_FILE), manifest)?;

    Ok(summary)
}

fn npy_bytes<T: WriteNpyExt>(array: &T) -> Result<Vec<u8>, WriteNpyError> {
    let mut buf = Vec::new();
    array.write_npy(&mut buf)?;
    Ok(buf)
}

/// Modification time of the frame directory as seconds since the epoch.
/// Advisory only; `None` when the filesystem cannot report it.
fn dir_mtime_secs(dir: &Path) -> Option<f64> {
    let modified = fs::metadata(dir).ok()?.modified().ok()?;
    modified
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs_f64())
}
