// Archive loading
// Deserializes a per-sequence JSON archive into its three top-level collections

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::params::RawManoRecord;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to read archive file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse archive: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A loaded sequence archive.
///
/// One archive per recorded session. All three collections default to empty
/// when the corresponding top-level key is absent; a missing key is not a
/// load failure.
#[derive(Debug, Default, Deserialize)]
pub struct SequenceArchive {
    /// Ordered frame identifiers. May contain gaps; uniqueness is assumed by
    /// convention but not guaranteed by the format.
    #[serde(default)]
    pub frame_id_list: Vec<i64>,

    /// Object descriptors, passed through unchanged.
    #[serde(default)]
    pub obj_list: Vec<serde_json::Value>,

    /// Raw pose-parameter records keyed by frame identifier.
    #[serde(default)]
    pub raw_mano: HashMap<i64, RawManoRecord>,
}

/// Load a sequence archive from disk.
///
/// An unreadable file and a corrupt document are both load failures with the
/// underlying cause attached; the caller aborts processing of that archive
/// only.
pub fn load_archive(path: &Path) -> Result<SequenceArchive, ArchiveError> {
    let contents = fs::read_to_string(path)?;
    let archive = serde_json::from_str(&contents)?;
    Ok(archive)
}
