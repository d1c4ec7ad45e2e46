// Frame manifest
// The summary.json sidecar enumerating what was written for a frame

use serde::{Deserialize, Serialize};

use crate::mano::HandSide;

/// File name of the manifest inside every frame directory.
pub const SUMMARY_FILE: &str = "summary.json";

/// Kind of numeric artifact stored for a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Vertices,
    Joints,
    TransformsAbs,
}

impl DataKind {
    /// Stable write order within one hand.
    pub const ORDERED: [DataKind; 3] = [DataKind::Vertices, DataKind::Joints, DataKind::TransformsAbs];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Vertices => "vertices",
            DataKind::Joints => "joints",
            DataKind::TransformsAbs => "transforms_abs",
        }
    }

    /// Artifact file name for this kind on the given side,
    /// e.g. `rh_vertices.npy`.
    pub fn file_name(&self, side: HandSide) -> String {
        format!("{}_{}.npy", side.prefix(), self.as_str())
    }
}

/// One manifest entry per artifact actually written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableData {
    #[serde(rename = "type")]
    pub kind: DataKind,

    /// "left" or "right".
    pub hand: HandSide,

    /// Artifact file name relative to the frame directory.
    pub file: String,
}

/// The persisted manifest for one frame record.
///
/// Advisory metadata: the timestamp reflects filesystem state at write time
/// and is never used for correctness elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSummary {
    pub sequence_id: String,
    pub frame_id: i64,
    pub timestamp: Option<f64>,
    pub available_data: Vec<AvailableData>,
}
