// Per-frame parameter extraction
// Looks up and normalizes the six optional pose/shape fields for each hand side

use std::collections::HashMap;

use serde::Deserialize;

/// A raw per-frame record as stored in the archive.
///
/// Any of the six fields may be absent; absence propagates through
/// normalization rather than erroring.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawManoRecord {
    #[serde(rename = "rh__pose_coeffs", default)]
    pub rh_pose_coeffs: Option<Vec<f32>>,

    #[serde(rename = "lh__pose_coeffs", default)]
    pub lh_pose_coeffs: Option<Vec<f32>>,

    #[serde(rename = "rh__tsl", default)]
    pub rh_tsl: Option<Vec<f32>>,

    #[serde(rename = "lh__tsl", default)]
    pub lh_tsl: Option<Vec<f32>>,

    #[serde(rename = "rh__betas", default)]
    pub rh_betas: Option<Vec<f32>>,

    #[serde(rename = "lh__betas", default)]
    pub lh_betas: Option<Vec<f32>>,
}

/// Normalized parameters for one hand side.
#[derive(Debug, Clone, Default)]
pub struct HandParams {
    /// Joint rotation coefficients for this frame.
    pub pose_coeffs: Option<Vec<f32>>,

    /// Global translation of the hand root.
    pub tsl: Option<Vec<f32>>,

    /// Shape coefficients, typically constant across a subject's frames.
    pub betas: Option<Vec<f32>>,
}

impl HandParams {
    /// Whether this side carries everything the deformation call needs.
    /// Translation is carried through but not required by the model call.
    pub fn is_resolvable(&self) -> bool {
        self.pose_coeffs.is_some() && self.betas.is_some()
    }
}

/// Normalized parameters for one frame, both sides.
#[derive(Debug, Clone, Default)]
pub struct FrameParameters {
    pub left: HandParams,
    pub right: HandParams,
}

/// Look up the parameters recorded for `frame_id`.
///
/// Returns `None` when the identifier is absent from the mapping — distinct
/// from the identifier being present with all-null fields, which yields a
/// `FrameParameters` full of `None`s. Pure lookup; the mapping is never
/// mutated.
pub fn extract_frame_params(
    frame_id: i64,
    raw_mano: &HashMap<i64, RawManoRecord>,
) -> Option<FrameParameters> {
    let record = raw_mano.get(&frame_id)?;

    Some(FrameParameters {
        left: HandParams {
            pose_coeffs: record.lh_pose_coeffs.clone(),
            tsl: record.lh_tsl.clone(),
            betas: record.lh_betas.clone(),
        },
        right: HandParams {
            pose_coeffs: record.rh_pose_coeffs.clone(),
            tsl: record.rh_tsl.clone(),
            betas: record.rh_betas.clone(),
        },
    })
}
