// Hand model contract
// The deformation capability maps pose + shape coefficients to 3D geometry

use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deformed mesh surface points per hand. Fixed by the model topology.
pub const VERTEX_COUNT: usize = 778;

/// Skeletal joints per hand (16 articulated joints plus 5 fingertips).
pub const JOINT_COUNT: usize = 21;

/// Per-joint absolute rigid transforms, one per articulated joint.
pub const TRANSFORM_COUNT: usize = 16;

/// Pose coefficients: one quaternion per articulated joint, flattened.
pub const POSE_COEFF_COUNT: usize = TRANSFORM_COUNT * 4;

/// Shape coefficients per subject.
pub const SHAPE_COEFF_COUNT: usize = 10;

/// Which of the two hands a record or artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    /// Artifact file-name prefix ("lh" / "rh").
    pub fn prefix(&self) -> &'static str {
        match self {
            HandSide::Left => "lh",
            HandSide::Right => "rh",
        }
    }

    /// Manifest label ("left" / "right").
    pub fn label(&self) -> &'static str {
        match self {
            HandSide::Left => "left",
            HandSide::Right => "right",
        }
    }

    /// Parse an artifact prefix back to a side.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "lh" => Some(HandSide::Left),
            "rh" => Some(HandSide::Right),
            _ => None,
        }
    }
}

/// Errors raised by a hand-model implementation.
#[derive(Debug, Error)]
pub enum HandModelError {
    #[error("Invalid pose coefficients: {0}")]
    InvalidPose(String),

    #[error("Invalid shape coefficients: {0}")]
    InvalidShape(String),

    #[error("Deformation failed: {0}")]
    DeformationFailed(String),
}

/// Geometry produced by one deformation call for one side.
///
/// Arrays are plain owned tensors; implementations backed by an accelerator
/// must detach and copy before constructing this.
#[derive(Debug, Clone)]
pub struct HandDeformation {
    /// Deformed mesh surface, shape (778, 3), root relative.
    pub vertices: Array2<f32>,

    /// Skeletal joint positions, shape (21, 3), root relative.
    pub joints: Array2<f32>,

    /// Absolute per-joint rigid transforms, shape (16, 4, 4), root relative.
    pub transforms_abs: Array3<f32>,
}

impl HandDeformation {
    /// Check the dimensional contract. Counts must match across all frames
    /// and both sides; a mismatch is treated as a deformation failure.
    pub fn validate(&self) -> Result<(), HandModelError> {
        if self.vertices.dim() != (VERTEX_COUNT, 3) {
            return Err(HandModelError::DeformationFailed(format!(
                "vertices shape {:?}, expected ({}, 3)",
                self.vertices.dim(),
                VERTEX_COUNT
            )));
        }
        if self.joints.dim() != (JOINT_COUNT, 3) {
            return Err(HandModelError::DeformationFailed(format!(
                "joints shape {:?}, expected ({}, 3)",
                self.joints.dim(),
                JOINT_COUNT
            )));
        }
        if self.transforms_abs.dim() != (TRANSFORM_COUNT, 4, 4) {
            return Err(HandModelError::DeformationFailed(format!(
                "transforms shape {:?}, expected ({}, 4, 4)",
                self.transforms_abs.dim(),
                TRANSFORM_COUNT
            )));
        }
        Ok(())
    }
}

/// The hand-deformation capability.
///
/// Modeled as a pure function `(pose, shape, side) -> geometry` that may
/// fail. The resolver is written against this seam so it can be exercised
/// with a stub; the built-in [`crate::mano::KinematicHandModel`] is the
/// default implementation.
pub trait HandModel {
    fn deform(
        &self,
        pose: &[f32],
        shape: &[f32],
        side: HandSide,
    ) -> Result<HandDeformation, HandModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    #[test]
    fn test_side_prefix_round_trip() {
        for side in [HandSide::Left, HandSide::Right] {
            assert_eq!(HandSide::from_prefix(side.prefix()), Some(side));
        }
        assert_eq!(HandSide::from_prefix("xh"), None);
    }

    #[test]
    fn test_validate_accepts_contract_shapes() {
        let deformation = HandDeformation {
            vertices: Array2::zeros((VERTEX_COUNT, 3)),
            joints: Array2::zeros((JOINT_COUNT, 3)),
            transforms_abs: Array3::zeros((TRANSFORM_COUNT, 4, 4)),
        };
        assert!(deformation.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_joint_count() {
        let deformation = HandDeformation {
            vertices: Array2::zeros((VERTEX_COUNT, 3)),
            joints: Array2::zeros((20, 3)),
            transforms_abs: Array3::zeros((TRANSFORM_COUNT, 4, 4)),
        };
        assert!(deformation.validate().is_err());
    }
}
