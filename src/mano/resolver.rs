// Geometry resolution
// Delegates one frame's parameters to the hand model, once per side

use crate::archive::{FrameParameters, HandParams};

use super::model::{HandDeformation, HandModel, HandSide};

/// Resolved geometry for one frame. A side is `None` when its inputs were
/// absent from the frame's parameters.
#[derive(Debug, Clone, Default)]
pub struct FrameGeometry {
    pub left: Option<HandDeformation>,
    pub right: Option<HandDeformation>,
}

impl FrameGeometry {
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn side(&self, side: HandSide) -> Option<&HandDeformation> {
        match side {
            HandSide::Left => self.left.as_ref(),
            HandSide::Right => self.right.as_ref(),
        }
    }
}

/// Resolve one frame's geometry.
///
/// Each side with pose and shape present gets exactly one model call; a side
/// with null inputs is skipped. Any failure on an attempted side drops the
/// whole frame: the failure is logged with side and frame context and the
/// function returns `None`, so a single bad frame never aborts a batch.
/// Returns `None` as well when neither side was resolvable.
pub fn resolve_frame(
    model: &dyn HandModel,
    frame_id: i64,
    params: &FrameParameters,
) -> Option<FrameGeometry> {
    let left = match resolve_side(model, frame_id, HandSide::Left, &params.left) {
        Ok(deformation) => deformation,
        Err(()) => return None,
    };
    let right = match resolve_side(model, frame_id, HandSide::Right, &params.right) {
        Ok(deformation) => deformation,
        Err(()) => return None,
    };

    let geometry = FrameGeometry { left, right };
    if geometry.is_empty() {
        log::debug!("frame {}: no resolvable hand parameters", frame_id);
        return None;
    }
    Some(geometry)
}

/// One side: `Ok(None)` means skipped for null inputs, `Err(())` means the
/// model call was attempted and failed.
fn resolve_side(
    model: &dyn HandModel,
    frame_id: i64,
    side: HandSide,
    params: &HandParams,
) -> Result<Option<HandDeformation>, ()> {
    if !params.is_resolvable() {
        return Ok(None);
    }

    let pose = params.pose_coeffs.as_deref().unwrap_or_default();
    let betas = params.betas.as_deref().unwrap_or_default();

    match model.deform(pose, betas, side) {
        Ok(deformation) => match deformation.validate() {
            Ok(()) => Ok(Some(deformation)),
            Err(e) => {
                log::error!("frame {}: {} hand geometry invalid: {}", frame_id, side.label(), e);
                Err(())
            }
        },
        Err(e) => {
            log::error!(
                "frame {}: {} hand deformation failed: {}",
                frame_id,
                side.label(),
                e
            );
            Err(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mano::model::{HandModelError, JOINT_COUNT, TRANSFORM_COUNT, VERTEX_COUNT};
    use ndarray::{Array2, Array3};

    /// Stub capability: succeeds with contract-shaped zeros, or fails for a
    /// configured side.
    struct StubModel {
        fail_side: Option<HandSide>,
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

    fn resolvable_params() -> HandParams {
        HandParams {
            pose_coeffs: Some(vec![0.0; 4]),
            tsl: None,
            betas: Some(vec![0.0; 2]),
        }
    }

    #[test]
    fn test_both_sides_resolve() {
        let model = StubModel { fail_side: None };
        let params = FrameParameters {
            left: resolvable_params(),
            right: resolvable_params(),
        };

        let geometry = resolve_frame(&model, 1, &params).unwrap();
        assert!(geometry.left.is_some());
        assert!(geometry.right.is_some());
    }

    #[test]
    fn test_null_side_is_skipped_not_failed() {
        let model = StubModel { fail_side: None };
        let params = FrameParameters {
            left: HandParams::default(),
            right: resolvable_params(),
        };

        let geometry = resolve_frame(&model, 2, &params).unwrap();
        assert!(geometry.left.is_none());
        assert!(geometry.right.is_some());
    }

    #[test]
    fn test_failure_on_one_side_drops_the_frame() {
        let model = StubModel {
            fail_side: Some(HandSide::Left),
        };
        let params = FrameParameters {
            left: resolvable_params(),
            right: resolvable_params(),
        };

        assert!(resolve_frame(&model, 3, &params).is_none());
    }

    #[test]
    fn test_all_null_frame_yields_none() {
        let model = StubModel { fail_side: None };
        let params = FrameParameters::default();

        assert!(resolve_frame(&model, 4, &params).is_none());
    }
}
