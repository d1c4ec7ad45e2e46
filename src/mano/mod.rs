// Hand-deformation capability
// Trait seam for the MANO layer, a built-in kinematic implementation, and
// the per-frame geometry resolver

pub mod kinematic;
pub mod model;
pub mod resolver;

pub use kinematic::KinematicHandModel;
pub use model::{
    HandDeformation, HandModel, HandModelError, HandSide, JOINT_COUNT, POSE_COEFF_COUNT,
    SHAPE_COEFF_COUNT, TRANSFORM_COUNT, VERTEX_COUNT,
};
pub use resolver::{resolve_frame, FrameGeometry};
