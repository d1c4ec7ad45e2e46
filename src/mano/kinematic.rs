// Built-in kinematic hand model
// Quaternion forward kinematics over a canonical 16-joint rig, with derived
// fingertips and a procedural surface honoring the dimensional contract.
// The real MANO layer plugs in behind the same HandModel trait.

use nalgebra::{Isometry3, Point3, Quaternion, Translation3, UnitQuaternion, Vector3};
use ndarray::{Array2, Array3};

use super::model::{
    HandDeformation, HandModel, HandModelError, HandSide, JOINT_COUNT, POSE_COEFF_COUNT,
    SHAPE_COEFF_COUNT, TRANSFORM_COUNT, VERTEX_COUNT,
};

/// Parent of each articulated joint. Joint 0 is the wrist root; finger
/// chains run root -> proximal -> middle -> distal.
const PARENTS: [usize; TRANSFORM_COUNT] = [0, 0, 1, 2, 0, 4, 5, 0, 7, 8, 0, 10, 11, 0, 13, 14];

/// Rest offsets from each joint's parent, right hand, meters. Fingers point
/// along +x; +y spreads toward the thumb side.
const REST_OFFSETS: [[f32; 3]; TRANSFORM_COUNT] = [
    [0.0, 0.0, 0.0],        // wrist
    [0.025, 0.028, -0.010], // thumb proximal
    [0.035, 0.012, -0.006], // thumb middle
    [0.030, 0.008, -0.002], // thumb distal
    [0.095, 0.025, 0.0],    // index proximal
    [0.038, 0.0, 0.0],      // index middle
    [0.027, 0.0, 0.0],      // index distal
    [0.100, 0.0, 0.0],      // middle proximal
    [0.042, 0.0, 0.0],      // middle middle
    [0.029, 0.0, 0.0],      // middle distal
    [0.095, -0.025, 0.0],   // ring proximal
    [0.039, 0.0, 0.0],      // ring middle
    [0.027, 0.0, 0.0],      // ring distal
    [0.087, -0.048, 0.0],   // pinky proximal
    [0.030, 0.0, 0.0],      // pinky middle
    [0.021, 0.0, 0.0],      // pinky distal
];

/// Distal joint of each finger and the fingertip extension length, in the
/// thumb/index/middle/ring/pinky order of the 21-joint layout.
const FINGER_TIPS: [(usize, f32); 5] = [(3, 0.030), (6, 0.024), (9, 0.026), (12, 0.024), (15, 0.020)];

/// Built-in implementation of the deformation capability.
///
/// Deterministic: identical inputs always produce identical geometry, which
/// keeps re-derived frame records byte-identical on disk.
#[derive(Debug, Default)]
pub struct KinematicHandModel;

impl KinematicHandModel {
    pub fn new() -> Self {
        KinematicHandModel
    }
}

impl HandModel for KinematicHandModel {
    fn deform(
        &self,
        pose: &[f32],
        shape: &[f32],
        side: HandSide,
    ) -> Result<HandDeformation, HandModelError> {
        let rotations = parse_pose(pose)?;
        let (palm_scale, finger_scale) = parse_shape(shape)?;

        // Forward kinematics over the articulated chain.
        let mirror = if side == HandSide::Left { -1.0 } else { 1.0 };
        let mut globals: Vec<Isometry3<f32>> = Vec::with_capacity(TRANSFORM_COUNT);
        for joint in 0..TRANSFORM_COUNT {
            let rest = REST_OFFSETS[joint];
            let scale = if PARENTS[joint] == 0 && joint != 0 {
                palm_scale
            } else {
                palm_scale * finger_scale
            };
            let offset = Vector3::new(rest[0] * scale, rest[1] * scale * mirror, rest[2] * scale);
            let local = Isometry3::from_parts(Translation3::from(offset), rotations[joint]);
            let global = if joint == 0 {
                local
            } else {
                globals[PARENTS[joint]] * local
            };
            globals.push(global);
        }

        let mut transforms_abs = Array3::zeros((TRANSFORM_COUNT, 4, 4));
        for (joint, global) in globals.iter().enumerate() {
            let homogeneous = global.to_homogeneous();
            for row in 0..4 {
                for col in 0..4 {
                    transforms_abs[[joint, row, col]] = homogeneous[(row, col)];
                }
            }
        }

        let joints = joint_positions(&globals, finger_scale * palm_scale);
        let vertices = surface_points(&joints);

        let deformation = HandDeformation {
            vertices,
            joints,
            transforms_abs,
        };
        deformation.validate()?;
        Ok(deformation)
    }
}

/// Decode the flat pose vector into one unit quaternion per joint,
/// stored as [w, x, y, z] groups.
fn parse_pose(pose: &[f32]) -> Result<Vec<UnitQuaternion<f32>>, HandModelError> {
    if pose.len() != POSE_COEFF_COUNT {
        return Err(HandModelError::InvalidPose(format!(
            "expected {} coefficients, got {}",
            POSE_COEFF_COUNT,
            pose.len()
        )));
    }
    if pose.iter().any(|v| !v.is_finite()) {
        return Err(HandModelError::InvalidPose(
            "non-finite coefficient".to_string(),
        ));
    }

    let mut rotations = Vec::with_capacity(TRANSFORM_COUNT);
    for joint in 0..TRANSFORM_COUNT {
        let q = &pose[joint * 4..joint * 4 + 4];
        let quat = Quaternion::new(q[0], q[1], q[2], q[3]);
        let unit = UnitQuaternion::try_new(quat, 1e-6).ok_or_else(|| {
            HandModelError::InvalidPose(format!("zero-norm quaternion at joint {}", joint))
        })?;
        rotations.push(unit);
    }
    Ok(rotations)
}

/// Reduce the shape vector to palm and finger scale factors.
fn parse_shape(shape: &[f32]) -> Result<(f32, f32), HandModelError> {
    if shape.len() != SHAPE_COEFF_COUNT {
        return Err(HandModelError::InvalidShape(format!(
            "expected {} coefficients, got {}",
            SHAPE_COEFF_COUNT,
            shape.len()
        )));
    }
    if shape.iter().any(|v| !v.is_finite()) {
        return Err(HandModelError::InvalidShape(
            "non-finite coefficient".to_string(),
        ));
    }

    let palm_scale = (1.0 + 0.05 * shape[0]).clamp(0.5, 2.0);
    let finger_scale = (1.0 + 0.03 * shape[1]).clamp(0.5, 2.0);
    Ok((palm_scale, finger_scale))
}

/// Assemble the 21-joint layout: wrist, then four joints per finger
/// (proximal, middle, distal, tip) in thumb/index/middle/ring/pinky order.
fn joint_positions(globals: &[Isometry3<f32>], tip_scale: f32) -> Array2<f32> {
    let mut joints = Array2::zeros((JOINT_COUNT, 3));

    let write = |joints: &mut Array2<f32>, slot: usize, p: Point3<f32>| {
        joints[[slot, 0]] = p.x;
        joints[[slot, 1]] = p.y;
        joints[[slot, 2]] = p.z;
    };

    write(&mut joints, 0, Point3::from(globals[0].translation.vector));
    for (finger, &(distal, tip_len)) in FINGER_TIPS.iter().enumerate() {
        let base_slot = 1 + finger * 4;
        for link in 0..3 {
            let joint = distal - 2 + link;
            write(
                &mut joints,
                base_slot + link,
                Point3::from(globals[joint].translation.vector),
            );
        }
        // Tips extend the distal bone along its local +x.
        let tip = globals[distal] * Point3::new(tip_len * tip_scale, 0.0, 0.0);
        write(&mut joints, base_slot + 3, tip);
    }

    joints
}

/// Distribute surface points around the skeleton: rings of points along each
/// bone with radius tapering toward the tips. Exactly VERTEX_COUNT points,
/// fully determined by the joint positions.
fn surface_points(joints: &Array2<f32>) -> Array2<f32> {
    // The 20 bones of the 21-joint layout: wrist to each finger root, then
    // along each finger chain.
    let mut bones: Vec<(usize, usize)> = Vec::with_capacity(20);
    for finger in 0..5 {
        let base = 1 + finger * 4;
        bones.push((0, base));
        bones.push((base, base + 1));
        bones.push((base + 1, base + 2));
        bones.push((base + 2, base + 3));
    }

    let joint = |idx: usize| Vector3::new(joints[[idx, 0]], joints[[idx, 1]], joints[[idx, 2]]);

    let mut vertices = Array2::zeros((VERTEX_COUNT, 3));
    for i in 0..VERTEX_COUNT {
        let (start_idx, end_idx) = bones[i % bones.len()];
        let start = joint(start_idx);
        let end = joint(end_idx);
        let along = end - start;

        let ring = (i / bones.len()) as f32 / (VERTEX_COUNT / bones.len()) as f32;
        let center = start + along * ring;

        // Radial frame perpendicular to the bone; golden-angle spacing keeps
        // successive points from clustering.
        let dir = along.try_normalize(1e-9).unwrap_or(Vector3::x());
        let reference = if dir.z.abs() < 0.9 {
            Vector3::z()
        } else {
            Vector3::y()
        };
        let n1 = dir.cross(&reference).normalize();
        let n2 = dir.cross(&n1);

        let radius = if start_idx == 0 { 0.012 } else { 0.008 } * (1.0 - 0.3 * ring);
        let theta = i as f32 * 2.399_963_2;
        let point = center + (n1 * theta.cos() + n2 * theta.sin()) * radius;

        vertices[[i, 0]] = point.x;
        vertices[[i, 1]] = point.y;
        vertices[[i, 2]] = point.z;
    }

    vertices
}
