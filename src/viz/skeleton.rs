// Hand skeleton topology
// Joint connectivity of the 21-joint hand layout used by stored joint arrays

/// Bone connections over the 21-joint layout: four bones per finger, each
/// chain anchored at the wrist (joint 0).
pub const BONES: [(usize, usize); 20] = [
    // thumb
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    // index
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    // middle
    (0, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    // ring
    (0, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    // pinky
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

pub const FINGER_NAMES: [&str; 5] = ["thumb", "index", "middle", "ring", "pinky"];

/// One stroke color per finger (thumb through pinky).
pub const FINGER_COLORS: [&str; 5] = ["#e74c3c", "#e67e22", "#f1c40f", "#2ecc71", "#3498db"];

/// Which finger a bone belongs to (bones are laid out four per finger).
pub fn finger_of_bone(bone_index: usize) -> usize {
    bone_index / 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bones_reference_valid_joints() {
        for &(start, end) in BONES.iter() {
            assert!(start < 21);
            assert!(end < 21);
            assert_ne!(start, end);
        }
    }

    #[test]
    fn test_four_bones_per_finger() {
        for bone_index in 0..BONES.len() {
            assert!(finger_of_bone(bone_index) < FINGER_NAMES.len());
        }
        assert_eq!(finger_of_bone(0), 0);
        assert_eq!(finger_of_bone(3), 0);
        assert_eq!(finger_of_bone(4), 1);
        assert_eq!(finger_of_bone(19), 4);
    }

    #[test]
    fn test_every_finger_anchors_at_the_wrist() {
        for finger in 0..5 {
            assert_eq!(BONES[finger * 4].0, 0);
        }
    }
}
