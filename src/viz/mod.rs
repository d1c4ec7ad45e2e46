// Skeleton visualization
// Topology constants and SVG rendering for stored joint arrays

pub mod render;
pub mod skeleton;

pub use render::{render_joints_svg, RenderConfig, RenderError, DEFAULT_FONT_FALLBACKS};
pub use skeleton::{finger_of_bone, BONES, FINGER_COLORS, FINGER_NAMES};
