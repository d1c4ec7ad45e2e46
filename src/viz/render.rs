// SVG skeleton rendering
// Orthographic projection of a stored joint array onto a 2D canvas

use ndarray::{ArrayD, ArrayView2, Axis};
use thiserror::Error;

use crate::mano::{HandSide, JOINT_COUNT};

use super::skeleton::{finger_of_bone, BONES, FINGER_COLORS, FINGER_NAMES};

/// Font fallback list used when no explicit fonts are configured. Tried in
/// order by the SVG consumer; the generic family terminates the chain.
pub const DEFAULT_FONT_FALLBACKS: [&str; 4] =
    ["DejaVu Sans", "Noto Sans", "Liberation Sans", "sans-serif"];

/// Explicit rendering configuration, passed at startup.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Canvas size in pixels.
    pub width: u32,
    pub height: u32,

    /// Blank border around the projected skeleton, in pixels.
    pub margin: f32,

    /// Font family chain for joint labels and the legend.
    pub font_families: Vec<String>,

    /// Whether to draw joint index labels.
    pub label_joints: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 800,
            height: 600,
            margin: 40.0,
            font_families: DEFAULT_FONT_FALLBACKS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            label_joints: true,
        }
    }
}

impl RenderConfig {
    /// Override the font chain (empty input keeps the default fallbacks).
    pub fn with_fonts(mut self, fonts: Vec<String>) -> Self {
        if !fonts.is_empty() {
            self.font_families = fonts;
        }
        self
    }

    fn font_family(&self) -> String {
        self.font_families.join(", ")
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Joint array has shape {0:?}, expected ({JOINT_COUNT}, 3)")]
    BadShape(Vec<usize>),
}

/// Render one hand's joint array as an SVG skeleton.
///
/// Accepts `(21, 3)` arrays, squeezing a leading batch dimension of 1. The
/// x/y components are projected orthographically with equal axis scaling,
/// bones are colored per finger, and a finger legend is included.
pub fn render_joints_svg(
    joints: &ArrayD<f32>,
    side: HandSide,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    let view = squeeze(joints)?;

    let points = project(&view, config);
    let font = config.font_family();

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        config.width, config.height, config.width, config.height
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"<rect width="{}" height="{}" fill="white"/>"#,
        config.width, config.height
    ));
    svg.push('\n');

    for (bone_index, &(start, end)) in BONES.iter().enumerate() {
        let (x1, y1) = points[start];
        let (x2, y2) = points[end];
        let color = FINGER_COLORS[finger_of_bone(bone_index)];
        svg.push_str(&format!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="2.5" stroke-opacity="0.8"/>"#,
            x1, y1, x2, y2, color
        ));
        svg.push('\n');
    }

    for (joint, &(x, y)) in points.iter().enumerate() {
        svg.push_str(&format!(
            r##"<circle cx="{:.1}" cy="{:.1}" r="4" fill="#34495e"/>"##,
            x, y
        ));
        svg.push('\n');
        if config.label_joints {
            svg.push_str(&format!(
                r##"<text x="{:.1}" y="{:.1}" font-family="{}" font-size="10" fill="#7f8c8d">{}</text>"##,
                x + 6.0,
                y - 4.0,
                font,
                joint
            ));
            svg.push('\n');
        }
    }

    // Legend: finger swatches plus the hand label.
    for (finger, (name, color)) in FINGER_NAMES.iter().zip(FINGER_COLORS.iter()).enumerate() {
        let y = config.margin + finger as f32 * 18.0;
        svg.push_str(&format!(
            r#"<rect x="{:.1}" y="{:.1}" width="12" height="12" fill="{}"/>"#,
            config.width as f32 - 110.0,
            y,
            color
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r##"<text x="{:.1}" y="{:.1}" font-family="{}" font-size="12" fill="#2c3e50">{}</text>"##,
            config.width as f32 - 92.0,
            y + 10.0,
            font,
            name
        ));
        svg.push('\n');
    }
    svg.push_str(&format!(
        r##"<text x="{:.1}" y="{:.1}" font-family="{}" font-size="14" fill="#2c3e50">{} hand</text>"##,
        config.margin,
        config.margin,
        font,
        side.label()
    ));
    svg.push_str("\n</svg>\n");

    Ok(svg)
}

/// Squeeze an optional leading batch dimension of 1 and check the contract.
fn squeeze(joints: &ArrayD<f32>) -> Result<ArrayView2<'_, f32>, RenderError> {
    let bad_shape = || RenderError::BadShape(joints.shape().to_vec());

    let view = if joints.ndim() == 3 && joints.shape()[0] == 1 {
        joints.index_axis(Axis(0), 0)
    } else {
        joints.view()
    };

    let view = view.into_dimensionality().map_err(|_| bad_shape())?;
    if view.dim() != (JOINT_COUNT, 3) {
        return Err(bad_shape());
    }
    Ok(view)
}

/// Map x/y joint coordinates to canvas pixels, equal aspect, y flipped so
/// +y in hand space points up on screen.
fn project(view: &ArrayView2<'_, f32>, config: &RenderConfig) -> Vec<(f32, f32)> {
    let xs: Vec<f32> = view.column(0).iter().copied().collect();
    let ys: Vec<f32> = view.column(1).iter().copied().collect();

    let min_max = |values: &[f32]| {
        values.iter().fold((f32::MAX, f32::MIN), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
    };
    let (x_lo, x_hi) = min_max(&xs);
    let (y_lo, y_hi) = min_max(&ys);

    let span = (x_hi - x_lo).max(y_hi - y_lo).max(1e-6);
    let usable = (config.width as f32)
        .min(config.height as f32)
        .max(2.0 * config.margin + 1.0)
        - 2.0 * config.margin;
    let scale = usable / span;

    let x_mid = (x_lo + x_hi) / 2.0;
    let y_mid = (y_lo + y_hi) / 2.0;
    let cx = config.width as f32 / 2.0;
    let cy = config.height as f32 / 2.0;

    xs.iter()
        .zip(ys.iter())
        .map(|(&x, &y)| (cx + (x - x_mid) * scale, cy - (y - y_mid) * scale))
        .collect()
}
