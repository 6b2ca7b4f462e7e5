//! Frame compositor: normalises the pixel, stacks four zooming layers and maps
//! the accumulated intensity to colour.
//!
//! Layers cycle through a looping phase `z = fract(phase + time * 0.02)`.
//! As `z` advances a layer shrinks its grid scale from 10 to 0.5, which reads
//! as flying forward through the pattern; the fade window hides the jump when
//! `z` wraps back to 0.

use crate::layer::layer;
use crate::math::{fract, mix, smoothstep, Vec2, Vec3, Vec4};

/// Radians per second of the global rotation, also the layer phase speed.
pub const DRIFT_SPEED: f32 = 0.02;

/// Phase offsets of the four stacked layers.
pub const LAYER_PHASES: [f32; 4] = [0.0, 0.25, 0.5, 0.75];

const FAR_SIZE: f32 = 10.0;
const NEAR_SIZE: f32 = 0.5;
const LAYER_OFFSET: f32 = 10.0;
const LAYER_GAIN: f32 = 0.35;
const GRADIENT_GAIN: f32 = 0.25;

/// Viewport resolution as supplied by the host: width, height, pixel aspect.
///
/// The pixel aspect is carried for interface parity and never read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution(pub Vec3);

impl Resolution {
    pub const fn new(width: f32, height: f32) -> Self {
        Self(Vec3::new(width, height, 1.0))
    }

    pub const fn with_pixel_aspect(width: f32, height: f32, aspect: f32) -> Self {
        Self(Vec3::new(width, height, aspect))
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.0.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.0.y
    }

    #[inline]
    pub fn xy(&self) -> Vec2 {
        self.0.xy()
    }
}

/// Read-only per-frame inputs shared by every pixel of a frame.
///
/// Callers guarantee `resolution.height() > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    pub time: f32,
    pub resolution: Resolution,
}

impl FrameInputs {
    pub const fn new(time: f32, resolution: Resolution) -> Self {
        Self { time, resolution }
    }
}

/// Scale, fade and looping phase of one layer at a given time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSchedule {
    pub phase: f32,
    pub z: f32,
    pub size: f32,
    pub fade: f32,
}

impl LayerSchedule {
    pub fn at(phase: f32, time: f32) -> Self {
        let z = fract(phase + time * DRIFT_SPEED);
        Self {
            phase,
            z,
            size: mix(FAR_SIZE, NEAR_SIZE, z),
            fade: fade(z),
        }
    }

    /// Maps a rotated screen coordinate into this layer's grid space.
    #[inline]
    pub fn project(&self, uv: Vec2) -> Vec2 {
        uv * self.size + self.phase * LAYER_OFFSET
    }
}

/// Fade-in over `z ∈ [0, 0.5]`, fade-out over `z ∈ [0.8, 1]`.
#[inline]
pub fn fade(z: f32) -> f32 {
    smoothstep(0.0, 0.5, z) * smoothstep(1.0, 0.8, z)
}

/// Tints applied to the layer intensity and the gradient term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub base: Vec3,
    pub gradient: Vec3,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            base: Vec3::new(0.845, 0.156, 0.167) * 0.8 + 0.6,
            gradient: Vec3::new(0.045, 0.056, 0.967) * 0.8 + 0.6,
        }
    }
}

/// Centres the origin and scales by height so one unit spans the viewport height.
#[inline]
pub fn normalize(frag_coord: Vec2, resolution: &Resolution) -> Vec2 {
    (frag_coord - resolution.xy() * 0.5) / resolution.height()
}

/// Band term subtracted through the gradient tint: `min(-y, y) * 0.25`.
#[inline]
pub fn gradient(uv: Vec2) -> f32 {
    (-uv.y).min(uv.y) * GRADIENT_GAIN
}

/// Total layer intensity at a normalised coordinate.
pub fn intensity(uv: Vec2, time: f32) -> f32 {
    let uv = uv.rotate(time * DRIFT_SPEED);
    let mut m = 0.0;
    for phase in LAYER_PHASES {
        let schedule = LayerSchedule::at(phase, time);
        m += layer(schedule.project(uv), time) * schedule.fade * LAYER_GAIN;
    }
    m
}

/// Colour for the pixel at `frag_coord` using the default palette.
pub fn render(frag_coord: Vec2, inputs: &FrameInputs) -> Vec4 {
    render_with_palette(frag_coord, inputs, &Palette::default())
}

pub fn render_with_palette(frag_coord: Vec2, inputs: &FrameInputs, palette: &Palette) -> Vec4 {
    let uv = normalize(frag_coord, &inputs.resolution);
    let band = gradient(uv);
    let m = intensity(uv, inputs.time);
    let color = m * palette.base - palette.gradient * band;
    color.extend(1.0)
}
