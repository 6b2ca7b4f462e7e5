use anyhow::{bail, Result};

use crate::runtime::RenderPolicy;

/// Output color handling for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Follow ShaderToy expectations: shader output is already display-encoded.
    #[default]
    Auto,
    /// Treat shader outputs as gamma-encoded and quantise them directly.
    Gamma,
    /// Treat shader outputs as linear light and apply the sRGB transfer curve.
    Linear,
}

impl ColorSpaceMode {
    /// Maps one clamped channel value into the encoding written to 8-bit files.
    pub fn encode(self, value: f32) -> f32 {
        match self {
            ColorSpaceMode::Auto | ColorSpaceMode::Gamma => value,
            ColorSpaceMode::Linear => linear_to_srgb(value),
        }
    }
}

impl std::fmt::Display for ColorSpaceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorSpaceMode::Auto => f.write_str("auto"),
            ColorSpaceMode::Gamma => f.write_str("gamma"),
            ColorSpaceMode::Linear => f.write_str("linear"),
        }
    }
}

impl std::str::FromStr for ColorSpaceMode {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ColorSpaceMode::Auto),
            "gamma" => Ok(ColorSpaceMode::Gamma),
            "linear" => Ok(ColorSpaceMode::Linear),
            other => Err(format!(
                "unknown color space '{other}' (expected auto, gamma or linear)"
            )),
        }
    }
}

fn linear_to_srgb(value: f32) -> f32 {
    if value <= 0.003_130_8 {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors CLI flags and config-file values: how large the
/// output should be, how finely to sample it, how to encode colour and which
/// frames to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Output image size in pixels.
    pub surface_size: (u32, u32),
    /// Fraction of the surface resolution the shader is evaluated at.
    pub render_scale: f32,
    /// Desired color handling for 8-bit output.
    pub color_space: ColorSpaceMode,
    /// Worker thread count; `None` lets rayon pick.
    pub threads: Option<usize>,
    /// High-level render behaviour requested by the caller.
    pub policy: RenderPolicy,
}

impl RendererConfig {
    /// Size the shader is actually evaluated at once `render_scale` applies.
    pub fn render_size(&self) -> (u32, u32) {
        let (width, height) = self.surface_size;
        if self.render_scale >= 1.0 {
            return (width, height);
        }
        let scale = |extent: u32| ((extent as f32 * self.render_scale).ceil() as u32).max(1);
        (scale(width), scale(height))
    }

    /// Rejects configurations that cannot produce a frame.
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.surface_size;
        if width == 0 || height == 0 {
            bail!("surface size must be non-zero (got {width}x{height})");
        }
        if !(self.render_scale > 0.0 && self.render_scale <= 1.0) {
            bail!(
                "render scale must be in (0, 1] (got {})",
                self.render_scale
            );
        }
        if self.threads == Some(0) {
            bail!("thread count must be at least 1");
        }
        self.policy.validate()
    }
}

impl Default for RendererConfig {
    /// Provides a 1080p still frame at time zero.
    fn default() -> Self {
        Self {
            surface_size: (1920, 1080),
            render_scale: 1.0,
            color_space: ColorSpaceMode::default(),
            threads: None,
            policy: RenderPolicy::default(),
        }
    }
}
