use crate::compositor::{self, FrameInputs};
use crate::math::{Vec2, Vec4};

/// Per-frame values a shader reads from its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uniform {
    Resolution,
    Time,
}

impl std::fmt::Display for Uniform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Uniform::Resolution => f.write_str("resolution"),
            Uniform::Time => f.write_str("time"),
        }
    }
}

/// A stateless per-pixel program.
///
/// `shade` must be a pure function of its arguments so hosts can evaluate
/// pixels in any order and on any thread.
pub trait PixelShader: Send + Sync {
    /// Stable identifier used in logs and export manifests.
    fn name(&self) -> &str;

    /// Uniforms the shader reads; hosts may skip supplying the rest.
    fn uniforms_required(&self) -> &[Uniform];

    /// Colour of the pixel whose centre sits at `frag_coord` (bottom-left origin).
    fn shade(&self, frag_coord: Vec2, inputs: &FrameInputs) -> Vec4;
}

/// The flickering line and triangle background.
#[derive(Debug, Clone, Copy, Default)]
pub struct FadingTriangles;

impl FadingTriangles {
    pub const NAME: &'static str = "fading-triangles";
    const UNIFORMS: [Uniform; 2] = [Uniform::Resolution, Uniform::Time];
}

impl PixelShader for FadingTriangles {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn uniforms_required(&self) -> &[Uniform] {
        &Self::UNIFORMS
    }

    fn shade(&self, frag_coord: Vec2, inputs: &FrameInputs) -> Vec4 {
        compositor::render(frag_coord, inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::Resolution;

    #[test]
    fn declares_resolution_and_time() {
        let shader = FadingTriangles;
        assert_eq!(shader.name(), "fading-triangles");
        assert_eq!(
            shader.uniforms_required(),
            &[Uniform::Resolution, Uniform::Time]
        );
    }

    #[test]
    fn shade_delegates_to_compositor() {
        let inputs = FrameInputs::new(4.0, Resolution::new(320.0, 200.0));
        let p = Vec2::new(100.5, 60.5);
        let boxed: Box<dyn PixelShader> = Box::new(FadingTriangles);
        assert_eq!(boxed.shade(p, &inputs), compositor::render(p, &inputs));
    }
}
