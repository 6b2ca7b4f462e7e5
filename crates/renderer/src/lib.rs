//! Offline host for per-pixel shaders.
//!
//! The renderer evaluates a [`PixelShader`] for every pixel centre of a frame
//! on a rayon pool and writes the result to disk. The overall flow is:
//!
//! ```text
//!   CLI / trifade
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ TimeSource ──▶ raster::rasterize ──▶ Frame
//!                                                            │
//!                       export::export_frame ◀── (resize) ◀──┘
//!                       sequence::export_sequence ─▶ writer thread
//! ```
//!
//! `Renderer` owns the thread pool and the shader; the policy inside
//! [`RendererConfig`] decides whether one frame stays in memory, one frame is
//! exported, or a numbered sequence is written.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use kernel::{FrameInputs, PixelShader, Resolution, Vec2, Vec4};

pub mod export;
pub mod frame;
pub mod raster;
pub mod runtime;
pub mod sequence;
pub mod types;

pub use export::export_frame;
pub use frame::Frame;
pub use runtime::{
    time_source_for_policy, BoxedTimeSource, ExportFormat, FixedTimeSource, RenderPolicy,
    SteppedTimeSource, TimeSample, TimeSource,
};
pub use sequence::{frame_file_name, ManifestFrame, SequenceManifest, MANIFEST_FILE};
pub use types::{ColorSpaceMode, RendererConfig};

use sequence::SequenceRequest;

/// Outcome of [`Renderer::run`].
#[derive(Debug)]
pub struct RenderReport {
    pub frames_rendered: u64,
    /// Files written, in order; sequences end with their manifest.
    pub outputs: Vec<PathBuf>,
    pub elapsed: Duration,
    /// The frame produced by still and export policies.
    pub frame: Option<Frame>,
}

/// Entry point that evaluates a shader according to a [`RendererConfig`].
pub struct Renderer {
    config: RendererConfig,
    shader: Arc<dyn PixelShader>,
    pool: rayon::ThreadPool,
}

impl Renderer {
    /// Validates `config` and prepares the worker pool.
    pub fn new(config: RendererConfig, shader: Arc<dyn PixelShader>) -> Result<Self> {
        config.validate()?;
        let pool = raster::build_thread_pool(config.threads)?;
        tracing::debug!(
            shader = shader.name(),
            uniforms = ?shader.uniforms_required(),
            threads = pool.current_num_threads(),
            "renderer ready"
        );
        Ok(Self {
            config,
            shader,
            pool,
        })
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn shader_name(&self) -> &str {
        self.shader.name()
    }

    /// Shades one frame at `time`, resampled to the surface size.
    pub fn render_frame(&self, time: f32) -> Result<Frame> {
        let (render_width, render_height) = self.config.render_size();
        let frame = raster::rasterize(
            self.shader.as_ref(),
            render_width,
            render_height,
            time,
            &self.pool,
        )?;
        let (width, height) = self.config.surface_size;
        frame.resized(width, height)
    }

    /// Colour of the surface pixel at column `x`, row `y` (top-left origin).
    ///
    /// Evaluates the shader at full surface resolution regardless of
    /// `render_scale`.
    pub fn probe(&self, x: u32, y: u32, time: f32) -> Result<Vec4> {
        let (width, height) = self.config.surface_size;
        if x >= width || y >= height {
            bail!("pixel ({x}, {y}) lies outside the {width}x{height} surface");
        }
        let inputs = FrameInputs::new(time, Resolution::new(width as f32, height as f32));
        let frag_coord = Vec2::new(x as f32 + 0.5, (height - 1 - y) as f32 + 0.5);
        Ok(self.shader.shade(frag_coord, &inputs))
    }

    /// Executes the configured policy.
    pub fn run(&self) -> Result<RenderReport> {
        let started = Instant::now();
        let (width, height) = self.config.surface_size;
        let mut clock = time_source_for_policy(&self.config.policy)?;

        let report = match &self.config.policy {
            RenderPolicy::Still { .. } => {
                let sample = clock.sample();
                tracing::info!(width, height, time = sample.seconds, "rendering still frame");
                let frame = self.render_frame(sample.seconds)?;
                RenderReport {
                    frames_rendered: 1,
                    outputs: Vec::new(),
                    elapsed: started.elapsed(),
                    frame: Some(frame),
                }
            }
            RenderPolicy::Export { path, format, .. } => {
                let sample = clock.sample();
                tracing::info!(
                    width,
                    height,
                    time = sample.seconds,
                    path = %path.display(),
                    "exporting frame"
                );
                let frame = self.render_frame(sample.seconds)?;
                export_frame(&frame, path, *format, self.config.color_space)?;
                RenderReport {
                    frames_rendered: 1,
                    outputs: vec![path.clone()],
                    elapsed: started.elapsed(),
                    frame: Some(frame),
                }
            }
            RenderPolicy::Sequence {
                start,
                fps,
                frames,
                directory,
                format,
            } => {
                tracing::info!(
                    width,
                    height,
                    start,
                    fps,
                    frames,
                    directory = %directory.display(),
                    "exporting sequence"
                );
                let outputs = sequence::export_sequence(
                    self,
                    clock.as_mut(),
                    SequenceRequest {
                        start: *start,
                        fps: *fps,
                        frames: *frames,
                        directory,
                        format: *format,
                    },
                )?;
                RenderReport {
                    frames_rendered: u64::from(*frames),
                    outputs,
                    elapsed: started.elapsed(),
                    frame: None,
                }
            }
        };

        tracing::info!(
            frames = report.frames_rendered,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "render finished"
        );
        Ok(report)
    }
}
