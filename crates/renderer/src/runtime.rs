use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

/// High-level behaviour requested by the caller.
///
/// The render policy decides whether a single frame is evaluated in memory,
/// written to disk, or a numbered sequence of frames is exported.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPolicy {
    /// Render a single frame and keep it in memory.
    Still {
        /// Specific timestamp to evaluate the shader at (seconds).
        time: Option<f32>,
    },
    /// Render a frame and write the result to disk.
    Export {
        /// Specific timestamp to evaluate the shader at (seconds).
        time: Option<f32>,
        /// Destination path for the exported file.
        path: PathBuf,
        /// Output format the user requested.
        format: ExportFormat,
    },
    /// Render `frames` evenly spaced frames into a directory.
    Sequence {
        /// Shader time of the first frame (seconds).
        start: f32,
        /// Frames per second of shader time.
        fps: f32,
        /// Number of frames to write.
        frames: u32,
        /// Destination directory; created when missing.
        directory: PathBuf,
        /// Format of each frame file.
        format: ExportFormat,
    },
}

impl RenderPolicy {
    pub(crate) fn validate(&self) -> Result<()> {
        if let RenderPolicy::Sequence { fps, frames, .. } = self {
            if !(*fps > 0.0 && fps.is_finite()) {
                bail!("sequence fps must be positive (got {fps})");
            }
            if *frames == 0 {
                bail!("sequence must contain at least one frame");
            }
        }
        Ok(())
    }
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::Still { time: None }
    }
}

/// File formats supported by the still/export pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// 8-bit RGBA, clamped to `[0, 1]`.
    #[default]
    Png,
    /// 32-bit float RGBA with the unclamped shader output.
    Exr,
}

impl ExportFormat {
    /// Picks a format from a file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ExportFormat::Png),
            "exr" => Some(ExportFormat::Exr),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Exr => "exr",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "exr" => Ok(ExportFormat::Exr),
            other => Err(format!("unknown export format '{other}' (expected png or exr)")),
        }
    }
}

/// Snapshot of the time state supplied to the shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Simulated shader time in seconds.
    pub seconds: f32,
    /// Index of the frame within the current run.
    pub frame_index: u64,
}

impl TimeSample {
    /// Creates a new time sample.
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Abstraction over where time values originate from.
pub trait TimeSource: Send {
    /// Resets the source to its initial state.
    fn reset(&mut self);
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Time source that always reports a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    time: f32,
}

impl FixedTimeSource {
    /// Constructs a fixed time source that always returns the provided time.
    pub fn new(time: f32) -> Self {
        Self { time }
    }

    /// Accesses the fixed timestamp without advancing the frame counter.
    pub fn time(&self) -> f32 {
        self.time
    }
}

impl TimeSource for FixedTimeSource {
    fn reset(&mut self) {}

    fn sample(&mut self) -> TimeSample {
        TimeSample::new(self.time, 0)
    }
}

/// Time source that advances by `1 / fps` seconds per sample.
///
/// Each time is computed from the frame index rather than accumulated so long
/// sequences do not drift.
#[derive(Debug, Clone, Copy)]
pub struct SteppedTimeSource {
    start: f32,
    fps: f32,
    frame: u64,
}

impl SteppedTimeSource {
    pub fn new(start: f32, fps: f32) -> Result<Self> {
        if !(fps > 0.0 && fps.is_finite()) {
            bail!("frame rate must be positive (got {fps})");
        }
        Ok(Self {
            start,
            fps,
            frame: 0,
        })
    }

    /// Shader time of frame `index` without advancing the source.
    pub fn time_at(&self, index: u64) -> f32 {
        (f64::from(self.start) + index as f64 / f64::from(self.fps)) as f32
    }
}

impl TimeSource for SteppedTimeSource {
    fn reset(&mut self) {
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.time_at(self.frame), self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Convenient alias for owning time sources behind trait objects.
pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

/// Builds a time source suited to the requested render policy.
pub fn time_source_for_policy(policy: &RenderPolicy) -> Result<BoxedTimeSource> {
    match policy {
        RenderPolicy::Still { time } | RenderPolicy::Export { time, .. } => {
            Ok(Box::new(FixedTimeSource::new(time.unwrap_or(0.0))))
        }
        RenderPolicy::Sequence { start, fps, .. } => {
            Ok(Box::new(SteppedTimeSource::new(*start, *fps)?))
        }
    }
}
