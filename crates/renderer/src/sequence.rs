//! Numbered frame export.
//!
//! Frames are shaded in order on the calling thread (each frame already fans
//! out across the raster pool) and handed to a single writer thread over a
//! bounded channel, so encoding overlaps with shading of the next frame while
//! at most a couple of frames sit in memory.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, Receiver};
use serde::{Deserialize, Serialize};

use crate::export::export_frame;
use crate::frame::Frame;
use crate::runtime::{ExportFormat, TimeSource};
use crate::types::ColorSpaceMode;
use crate::Renderer;

/// Name of the JSON manifest written next to the frames.
pub const MANIFEST_FILE: &str = "sequence.json";

const WRITE_QUEUE_DEPTH: usize = 2;

/// Description of an exported sequence, stored as `sequence.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceManifest {
    pub shader: String,
    pub width: u32,
    pub height: u32,
    pub fps: f32,
    pub start: f32,
    pub format: String,
    pub frames: Vec<ManifestFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestFrame {
    pub index: u64,
    pub time: f32,
    pub file: String,
}

impl SequenceManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open manifest {}", path.display()))?;
        serde_json::from_reader(file)
            .with_context(|| format!("failed to parse manifest {}", path.display()))
    }

    fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create manifest {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("failed to write manifest {}", path.display()))
    }
}

/// File name of frame `index`, e.g. `frame_00042.png`.
pub fn frame_file_name(index: u64, format: ExportFormat) -> String {
    format!("frame_{index:05}.{}", format.extension())
}

/// Parameters of one sequence export.
#[derive(Debug, Clone)]
pub(crate) struct SequenceRequest<'a> {
    pub start: f32,
    pub fps: f32,
    pub frames: u32,
    pub directory: &'a Path,
    pub format: ExportFormat,
}

struct PendingWrite {
    path: PathBuf,
    frame: Frame,
}

/// Renders and writes every frame of `request` at the times produced by
/// `clock`; returns the written paths, manifest last.
pub(crate) fn export_sequence(
    renderer: &Renderer,
    clock: &mut dyn TimeSource,
    request: SequenceRequest<'_>,
) -> Result<Vec<PathBuf>> {
    let directory = request.directory;
    fs::create_dir_all(directory)
        .with_context(|| format!("failed to create output directory {}", directory.display()))?;

    clock.reset();
    let color_space = renderer.config().color_space;
    let format = request.format;

    let (tx, rx) = bounded::<PendingWrite>(WRITE_QUEUE_DEPTH);
    let writer = thread::Builder::new()
        .name("trifade-writer".into())
        .spawn(move || write_frames(rx, format, color_space))
        .map_err(|err| anyhow!("failed to spawn writer thread: {err}"))?;

    let mut entries = Vec::with_capacity(request.frames as usize);
    let mut outputs = Vec::with_capacity(request.frames as usize + 1);
    let mut render_error = None;

    for _ in 0..request.frames {
        let sample = clock.sample();
        let frame = match renderer.render_frame(sample.seconds) {
            Ok(frame) => frame,
            Err(err) => {
                render_error = Some(err);
                break;
            }
        };
        let file = frame_file_name(sample.frame_index, format);
        let path = directory.join(&file);
        tracing::debug!(
            frame = sample.frame_index,
            time = sample.seconds,
            path = %path.display(),
            "queued frame"
        );
        if tx
            .send(PendingWrite {
                path: path.clone(),
                frame,
            })
            .is_err()
        {
            // Writer hung up early; its own error is reported on join.
            break;
        }
        entries.push(ManifestFrame {
            index: sample.frame_index,
            time: sample.seconds,
            file,
        });
        outputs.push(path);
    }
    drop(tx);

    writer
        .join()
        .map_err(|err| anyhow!("writer thread panicked: {err:?}"))??;
    if let Some(err) = render_error {
        return Err(err);
    }

    let (width, height) = renderer.config().surface_size;
    let manifest = SequenceManifest {
        shader: renderer.shader_name().to_string(),
        width,
        height,
        fps: request.fps,
        start: request.start,
        format: format.to_string(),
        frames: entries,
    };
    let manifest_path = directory.join(MANIFEST_FILE);
    manifest.save(&manifest_path)?;
    outputs.push(manifest_path);

    tracing::info!(
        directory = %directory.display(),
        frames = manifest.frames.len(),
        %format,
        "sequence exported"
    );
    Ok(outputs)
}

fn write_frames(
    rx: Receiver<PendingWrite>,
    format: ExportFormat,
    color_space: ColorSpaceMode,
) -> Result<()> {
    for pending in rx {
        export_frame(&pending.frame, &pending.path, format, color_space)?;
    }
    Ok(())
}
