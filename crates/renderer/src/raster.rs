use anyhow::{anyhow, bail, Result};
use kernel::{FrameInputs, PixelShader, Resolution, Vec2, Vec4};
use rayon::prelude::*;

use crate::frame::Frame;

/// Builds the worker pool used for pixel evaluation.
pub fn build_thread_pool(threads: Option<usize>) -> Result<rayon::ThreadPool> {
    if threads == Some(0) {
        bail!("thread count must be at least 1");
    }
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("trifade-raster-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|err| anyhow!("failed to build rayon thread pool: {err}"))
}

/// Shades every pixel centre of a `width`x`height` frame at `time`.
///
/// Rows are distributed across `pool`; each pixel is independent so the
/// result does not depend on scheduling.
pub fn rasterize(
    shader: &dyn PixelShader,
    width: u32,
    height: u32,
    time: f32,
    pool: &rayon::ThreadPool,
) -> Result<Frame> {
    if width == 0 || height == 0 {
        bail!("cannot rasterize an empty {width}x{height} frame");
    }
    let inputs = FrameInputs::new(time, Resolution::new(width as f32, height as f32));
    let row_len = width as usize;
    let mut pixels = vec![Vec4::default(); row_len * height as usize];

    pool.install(|| {
        pixels
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                let fy = y as f32 + 0.5;
                for (x, out) in row.iter_mut().enumerate() {
                    *out = shader.shade(Vec2::new(x as f32 + 0.5, fy), &inputs);
                }
            });
    });

    Frame::new(width, height, pixels)
}
