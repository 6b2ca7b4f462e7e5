use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use image::ImageFormat;

use crate::frame::Frame;
use crate::runtime::ExportFormat;
use crate::types::ColorSpaceMode;

/// Writes `frame` to `path`, creating missing parent directories.
///
/// PNG output is 8-bit and clamped; EXR keeps the raw float values and ignores
/// `color_space`.
pub fn export_frame(
    frame: &Frame,
    path: &Path,
    format: ExportFormat,
    color_space: ColorSpaceMode,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let written = match format {
        ExportFormat::Png => frame
            .to_rgba8(color_space)
            .save_with_format(path, ImageFormat::Png),
        ExportFormat::Exr => frame
            .to_rgba32f()
            .save_with_format(path, ImageFormat::OpenExr),
    };
    written.with_context(|| format!("failed to write {} to {}", format, path.display()))?;

    tracing::debug!(
        path = %path.display(),
        width = frame.width(),
        height = frame.height(),
        %format,
        "wrote frame"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::Vec4;

    fn sample_frame() -> Frame {
        let pixels = (0..6)
            .map(|i| Vec4::new(i as f32 * 0.4, 0.5, 1.0, 1.0))
            .collect();
        Frame::new(3, 2, pixels).expect("valid frame")
    }

    #[test]
    fn png_round_trips_through_image_crate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/out.png");
        export_frame(&sample_frame(), &path, ExportFormat::Png, ColorSpaceMode::Auto)
            .expect("export png");

        let decoded = image::open(&path).expect("decode").to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        // Top-left of the file is the first pixel of the top (second) row.
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 128, 255, 255]);
        assert_eq!(decoded.get_pixel(1, 1).0, [102, 128, 255, 255]);
    }

    #[test]
    fn exr_keeps_values_above_one() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.exr");
        export_frame(&sample_frame(), &path, ExportFormat::Exr, ColorSpaceMode::Auto)
            .expect("export exr");

        let decoded = image::open(&path).expect("decode").to_rgba32f();
        assert_eq!(decoded.dimensions(), (3, 2));
        let top_right = decoded.get_pixel(2, 0).0;
        assert!((top_right[0] - 2.0).abs() < 1e-6, "{top_right:?}");
    }

    #[test]
    fn unwritable_destination_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").expect("write blocker");
        let err = export_frame(
            &sample_frame(),
            &blocker.join("out.png"),
            ExportFormat::Png,
            ColorSpaceMode::Auto,
        )
        .expect_err("parent is a file");
        assert!(format!("{err:#}").contains("file"), "{err:#}");
    }
}
