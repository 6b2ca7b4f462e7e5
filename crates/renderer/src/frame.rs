//! CPU frame storage and conversion into `image` buffers.
//!
//! Frames keep the shader's native orientation: row 0 is the bottom of the
//! image, matching `fragCoord`. Conversions to `image` buffers flip into the
//! usual top-left order.

use anyhow::{bail, Context, Result};
use image::imageops::{flip_vertical_in_place, interpolate_bilinear};
use image::{Rgba, Rgba32FImage, RgbaImage};
use kernel::Vec4;

use crate::types::ColorSpaceMode;

/// Shaded pixels of one frame, bottom row first.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
}

impl Frame {
    pub fn new(width: u32, height: u32, pixels: Vec<Vec4>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            bail!(
                "frame {}x{} needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            );
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    /// Pixel at column `x`, row `y` counted from the bottom.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec4> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Float RGBA in top-left order with values left untouched.
    pub fn to_rgba32f(&self) -> Rgba32FImage {
        let mut image = Rgba32FImage::from_fn(self.width, self.height, |x, y| {
            Rgba(self.at(x, y).to_array())
        });
        flip_vertical_in_place(&mut image);
        image
    }

    /// 8-bit RGBA in top-left order, clamped to `[0, 1]` and encoded per `color_space`.
    pub fn to_rgba8(&self, color_space: ColorSpaceMode) -> RgbaImage {
        let mut image = RgbaImage::from_fn(self.width, self.height, |x, y| {
            let c = self.at(x, y);
            Rgba([
                quantize(color_space.encode(unit(c.x))),
                quantize(color_space.encode(unit(c.y))),
                quantize(color_space.encode(unit(c.z))),
                quantize(unit(c.w)),
            ])
        });
        flip_vertical_in_place(&mut image);
        image
    }

    /// Resamples bilinearly to `width`x`height`.
    ///
    /// Samples keep their full float range; values above 1 or below 0 survive.
    pub fn resized(&self, width: u32, height: u32) -> Result<Self> {
        if (width, height) == (self.width, self.height) {
            return Ok(self.clone());
        }
        if self.pixels.is_empty() || width == 0 || height == 0 {
            bail!(
                "cannot resample a {}x{} frame to {}x{}",
                self.width,
                self.height,
                width,
                height
            );
        }

        // Bottom-row-first, like `pixels`, so no flip is needed.
        let source = Rgba32FImage::from_fn(self.width, self.height, |x, y| {
            Rgba(self.at(x, y).to_array())
        });
        let scale_x = self.width as f32 / width as f32;
        let scale_y = self.height as f32 / height as f32;
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;

        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            let v = ((y as f32 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
            for x in 0..width {
                let u = ((x as f32 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
                let Rgba([r, g, b, a]) = interpolate_bilinear(&source, u, v)
                    .with_context(|| format!("sample ({u}, {v}) fell outside the frame"))?;
                pixels.push(Vec4::new(r, g, b, a));
            }
        }
        Self::new(width, height, pixels)
    }

    fn at(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

fn unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

fn quantize(value: f32) -> u8 {
    (value * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame() -> Frame {
        // 2x2: bottom row dark, top row bright.
        let pixels = vec![
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(-0.5, 0.25, 0.5, 1.0),
            Vec4::new(1.0, 1.0, 1.0, 1.0),
            Vec4::new(2.0, 0.75, 0.5, 1.0),
        ];
        Frame::new(2, 2, pixels).expect("valid frame")
    }

    #[test]
    fn rejects_mismatched_pixel_count() {
        assert!(Frame::new(3, 2, vec![Vec4::default(); 5]).is_err());
    }

    #[test]
    fn rgba8_flips_to_top_left_and_clamps() {
        let image = gradient_frame().to_rgba8(ColorSpaceMode::Auto);
        assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(1, 0).0, [255, 191, 128, 255]);
        assert_eq!(image.get_pixel(0, 1).0, [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(1, 1).0, [0, 64, 128, 255]);
    }

    #[test]
    fn linear_mode_encodes_srgb() {
        let frame = Frame::new(1, 1, vec![Vec4::new(0.5, 0.0, 1.0, 1.0)]).expect("valid");
        let image = frame.to_rgba8(ColorSpaceMode::Linear);
        assert_eq!(image.get_pixel(0, 0).0, [188, 0, 255, 255]);
    }

    #[test]
    fn rgba32f_keeps_unclamped_values() {
        let image = gradient_frame().to_rgba32f();
        assert_eq!(image.get_pixel(1, 0).0, [2.0, 0.75, 0.5, 1.0]);
        assert_eq!(image.get_pixel(1, 1).0, [-0.5, 0.25, 0.5, 1.0]);
    }

    #[test]
    fn pixel_uses_bottom_left_origin() {
        let frame = gradient_frame();
        assert_eq!(frame.pixel(0, 1), Some(Vec4::new(1.0, 1.0, 1.0, 1.0)));
        assert_eq!(frame.pixel(2, 0), None);
    }

    #[test]
    fn resize_preserves_orientation() {
        let frame = gradient_frame().resized(4, 4).expect("resize");
        assert_eq!((frame.width(), frame.height()), (4, 4));
        let bottom = frame.pixel(0, 0).expect("in range");
        let top = frame.pixel(0, 3).expect("in range");
        assert!(top.x > bottom.x, "top {top:?} bottom {bottom:?}");
    }

    #[test]
    fn resize_keeps_values_outside_unit_range() {
        let bright = Vec4::new(2.0, -0.5, 1.5, 1.0);
        let frame = Frame::new(2, 2, vec![bright; 4]).expect("valid frame");
        let scaled = frame.resized(4, 4).expect("resize");
        for pixel in scaled.pixels() {
            for (got, want) in pixel.to_array().into_iter().zip(bright.to_array()) {
                assert!((got - want).abs() < 1e-5, "{pixel:?}");
            }
        }

        let upsampled = gradient_frame().resized(4, 4).expect("resize");
        let top_right = upsampled.pixel(3, 3).expect("in range");
        assert!((top_right.x - 2.0).abs() < 1e-5, "{top_right:?}");
        let bottom_right = upsampled.pixel(3, 0).expect("in range");
        assert!((bottom_right.x + 0.5).abs() < 1e-5, "{bottom_right:?}");
    }

    #[test]
    fn resize_of_empty_frame_fails() {
        let empty = Frame::new(0, 0, Vec::new()).expect("empty frame");
        assert!(empty.resized(4, 4).is_err());
    }
}
