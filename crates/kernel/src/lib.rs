//! Per-pixel kernel for the fading-triangles background.
//!
//! Every function here is pure: a pixel's colour depends only on its
//! coordinate, the frame time and the viewport resolution. The evaluation
//! stack, leaves first:
//!
//! ```text
//!   noise::hash1/hash2 ─▶ lattice::position ─▶ layer::layer ─▶ compositor::render
//!                          field::line_field ──┘
//!                          field::triangle_field ┘
//! ```
//!
//! - `noise` turns lattice coordinates into repeatable pseudo-random values.
//! - `lattice` animates the 3×3 neighbourhood of points around a grid cell.
//! - `field` converts segment and triangle distances into soft intensities,
//!   gated by edge length.
//! - `layer` accumulates every centre spoke, compact triangle and connector
//!   for one grid scale.
//! - `compositor` stacks four rotating, zooming layers and maps the result to
//!   colour.
//! - `shader` wraps the whole thing behind the `PixelShader` trait hosts use.
//!
//! Work per pixel is fixed: 4 layers × (9 spokes + 84 triangle checks + 4
//! connectors). Nothing allocates.

pub mod compositor;
pub mod field;
pub mod lattice;
pub mod layer;
pub mod math;
pub mod noise;
pub mod shader;

pub use compositor::{render, FrameInputs, LayerSchedule, Palette, Resolution};
pub use math::{Vec2, Vec3, Vec4};
pub use shader::{FadingTriangles, PixelShader, Uniform};
