//! Animated lattice points around a grid cell.

use crate::math::Vec2;
use crate::noise::hash2;

/// Points per neighbourhood (the cell plus its 8 neighbours).
pub const NEIGHBOR_COUNT: usize = 9;

/// Index of the cell's own point in row-major order.
pub const CENTER: usize = 4;

/// Maximum displacement of a point from its nominal offset.
pub const WOBBLE: f32 = 0.4;

/// Animated point for `offset` relative to `cell_id` at `time`.
#[inline]
pub fn position(cell_id: Vec2, offset: Vec2, time: f32) -> Vec2 {
    let n = hash2(cell_id + offset) * time;
    offset + n.sin() * WOBBLE
}

/// The 3×3 block of animated points centred on one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighborhood {
    pub points: [Vec2; NEIGHBOR_COUNT],
}

impl Neighborhood {
    pub fn around(cell_id: Vec2, time: f32) -> Self {
        let mut points = [Vec2::ZERO; NEIGHBOR_COUNT];
        let mut index = 0;
        for y in -1..=1 {
            for x in -1..=1 {
                points[index] = position(cell_id, Vec2::new(x as f32, y as f32), time);
                index += 1;
            }
        }
        Self { points }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.points[CENTER]
    }

    #[inline]
    pub fn get(&self, index: usize) -> Vec2 {
        self.points[index]
    }
}
