//! One grid layer: lines to the centre point, compact triangles, and the
//! fixed connectors between the edge-adjacent neighbours.

use crate::field::{line_field, triangle_field};
use crate::lattice::{Neighborhood, CENTER, NEIGHBOR_COUNT};
use crate::math::Vec2;

/// Triangles whose perimeter reaches this value are skipped.
pub const TRIANGLE_PERIMETER_LIMIT: f32 = 2.8;

/// Weight applied to each accepted triangle.
pub const TRIANGLE_WEIGHT: f32 = 0.8;

/// Number of unordered index triples drawn from the 9 lattice points.
pub const TRIANGLE_CANDIDATES: usize = 84;

/// Connectors between the points above/below and left/right of the centre.
pub const CONNECTORS: [(usize, usize); 4] = [(1, 3), (1, 5), (7, 3), (7, 5)];

/// Every `(i, j, k)` with `j < k`, both after `i`, in lexicographic order.
pub fn triples_from(i: usize) -> impl Iterator<Item = (usize, usize, usize)> {
    (i + 1..NEIGHBOR_COUNT).flat_map(move |j| (j + 1..NEIGHBOR_COUNT).map(move |k| (i, j, k)))
}

/// Every `(i, j, k)` with `i < j < k < 9`, in the order `accumulate` visits them.
pub fn triples() -> impl Iterator<Item = (usize, usize, usize)> {
    (0..NEIGHBOR_COUNT).flat_map(triples_from)
}

#[inline]
fn perimeter(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (a - b).length() + (b - c).length() + (a - c).length()
}

/// Accumulated intensity for coordinate `uv` in layer space at `time`.
pub fn layer(uv: Vec2, time: f32) -> f32 {
    let gv = uv.fract() - 0.5;
    let id = uv.floor();
    let hood = Neighborhood::around(id, time);
    accumulate(gv, &hood)
}

/// Sums the contributions of `hood` at the cell-local coordinate `gv`.
///
/// Summation order is fixed: each point's centre line is added
/// before the triangles that start at that point.
pub fn accumulate(gv: Vec2, hood: &Neighborhood) -> f32 {
    let p = &hood.points;
    let center = p[CENTER];
    let mut m = 0.0;

    for i in 0..NEIGHBOR_COUNT {
        m += line_field(gv, center, p[i]);

        for (a, b, c) in triples_from(i) {
            if perimeter(p[a], p[b], p[c]) < TRIANGLE_PERIMETER_LIMIT {
                m += triangle_field(gv, p[a], p[b], p[c]) * TRIANGLE_WEIGHT;
            }
        }
    }

    for (a, b) in CONNECTORS {
        m += line_field(gv, p[a], p[b]);
    }

    m
}
