//! Distance fields for segments and triangles, mapped to soft intensities.
//!
//! Both intensity functions gate on the length of the `a-b` edge: very long
//! connections fade out, and a narrow band around [`PREFERRED_LENGTH`] is
//! boosted on top of the base weight. That gating is what keeps the mesh
//! sparse.

use crate::math::{clamp, sign, smoothstep, Vec2};

/// Edge length that receives the extra highlight.
pub const PREFERRED_LENGTH: f32 = 0.75;

const LINE_EDGE: (f32, f32) = (0.03, 0.01);
const LINE_CUTOFF: (f32, f32) = (1.4, 0.8);
const LINE_BASE_WEIGHT: f32 = 0.5;

const TRIANGLE_EDGE: (f32, f32) = (0.13, 0.01);
const TRIANGLE_CUTOFF: (f32, f32) = (1.2, 0.8);
const TRIANGLE_BASE_WEIGHT: f32 = 0.25;

const BAND: (f32, f32) = (0.05, 0.03);

/// Unsigned distance from `p` to segment `ab`.
///
/// A zero-length segment produces `0/0` for the projection parameter; the
/// NaN-collapsing clamp turns that into the point distance `|p - a|`.
#[inline]
pub fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let pa = p - a;
    let ba = b - a;
    let t = clamp(pa.dot(ba) / ba.dot(ba), 0.0, 1.0);
    (pa - ba * t).length()
}

/// Signed distance to the boundary of triangle `p0 p1 p2`, negative inside.
///
/// Independent of winding. Collinear vertices have no winding and report `0`.
pub fn triangle_distance(p: Vec2, p0: Vec2, p1: Vec2, p2: Vec2) -> f32 {
    let e0 = p1 - p0;
    let e1 = p2 - p1;
    let e2 = p0 - p2;

    let v0 = p - p0;
    let v1 = p - p1;
    let v2 = p - p2;

    let pq0 = v0 - e0 * clamp(v0.dot(e0) / e0.dot(e0), 0.0, 1.0);
    let pq1 = v1 - e1 * clamp(v1.dot(e1) / e1.dot(e1), 0.0, 1.0);
    let pq2 = v2 - e2 * clamp(v2.dot(e2) / e2.dot(e2), 0.0, 1.0);

    let s = sign(e0.perp_dot(e2));
    let nearest = pq0.dot(pq0).min(pq1.dot(pq1)).min(pq2.dot(pq2));
    let side = (s * v0.perp_dot(e0))
        .min(s * v1.perp_dot(e1))
        .min(s * v2.perp_dot(e2));

    -nearest.sqrt() * sign(side)
}

#[inline]
fn length_gate(len: f32, cutoff: (f32, f32), base_weight: f32) -> f32 {
    smoothstep(cutoff.0, cutoff.1, len) * base_weight
        + smoothstep(BAND.0, BAND.1, (len - PREFERRED_LENGTH).abs())
}

/// Intensity of segment `ab` at `p`, in `[0, 1.5]`.
#[inline]
pub fn line_field(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let d = segment_distance(p, a, b);
    let m = smoothstep(LINE_EDGE.0, LINE_EDGE.1, d);
    m * length_gate((a - b).length(), LINE_CUTOFF, LINE_BASE_WEIGHT)
}

/// Intensity of the filled triangle `abc` at `p`, in `[0, 1.25]`.
///
/// Only the `a-b` edge feeds the length gate.
#[inline]
pub fn triangle_field(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> f32 {
    let d = triangle_distance(p, a, b, c);
    let m = smoothstep(TRIANGLE_EDGE.0, TRIANGLE_EDGE.1, d);
    m * length_gate((a - b).length(), TRIANGLE_CUTOFF, TRIANGLE_BASE_WEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered_segment(len: f32) -> (Vec2, Vec2) {
        (Vec2::new(-len * 0.5, 0.0), Vec2::new(len * 0.5, 0.0))
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        assert!((segment_distance(Vec2::new(0.5, 0.3), a, b) - 0.3).abs() < 1e-6);
        assert!((segment_distance(Vec2::new(2.0, 0.0), a, b) - 1.0).abs() < 1e-6);
        assert!((segment_distance(Vec2::new(-0.3, -0.4), a, b) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_length_segment_measures_point_distance() {
        let a = Vec2::new(0.2, 0.2);
        let d = segment_distance(Vec2::new(0.5, 0.6), a, a);
        assert!((d - 0.5).abs() < 1e-6);
        assert!(d.is_finite());
    }

    #[test]
    fn degenerate_line_draws_a_node() {
        let a = Vec2::new(0.1, -0.1);
        assert!((line_field(a, a, a) - 0.5).abs() < 1e-6);
        assert_eq!(line_field(Vec2::new(0.5, 0.5), a, a), 0.0);
    }

    #[test]
    fn line_is_zero_far_from_segment() {
        let (a, b) = centered_segment(0.75);
        assert_eq!(line_field(Vec2::new(0.0, 0.06), a, b), 0.0);
        assert_eq!(line_field(Vec2::new(0.0, -0.2), a, b), 0.0);
    }

    #[test]
    fn line_length_gating_prefers_medium_edges() {
        let p = Vec2::ZERO;
        let at = |len: f32| {
            let (a, b) = centered_segment(len);
            line_field(p, a, b)
        };
        let short = at(0.5);
        let preferred = at(0.75);
        let unit = at(1.0);
        let long = at(1.5);
        let longer = at(2.0);

        assert!((short - 0.5).abs() < 1e-6);
        assert!((preferred - 1.5).abs() < 1e-6);
        assert!((unit - 0.370_370_4).abs() < 1e-5);
        assert_eq!(long, 0.0);
        assert_eq!(longer, 0.0);
        assert!(preferred > short && short > unit && unit > long);
    }

    #[test]
    fn triangle_distance_sign_follows_inside_outside() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        let c = Vec2::new(0.0, 1.0);
        let inside = triangle_distance(Vec2::new(0.2, 0.2), a, b, c);
        assert!((inside + 0.2).abs() < 1e-6);
        let outside = triangle_distance(Vec2::new(2.0, 2.0), a, b, c);
        assert!((outside - 3.0 / 2.0_f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn triangle_distance_ignores_winding() {
        let a = Vec2::new(-0.3, 0.1);
        let b = Vec2::new(0.6, -0.2);
        let c = Vec2::new(0.1, 0.7);
        let p = Vec2::new(0.05, 0.12);
        let reference = triangle_distance(p, a, b, c);
        for (x, y, z) in [(a, c, b), (b, a, c), (b, c, a), (c, a, b), (c, b, a)] {
            assert!((triangle_distance(p, x, y, z) - reference).abs() < 1e-5);
        }
    }

    #[test]
    fn collinear_triangle_has_zero_distance() {
        let d = triangle_distance(
            Vec2::new(0.5, 3.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
        );
        assert_eq!(d, 0.0);
    }

    #[test]
    fn triangle_interior_is_fully_weighted() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(0.75, 0.0);
        let c = Vec2::new(0.0, 0.75);
        let value = triangle_field(Vec2::new(0.1, 0.1), a, b, c);
        assert!((value - 1.25).abs() < 1e-6);
        assert_eq!(triangle_field(Vec2::new(2.0, 2.0), a, b, c), 0.0);
    }

    #[test]
    fn long_first_edge_mutes_triangle() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.3, 0.0);
        let c = Vec2::new(0.2, 0.4);
        assert_eq!(triangle_field(Vec2::new(0.2, 0.1), a, b, c), 0.0);
    }
}
