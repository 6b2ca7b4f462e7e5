//! Deterministic lattice hashes.
//!
//! Both functions are pure: the only thing that animates the pattern is the
//! frame time applied downstream, so the same cell must always hash to the
//! same value.

use crate::math::{fract, Vec2};

const SCALE: Vec2 = Vec2::new(233.34, 851.73);
const DOT_OFFSET: f32 = 23.45;

/// Scalar hash in `[0, 1)`.
#[inline]
pub fn hash1(p: Vec2) -> f32 {
    let mut p = (p * SCALE).fract();
    p = p + p.dot(p + DOT_OFFSET);
    fract(p.x * p.y)
}

/// Vector hash in `[0, 1)^2`; the second lane re-hashes `p` shifted by the first.
#[inline]
pub fn hash2(p: Vec2) -> Vec2 {
    let n = hash1(p);
    Vec2::new(n, hash1(p + n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let p = Vec2::new(12.0, -7.0);
        assert_eq!(hash1(p).to_bits(), hash1(p).to_bits());
        assert_eq!(hash2(p), hash2(p));
    }

    #[test]
    fn hash_stays_in_unit_interval_on_a_grid() {
        for y in -40..40 {
            for x in -40..40 {
                let p = Vec2::new(x as f32, y as f32);
                let n = hash1(p);
                assert!((0.0..1.0).contains(&n), "hash1({p:?}) = {n}");
                let v = hash2(p);
                assert!((0.0..1.0).contains(&v.x), "hash2({p:?}).x = {}", v.x);
                assert!((0.0..1.0).contains(&v.y), "hash2({p:?}).y = {}", v.y);
            }
        }
    }

    #[test]
    fn second_lane_reuses_first() {
        let p = Vec2::new(3.0, 4.0);
        let v = hash2(p);
        assert_eq!(v.x, hash1(p));
        assert_eq!(v.y, hash1(p + v.x));
    }

    #[test]
    fn neighbouring_cells_differ() {
        let a = hash1(Vec2::new(0.0, 0.0));
        let b = hash1(Vec2::new(1.0, 0.0));
        let c = hash1(Vec2::new(0.0, 1.0));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
