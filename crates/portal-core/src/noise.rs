//! Classic 3D gradient noise.
//!
//! Lattice corners are hashed with the permutation polynomial
//! `(34x² + x) mod 289` and mapped onto gradients spread over an octahedron,
//! then blended with the quintic fade curve. The same construction is ported
//! to WGSL in `shaders/noise.wgsl`; the two agree on structure, not bits.

use glam::{Vec2, Vec3};

/// Hash period along every axis, in lattice cells.
pub const PERIOD: i32 = 289;

// Brings the raw dot-product blend up to roughly [-1, 1].
const OUTPUT_SCALE: f32 = 2.2;

/// Returns the noise value at `(x, y, z)`.
#[inline]
pub fn noise3(x: f32, y: f32, z: f32) -> f32 {
    cnoise(Vec3::new(x, y, z))
}

/// Convenience for the common "2D coordinate plus time" call shape.
#[inline]
pub fn noise_uv_t(uv: Vec2, t: f32) -> f32 {
    cnoise(uv.extend(t))
}

/// Returns the noise value at `p`.
///
/// Deterministic and stateless; continuous with a continuous first
/// derivative across cell boundaries. NaN coordinates yield NaN.
pub fn cnoise(p: Vec3) -> f32 {
    let cell = p.floor();
    let i0 = [wrap(cell.x), wrap(cell.y), wrap(cell.z)];
    let i1 = [wrap(cell.x + 1.0), wrap(cell.y + 1.0), wrap(cell.z + 1.0)];
    let f0 = p - cell;
    let f1 = f0 - Vec3::ONE;

    let corner = |ix: i32, iy: i32, iz: i32, offset: Vec3| -> f32 {
        let hash = permute(permute(permute(ix) + iy) + iz);
        gradient(hash).dot(offset)
    };

    #[rustfmt::skip]
    let (n000, n100, n010, n110) = (
        corner(i0[0], i0[1], i0[2], f0),
        corner(i1[0], i0[1], i0[2], Vec3::new(f1.x, f0.y, f0.z)),
        corner(i0[0], i1[1], i0[2], Vec3::new(f0.x, f1.y, f0.z)),
        corner(i1[0], i1[1], i0[2], Vec3::new(f1.x, f1.y, f0.z)),
    );
    #[rustfmt::skip]
    let (n001, n101, n011, n111) = (
        corner(i0[0], i0[1], i1[2], Vec3::new(f0.x, f0.y, f1.z)),
        corner(i1[0], i0[1], i1[2], Vec3::new(f1.x, f0.y, f1.z)),
        corner(i0[0], i1[1], i1[2], Vec3::new(f0.x, f1.y, f1.z)),
        corner(i1[0], i1[1], i1[2], f1),
    );

    let (u, v, w) = (fade(f0.x), fade(f0.y), fade(f0.z));
    // z first, then y, then x
    let x0y0 = lerp(n000, n001, w);
    let x1y0 = lerp(n100, n101, w);
    let x0y1 = lerp(n010, n011, w);
    let x1y1 = lerp(n110, n111, w);
    let x0 = lerp(x0y0, x0y1, v);
    let x1 = lerp(x1y0, x1y1, v);
    OUTPUT_SCALE * lerp(x0, x1, u)
}

/// Quintic smootherstep `t³(t(6t − 15) + 10)`.
#[inline]
pub fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Lattice coordinate reduced into `[0, PERIOD)`.
#[inline]
fn wrap(c: f32) -> i32 {
    (c as i64).rem_euclid(PERIOD as i64) as i32
}

/// `(34x² + x) mod 289`. Arguments stay below `2 * PERIOD`, so the product
/// fits comfortably in an `i32`.
#[inline]
fn permute(x: i32) -> i32 {
    ((x * 34 + 1) * x).rem_euclid(PERIOD)
}

#[inline]
fn taylor_inv_sqrt(r: f32) -> f32 {
    1.792_842_9 - 0.853_734_7 * r
}

/// Maps a corner hash to a pseudo-random gradient folded onto an octahedron.
/// The Taylor-series normalization leaves lengths between about 0.5 and 1.
fn gradient(hash: i32) -> Vec3 {
    let h = hash as f32 / 7.0;
    let mut gx = fract(h);
    let mut gy = fract(h.floor() / 7.0) - 0.5;
    let gz = 0.5 - gx.abs() - gy.abs();
    if gz <= 0.0 {
        gx -= step(0.0, gx) - 0.5;
        gy -= step(0.0, gy) - 0.5;
    }
    let g = Vec3::new(gx, gy, gz);
    g * taylor_inv_sqrt(g.dot(g))
}

#[inline]
fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permute_stays_in_period() {
        for x in 0..(2 * PERIOD) {
            let p = permute(x);
            assert!((0..PERIOD).contains(&p), "permute({x}) = {p}");
        }
    }

    #[test]
    fn wrap_handles_negative_cells() {
        assert_eq!(wrap(-1.0), 288);
        assert_eq!(wrap(289.0), 0);
        assert_eq!(wrap(0.0), 0);
    }

    #[test]
    fn fade_endpoints_and_flat_derivative() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert!((fade(0.5) - 0.5).abs() < 1e-6);
        let eps = 1e-3;
        assert!(fade(eps) / eps < 1e-3);
        assert!((1.0 - fade(1.0 - eps)) / eps < 1e-3);
    }

    #[test]
    fn lattice_points_are_zero() {
        // Every corner offset is zero at an integer point
        for &(x, y, z) in &[(0.0, 0.0, 0.0), (3.0, -7.0, 11.0), (288.0, 1.0, -5.0)] {
            assert!(noise3(x, y, z).abs() < 1e-6);
        }
    }

    #[test]
    fn gradient_lengths_are_bounded() {
        for h in 0..PERIOD {
            let len = gradient(h).length();
            assert!(len > 0.45 && len < 1.05, "hash {h} -> |g| = {len}");
        }
    }
}
