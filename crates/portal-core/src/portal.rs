//! Portal surface kernel.
//!
//! Per fragment: warp the uv by one noise lookup, sample the pattern with a
//! second lookup on the warped coordinate, add a radial glow, posterize with a
//! hard step and map the result between two colours without clamping.

use glam::{Vec2, Vec3, Vec4};

use crate::constants::{
    PORTAL_GLOW_OFFSET, PORTAL_GLOW_SCALE, PORTAL_PATTERN_SPEED, PORTAL_STEP_BOOST,
    PORTAL_STEP_EDGE, PORTAL_UV_SCALE, PORTAL_WARP_SPEED,
};
use crate::noise::noise_uv_t;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortalUniforms {
    pub time: f32,
    pub color_start: Vec3,
    pub color_end: Vec3,
}

impl Default for PortalUniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            color_start: Vec3::new(1.0, 232.0 / 255.0, 170.0 / 255.0),
            color_end: Vec3::ONE,
        }
    }
}

/// Domain warp: both axes are pushed by the same noise value.
#[inline]
pub fn warp_uv(uv: Vec2, t: f32) -> Vec2 {
    uv + Vec2::splat(noise_uv_t(uv * PORTAL_UV_SCALE, t * PORTAL_WARP_SPEED))
}

/// Pattern noise sampled at the warped coordinate.
#[inline]
pub fn pattern(uv: Vec2, t: f32) -> f32 {
    noise_uv_t(warp_uv(uv, t) * PORTAL_UV_SCALE, t * PORTAL_PATTERN_SPEED)
}

/// Radial term, −1.4 at the centre growing by 5 per unit of distance.
#[inline]
pub fn outer_glow(uv: Vec2) -> f32 {
    uv.distance(Vec2::splat(0.5)) * PORTAL_GLOW_SCALE - PORTAL_GLOW_OFFSET
}

/// Adds 0.8 to anything at or above −0.2; values below pass through.
#[inline]
pub fn step_boost(strength: f32) -> f32 {
    if strength < PORTAL_STEP_EDGE {
        strength
    } else {
        strength + PORTAL_STEP_BOOST
    }
}

/// Final scalar used as the colour mix factor.
#[inline]
pub fn strength(uv: Vec2, t: f32) -> f32 {
    step_boost(pattern(uv, t) + outer_glow(uv))
}

/// Per-channel `start + (end − start) · s`. Factors outside `[0, 1]`
/// extrapolate along the same line.
#[inline]
pub fn mix_color(start: Vec3, end: Vec3, s: f32) -> Vec3 {
    start + (end - start) * s
}

/// Opaque fragment colour at `uv`.
pub fn shade(uv: Vec2, u: &PortalUniforms) -> Vec4 {
    mix_color(u.color_start, u.color_end, strength(uv, u.time)).extend(1.0)
}
