//! Firefly point-sprite kernel.
//!
//! Each firefly is a fixed base position plus a random scale. Every frame the
//! vertex stage bobs it along y and z, sizes it in pixels with perspective
//! attenuation, and the fragment stage shades a soft circular glow that is
//! composited additively.

use glam::{Mat4, Vec2, Vec3, Vec4};
use rand::prelude::*;

use crate::constants::{
    FIREFLY_MAX_HEIGHT, FIREFLY_SPREAD_XZ, FIREFLY_WOBBLE_AMP, FIREFLY_WOBBLE_FREQ, SPRITE_CUTOFF,
    SPRITE_GLOW,
};

/// One point of the ensemble. Immutable after creation.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Firefly {
    pub position: [f32; 3],
    pub scale: f32,
}

impl Firefly {
    pub fn new(position: Vec3, scale: f32) -> Self {
        Self {
            position: position.to_array(),
            scale,
        }
    }

    #[inline]
    pub fn base(&self) -> Vec3 {
        Vec3::from(self.position)
    }
}

/// Uniforms read by the firefly kernel; `time` is written by the frame driver,
/// `size` by the debug panel and `pixel_ratio` by viewport resizes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FireflyUniforms {
    pub size: f32,
    pub time: f32,
    pub pixel_ratio: f32,
}

impl Default for FireflyUniforms {
    fn default() -> Self {
        Self {
            size: 100.0,
            time: 0.0,
            pixel_ratio: 1.0,
        }
    }
}

/// A firefly after the vertex stage: displaced world position and size in
/// device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    pub world: Vec3,
    pub view_z: f32,
    pub size_px: f32,
}

/// Scatters `count` fireflies over the diorama footprint.
pub fn scatter<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Firefly> {
    (0..count)
        .map(|_| {
            let x = (rng.gen::<f32>() - 0.5) * FIREFLY_SPREAD_XZ;
            let y = rng.gen::<f32>() * FIREFLY_MAX_HEIGHT;
            let z = (rng.gen::<f32>() - 0.5) * FIREFLY_SPREAD_XZ;
            Firefly::new(Vec3::new(x, y, z), rng.gen::<f32>())
        })
        .collect()
}

/// Scatters with a fixed seed, or from entropy when `seed` is `None`.
pub fn scatter_seeded(count: usize, seed: Option<u64>) -> Vec<Firefly> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    scatter(count, &mut rng)
}

/// Bobbing offset applied to a base position at time `t`.
///
/// y follows `sin(t + x·100)`, z follows `cos(t + z·100)`, both scaled by
/// `scale · 0.2`. A zero scale leaves the point where it is.
#[inline]
pub fn displace(base: Vec3, scale: f32, t: f32) -> Vec3 {
    let amp = scale * FIREFLY_WOBBLE_AMP;
    Vec3::new(
        base.x,
        base.y + (t + base.x * FIREFLY_WOBBLE_FREQ).sin() * amp,
        base.z + (t + base.z * FIREFLY_WOBBLE_FREQ).cos() * amp,
    )
}

/// Point size in device pixels before perspective attenuation.
#[inline]
pub fn base_point_size(u: &FireflyUniforms, scale: f32) -> f32 {
    u.size * scale * u.pixel_ratio
}

/// Point size after dividing by view-space depth.
///
/// Points at or behind the eye (`view_z >= 0`) would be clipped by the
/// rasterizer; they get size zero here.
#[inline]
pub fn point_size(u: &FireflyUniforms, scale: f32, view_z: f32) -> f32 {
    if view_z >= 0.0 {
        return 0.0;
    }
    base_point_size(u, scale) * (1.0 / -view_z)
}

/// Glow strength at `point_coord` (`[0,1]²` across the sprite).
///
/// `0.05 / d − 0.1` with `d` the distance to the sprite centre: infinite at
/// the centre, zero at `d = 0.5`, negative outside.
#[inline]
pub fn sprite_strength(point_coord: Vec2) -> f32 {
    let d = point_coord.distance(Vec2::splat(0.5));
    SPRITE_GLOW / d - SPRITE_CUTOFF
}

/// Fragment colour: white with the glow strength as alpha, clamped the way a
/// unorm target would store it.
#[inline]
pub fn sprite_color(point_coord: Vec2) -> Vec4 {
    Vec4::new(1.0, 1.0, 1.0, sprite_strength(point_coord).clamp(0.0, 1.0))
}

/// Runs the vertex stage for one firefly.
pub fn animate(fly: &Firefly, u: &FireflyUniforms, view: &Mat4) -> Sprite {
    let world = displace(fly.base(), fly.scale, u.time);
    let view_z = view.transform_point3(world).z;
    Sprite {
        world,
        view_z,
        size_px: point_size(u, fly.scale, view_z),
    }
}

/// Runs the vertex stage over the whole ensemble. Elements are independent,
/// so the output order matches the input and nothing else is shared.
pub fn animate_all(flies: &[Firefly], u: &FireflyUniforms, view: &Mat4) -> Vec<Sprite> {
    flies.iter().map(|f| animate(f, u, view)).collect()
}
