use glam::Vec3;

// Shared kernel and scene tuning constants used by the CPU kernels, the WGSL
// ports and both frontends.

// Fireflies
pub const FIREFLY_COUNT: usize = 34;
pub const FIREFLY_SPREAD_XZ: f32 = 4.0; // base x/z drawn from [-2, 2)
pub const FIREFLY_MAX_HEIGHT: f32 = 1.5; // base y drawn from [0, 1.5)
pub const FIREFLY_WOBBLE_FREQ: f32 = 100.0; // phase offset per world unit
pub const FIREFLY_WOBBLE_AMP: f32 = 0.2; // world units at scale 1
pub const SPRITE_GLOW: f32 = 0.05; // numerator of the 1/d falloff
pub const SPRITE_CUTOFF: f32 = 0.1; // subtracted so the rim fades to zero

// Portal surface
pub const PORTAL_UV_SCALE: f32 = 5.0;
pub const PORTAL_WARP_SPEED: f32 = 0.1;
pub const PORTAL_PATTERN_SPEED: f32 = 0.2;
pub const PORTAL_GLOW_SCALE: f32 = 5.0;
pub const PORTAL_GLOW_OFFSET: f32 = 1.4;
pub const PORTAL_STEP_EDGE: f32 = -0.2;
pub const PORTAL_STEP_BOOST: f32 = 0.8;

// Camera and viewport
pub const CAMERA_FOV_DEG: f32 = 45.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 100.0;
pub const CAMERA_EYE: [f32; 3] = [4.8, 2.9, 5.8];
pub const MAX_PIXEL_RATIO: f32 = 2.0;
pub const ORBIT_DAMPING: f32 = 0.05;

// Scene node names the material binding looks for
pub const PORTAL_NODE: &str = "PortalLights";
pub const LAMP_NODES: [&str; 2] = ["LampLight_1", "LampLight_2"];
pub const BAKED_ROOT_NODE: &str = "PortalScene";

#[inline]
pub fn camera_eye_vec3() -> Vec3 {
    Vec3::from(CAMERA_EYE)
}

// Flat tint for baked surfaces when no baked texture is available
pub const BAKED_TINT: [f32; 3] = [0.55, 0.48, 0.40];
