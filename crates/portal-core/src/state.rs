//! Camera, viewport and orbit controls.
//!
//! Nothing here touches a platform API; both frontends drive these types from
//! their own input events.

use glam::{Mat4, Vec3};
use std::f32::consts::PI;

use crate::constants::{
    camera_eye_vec3, CAMERA_FOV_DEG, CAMERA_ZFAR, CAMERA_ZNEAR, ORBIT_DAMPING,
};

/// Right-handed perspective camera.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: camera_eye_vec3(),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy_radians: CAMERA_FOV_DEG.to_radians(),
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }
}

impl Camera {
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Display surface size in logical pixels plus the device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        let mut v = Self::default();
        v.resize(width, height, device_pixel_ratio);
        v
    }

    /// Applies a new size. Zero-sized updates (minimized windows) are ignored
    /// and reported as `false`.
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.width = width;
        self.height = height;
        if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            self.device_pixel_ratio = device_pixel_ratio;
        }
        true
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Device pixel ratio, capped.
    pub fn pixel_ratio(&self, cap: f32) -> f32 {
        self.device_pixel_ratio.min(cap)
    }

    /// Backing-store size in device pixels for a capped pixel ratio.
    pub fn physical_size(&self, cap: f32) -> (u32, u32) {
        let r = self.pixel_ratio(cap);
        (
            ((self.width as f32 * r).round() as u32).max(1),
            ((self.height as f32 * r).round() as u32).max(1),
        )
    }
}

const POLAR_EPS: f32 = 1e-6;

/// Damped orbit around `Camera::target`.
///
/// Input accumulates spherical deltas; each `update` applies a `damping`
/// fraction of them and decays the rest, so motion coasts to a stop.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub enabled: bool,
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    theta_delta: f32,
    phi_delta: f32,
    zoom_scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            enabled: true,
            damping: ORBIT_DAMPING,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.5,
            max_distance: CAMERA_ZFAR * 0.5,
            theta_delta: 0.0,
            phi_delta: 0.0,
            zoom_scale: 1.0,
        }
    }
}

impl OrbitControls {
    /// Pointer drag in device pixels. A drag across the full viewport height
    /// turns the camera once around.
    pub fn rotate(&mut self, dx_px: f32, dy_px: f32, viewport: &Viewport) {
        if !self.enabled {
            return;
        }
        let h = viewport.height.max(1) as f32;
        self.theta_delta -= 2.0 * PI * dx_px / h * self.rotate_speed;
        self.phi_delta -= 2.0 * PI * dy_px / h * self.rotate_speed;
    }

    /// Wheel delta; positive moves away from the target.
    pub fn zoom(&mut self, delta: f32) {
        if !self.enabled || delta == 0.0 {
            return;
        }
        let step = 0.95_f32.powf(self.zoom_speed);
        if delta > 0.0 {
            self.zoom_scale /= step;
        } else {
            self.zoom_scale *= step;
        }
    }

    /// Whether any input is still coasting.
    pub fn is_settling(&self) -> bool {
        self.theta_delta.abs() > POLAR_EPS
            || self.phi_delta.abs() > POLAR_EPS
            || (self.zoom_scale - 1.0).abs() > POLAR_EPS
    }

    /// Moves the camera eye. Returns `true` if it moved.
    ///
    /// The offset is re-read from the camera each call, so direct edits to
    /// `Camera::eye` (the panel's position fields) are kept.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let offset = camera.eye - camera.target;
        let mut radius = offset.length();
        if radius <= f32::EPSILON {
            return false;
        }
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta += self.theta_delta * self.damping;
        phi += self.phi_delta * self.damping;
        phi = phi.clamp(POLAR_EPS, PI - POLAR_EPS);
        radius = (radius * self.zoom_scale).clamp(self.min_distance, self.max_distance);

        self.theta_delta *= 1.0 - self.damping;
        self.phi_delta *= 1.0 - self.damping;
        self.zoom_scale = 1.0;

        let sin_phi = phi.sin();
        let new_offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        let moved = (new_offset - offset).length_squared() > 1e-12;
        camera.eye = camera.target + new_offset;
        moved
    }
}
