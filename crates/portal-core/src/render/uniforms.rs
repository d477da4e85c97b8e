//! GPU-side uniform layouts. Field order and padding follow the WGSL structs.

use glam::{Mat4, Vec3};

use crate::fireflies::FireflyUniforms;
use crate::portal::PortalUniforms;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct MeshGpu {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4],
}

impl MeshGpu {
    pub(crate) fn new(view_proj: Mat4, model: Mat4, color: Vec3, lit: bool) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            color: color.extend(1.0).to_array(),
            params: [if lit { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct PortalGpu {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color_start: [f32; 4],
    color_end: [f32; 4],
    params: [f32; 4],
}

impl PortalGpu {
    pub(crate) fn new(view_proj: Mat4, model: Mat4, u: &PortalUniforms) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            color_start: u.color_start.extend(1.0).to_array(),
            color_end: u.color_end.extend(1.0).to_array(),
            params: [u.time, 0.0, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct FireflyGpu {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    viewport: [f32; 2],
    size: f32,
    time: f32,
    pixel_ratio: f32,
    _pad: [f32; 3],
}

impl FireflyGpu {
    /// `viewport` is the render target size in device pixels.
    pub(crate) fn new(view: Mat4, proj: Mat4, viewport: [f32; 2], u: &FireflyUniforms) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            viewport,
            size: u.size,
            time: u.time,
            pixel_ratio: u.pixel_ratio,
            _pad: [0.0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<MeshGpu>(), 160);
        assert_eq!(std::mem::size_of::<PortalGpu>(), 176);
        assert_eq!(std::mem::size_of::<FireflyGpu>(), 160);
    }
}
