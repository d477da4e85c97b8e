//! CPU reference rendering of both kernels, for headless snapshots and tests.

use glam::{Mat4, Vec2, Vec3};
use std::io::Write;
use std::path::Path;

use crate::fireflies::{sprite_color, Sprite};
use crate::portal::{shade, PortalUniforms};

/// Linear RGB image, row-major, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Vec3>,
}

impl Image {
    pub fn filled(width: u32, height: u32, color: Vec3) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width as usize) * (height as usize)],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Vec3> {
        (x < self.width && y < self.height)
            .then(|| self.pixels[(y * self.width + x) as usize])
    }

    /// Binary PPM (P6). Channels are clamped to `[0, 1]`.
    pub fn to_ppm(&self) -> Vec<u8> {
        let mut out = format!("P6\n{} {}\n255\n", self.width, self.height).into_bytes();
        out.reserve(self.pixels.len() * 3);
        for p in &self.pixels {
            for c in p.to_array() {
                out.push((c.clamp(0.0, 1.0) * 255.0).round() as u8);
            }
        }
        out
    }

    pub fn write_ppm(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        file.write_all(&self.to_ppm())?;
        file.flush()
    }
}

/// Evaluates the portal kernel over a `width × height` grid of uv samples at
/// texel centres, with v pointing up.
pub fn render_portal(width: u32, height: u32, u: &PortalUniforms) -> Image {
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    let pixels = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| {
            let uv = Vec2::new((x as f32 + 0.5) / w, 1.0 - (y as f32 + 0.5) / h);
            shade(uv, u).truncate()
        })
        .collect();
    Image {
        width,
        height,
        pixels,
    }
}

/// Additively composites sprites into `image`, weighting white by the sprite
/// alpha. `view_proj` maps the sprites' world positions to clip space.
pub fn splat_fireflies(image: &mut Image, sprites: &[Sprite], view_proj: &Mat4) {
    let (w, h) = (image.width as f32, image.height as f32);
    for s in sprites.iter().filter(|s| s.size_px > 0.0) {
        let clip = *view_proj * s.world.extend(1.0);
        if clip.w <= 0.0 {
            continue;
        }
        let ndc = clip.truncate() / clip.w;
        let cx = (ndc.x + 1.0) * 0.5 * w;
        let cy = (1.0 - ndc.y) * 0.5 * h;
        let half = s.size_px * 0.5;
        let x0 = (cx - half).floor().max(0.0) as u32;
        let y0 = (cy - half).floor().max(0.0) as u32;
        let x1 = ((cx + half).ceil().min(w)).max(0.0) as u32;
        let y1 = ((cy + half).ceil().min(h)).max(0.0) as u32;
        for y in y0..y1 {
            for x in x0..x1 {
                let pc = Vec2::new(
                    (x as f32 + 0.5 - (cx - half)) / s.size_px,
                    (y as f32 + 0.5 - (cy - half)) / s.size_px,
                );
                if pc.x < 0.0 || pc.x > 1.0 || pc.y < 0.0 || pc.y > 1.0 {
                    continue;
                }
                let c = sprite_color(pc);
                let idx = (y * image.width + x) as usize;
                image.pixels[idx] += c.truncate() * c.w;
            }
        }
    }
}
