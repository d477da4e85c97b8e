use anyhow::Context;
use clap::ValueEnum;
use std::path::Path;

use portal_core::fireflies::{animate_all, scatter_seeded, FireflyUniforms};
use portal_core::portal::PortalUniforms;
use portal_core::preview::{render_portal, splat_fireflies, Image};
use portal_core::{Camera, DebugParams};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SnapshotKind {
    /// The portal surface, filling the image in uv space
    Portal,
    /// The firefly ensemble seen from the default camera
    Fireflies,
}

pub fn render(kind: SnapshotKind, params: &DebugParams, time: f32, size: (u32, u32)) -> Image {
    let (width, height) = size;
    match kind {
        SnapshotKind::Portal => {
            let uniforms = PortalUniforms {
                time,
                color_start: params.portal_color_start.to_vec3(),
                color_end: params.portal_color_end.to_vec3(),
            };
            render_portal(width, height, &uniforms)
        }
        SnapshotKind::Fireflies => {
            let camera = Camera {
                aspect: width as f32 / height.max(1) as f32,
                ..Camera::default()
            };
            let uniforms = FireflyUniforms {
                size: params.firefly_size,
                time,
                pixel_ratio: 1.0,
            };
            let flies = scatter_seeded(params.firefly_count, params.firefly_seed.or(Some(0)));
            let sprites = animate_all(&flies, &uniforms, &camera.view_matrix());
            let mut image = Image::filled(width, height, params.clear_color.to_vec3());
            splat_fireflies(&mut image, &sprites, &camera.view_proj());
            image
        }
    }
}

pub fn write(
    kind: SnapshotKind,
    params: &DebugParams,
    time: f32,
    size: (u32, u32),
    out: &Path,
) -> anyhow::Result<()> {
    let image = render(kind, params, time, size);
    image
        .write_ppm(out)
        .with_context(|| format!("writing {}", out.display()))?;
    log::info!(
        "[snapshot] {:?} at t={:.2}s, {}x{} -> {}",
        kind,
        time,
        size.0,
        size.1,
        out.display()
    );
    Ok(())
}
