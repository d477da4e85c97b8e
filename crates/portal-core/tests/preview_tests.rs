// Integration tests for the CPU reference renderer.

use glam::{Vec2, Vec3};
use portal_core::fireflies::{animate_all, Firefly, FireflyUniforms, Sprite};
use portal_core::portal::{shade, PortalUniforms};
use portal_core::preview::{render_portal, splat_fireflies, Image};
use portal_core::Camera;

#[test]
fn portal_image_samples_texel_centres() {
    let u = PortalUniforms {
        time: 1.5,
        ..Default::default()
    };
    let img = render_portal(16, 8, &u);
    assert_eq!((img.width, img.height), (16, 8));
    assert_eq!(img.pixels.len(), 128);
    // Top-left texel centre, v pointing up
    let expected = shade(Vec2::new(0.5 / 16.0, 1.0 - 0.5 / 8.0), &u).truncate();
    assert_eq!(img.get(0, 0), Some(expected));
    assert!(img.pixels.iter().all(|p| p.is_finite()));
    assert_eq!(img.get(16, 0), None);
}

#[test]
fn ppm_encoding_clamps_channels() {
    let mut img = Image::filled(2, 1, Vec3::new(0.5, 2.0, -1.0));
    img.pixels[1] = Vec3::ONE;
    let ppm = img.to_ppm();
    let header = b"P6\n2 1\n255\n";
    assert_eq!(&ppm[..header.len()], header);
    assert_eq!(&ppm[header.len()..], &[128, 255, 0, 255, 255, 255]);
}

#[test]
fn fireflies_brighten_the_background() {
    let mut cam = Camera::default();
    cam.aspect = 1.0;
    let clear = Vec3::new(0.04, 0.07, 0.07);
    let mut img = Image::filled(64, 64, clear);
    let flies = vec![Firefly::new(Vec3::ZERO, 1.0)];
    let u = FireflyUniforms {
        size: 100.0,
        time: 0.0,
        pixel_ratio: 1.0,
    };
    let sprites = animate_all(&flies, &u, &cam.view_matrix());
    splat_fireflies(&mut img, &sprites, &cam.view_proj());
    let brightest = img
        .pixels
        .iter()
        .map(|p| p.x)
        .fold(f32::MIN, f32::max);
    assert!(brightest > clear.x + 0.5);
    // Additive: nothing gets darker
    assert!(img.pixels.iter().all(|p| p.x >= clear.x));
}

#[test]
fn invisible_sprites_leave_image_untouched() {
    let cam = Camera::default();
    let clear = Vec3::splat(0.1);
    let mut img = Image::filled(32, 32, clear);
    let sprites = [
        Sprite {
            world: Vec3::ZERO,
            view_z: -5.0,
            size_px: 0.0,
        },
        Sprite {
            world: cam.eye + (cam.eye - cam.target),
            view_z: 5.0,
            size_px: 40.0,
        },
    ];
    splat_fireflies(&mut img, &sprites, &cam.view_proj());
    assert!(img.pixels.iter().all(|p| *p == clear));
}
