use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{Fullscreen, Window, WindowBuilder};

use portal_core::controls::{key_action, KeyAction};
use portal_core::{DebugParams, FrameDriver, PendingScene, Renderer, SceneGraph};

mod snapshot;

use snapshot::SnapshotKind;

#[derive(Parser, Debug)]
#[command(version, about = "Portal diorama (native)")]
struct Args {
    /// Wavefront OBJ to load instead of the built-in diorama
    #[arg(long)]
    model: Option<PathBuf>,

    /// JSON file with debug parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render one frame on the CPU and exit
    #[arg(long, value_enum)]
    snapshot: Option<SnapshotKind>,

    /// Seconds on the clock for --snapshot
    #[arg(long, default_value_t = 0.0)]
    time: f32,

    /// Image size for --snapshot, WIDTHxHEIGHT
    #[arg(long, default_value = "512x512", value_parser = parse_size)]
    size: (u32, u32),

    /// Output path for --snapshot
    #[arg(long, default_value = "snapshot.ppm")]
    out: PathBuf,

    /// Print the effective parameters as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    if w == 0 || h == 0 {
        return Err("size must be non-zero".into());
    }
    Ok((w, h))
}

/// DOM-style name for the keys the shortcuts use.
fn key_name(key: &Key) -> Option<&str> {
    match key {
        Key::Character(c) => Some(c.as_str()),
        Key::Named(NamedKey::ArrowLeft) => Some("ArrowLeft"),
        Key::Named(NamedKey::ArrowRight) => Some("ArrowRight"),
        Key::Named(NamedKey::ArrowUp) => Some("ArrowUp"),
        Key::Named(NamedKey::ArrowDown) => Some("ArrowDown"),
        Key::Named(NamedKey::PageUp) => Some("PageUp"),
        Key::Named(NamedKey::PageDown) => Some("PageDown"),
        _ => None,
    }
}

fn toggle_fullscreen(window: &Window) {
    if window.fullscreen().is_some() {
        window.set_fullscreen(None);
    } else {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    }
}

/// Resizes the surface to the window and the driver to the window's logical
/// size at `scale_factor`.
fn sync_size(
    window: &Window,
    scale_factor: f64,
    driver: &mut FrameDriver,
    renderer: &mut Renderer<'_>,
) {
    let size = window.inner_size();
    renderer.resize(size.width, size.height);
    let logical = size.to_logical::<u32>(scale_factor);
    driver.resize(logical.width, logical.height, scale_factor as f32);
}

/// Native surfaces always cover the whole window, so the firefly pixel ratio
/// has to follow the real scale factor; the cap only applies on the web.
fn native_params(mut params: DebugParams) -> DebugParams {
    if params.max_pixel_ratio.is_finite() {
        log::debug!(
            "[native] max_pixel_ratio {} ignored, following the window scale factor",
            params.max_pixel_ratio
        );
    }
    params.max_pixel_ratio = f32::INFINITY;
    params
}

fn load_params(args: &Args) -> anyhow::Result<DebugParams> {
    match &args.config {
        Some(path) => DebugParams::load(path).context("loading --config"),
        None => Ok(DebugParams::default()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let params = load_params(&args)?;

    if args.print_config {
        println!("{}", params.to_json_pretty()?);
        return Ok(());
    }
    if let Some(kind) = args.snapshot {
        return snapshot::write(kind, &params, args.time, args.size, &args.out);
    }

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Portal")
            .build(&event_loop)?,
    );

    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(Arc::clone(&window))?;
    let size = window.inner_size();
    let mut renderer =
        pollster::block_on(Renderer::new(&instance, surface, size.width, size.height))?;

    let mut scale_factor = window.scale_factor();
    let mut driver = FrameDriver::new(native_params(params));
    sync_size(&window, scale_factor, &mut driver, &mut renderer);
    renderer.upload_fireflies(driver.fireflies());

    let model = args.model.clone();
    driver.load_scene(PendingScene::spawn(move || match model {
        Some(path) => SceneGraph::load_obj_file(path),
        None => Ok(SceneGraph::portal_diorama()),
    }));
    driver.start();

    let mut dragging = false;
    let mut cursor: Option<PhysicalPosition<f64>> = None;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(_) => {
                sync_size(&window, scale_factor, &mut driver, &mut renderer)
            }
            WindowEvent::ScaleFactorChanged {
                scale_factor: factor,
                ..
            } => {
                scale_factor = factor;
                sync_size(&window, scale_factor, &mut driver, &mut renderer);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => dragging = state == ElementState::Pressed,
            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some(last)) = (dragging, cursor) {
                    let dx = (position.x - last.x) / scale_factor;
                    let dy = (position.y - last.y) / scale_factor;
                    driver.orbit_drag(dx as f32, dy as f32);
                }
                cursor = Some(position);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32,
                };
                driver.orbit_zoom(-y);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if logical_key == Key::Named(NamedKey::Escape) {
                    elwt.exit();
                    return;
                }
                match key_name(&logical_key).and_then(key_action) {
                    Some(KeyAction::Nudge { label, steps }) => {
                        if let Err(e) = driver.nudge_control(label, steps) {
                            log::warn!("[panel] {e}");
                        }
                    }
                    Some(KeyAction::Fullscreen) => toggle_fullscreen(&window),
                    None => {}
                }
            }
            _ => {}
        },
        Event::AboutToWait => match driver.tick(&mut renderer) {
            Ok(_) => window.request_redraw(),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
            Err(_) => {}
        },
        _ => {}
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_flag_parses_dimensions() {
        assert_eq!(parse_size("640x360"), Ok((640, 360)));
        assert_eq!(parse_size("8X4"), Ok((8, 4)));
        assert!(parse_size("640").is_err());
        assert!(parse_size("0x10").is_err());
    }

    #[test]
    fn cli_defaults() {
        let args = Args::parse_from(["portal-native"]);
        assert!(args.snapshot.is_none());
        assert_eq!(args.size, (512, 512));
        let args = Args::parse_from(["portal-native", "--snapshot", "fireflies", "--time", "2.5"]);
        assert_eq!(args.snapshot, Some(SnapshotKind::Fireflies));
        assert_eq!(args.time, 2.5);
    }

    #[test]
    fn fireflies_snapshot_is_deterministic_with_seed() {
        let params = DebugParams {
            firefly_seed: Some(9),
            ..Default::default()
        };
        let a = snapshot::render(SnapshotKind::Fireflies, &params, 1.0, (32, 24));
        let b = snapshot::render(SnapshotKind::Fireflies, &params, 1.0, (32, 24));
        assert_eq!(a, b);
        assert_eq!((a.width, a.height), (32, 24));
    }

    #[test]
    fn native_viewport_backs_the_whole_window() {
        let params = native_params(DebugParams::default());
        assert!(params.validate().is_ok());
        let mut driver = FrameDriver::new(params);
        driver.resize(800, 600, 3.0);
        assert_eq!(driver.uniforms().fireflies.pixel_ratio, 3.0);
        let cap = driver.params().max_pixel_ratio;
        assert_eq!(driver.viewport().physical_size(cap), (2400, 1800));
    }

    #[test]
    fn named_keys_map_to_dom_names() {
        assert_eq!(key_name(&Key::Named(NamedKey::PageUp)), Some("PageUp"));
        assert_eq!(key_name(&Key::Named(NamedKey::Tab)), None);
    }
}
