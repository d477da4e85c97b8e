// Integration tests for the frame driver, using a hand-driven clock.

use std::convert::Infallible;

use portal_core::controls::ControlValue;
use portal_core::{
    Clock, DebugParams, FrameDriver, FrameSink, FrameState, ManualTime, PendingScene, SceneError,
    SceneGraph, SceneTransform, PORTAL_NODE,
};

#[derive(Default)]
struct Recorder {
    frames: Vec<FrameState>,
    uploads: usize,
}

impl FrameSink for Recorder {
    type Error = Infallible;

    fn upload_scene(&mut self, _scene: &SceneGraph) -> Result<(), Self::Error> {
        self.uploads += 1;
        Ok(())
    }

    fn draw(&mut self, frame: &FrameState) -> Result<(), Self::Error> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

fn driver_with(params: DebugParams) -> (FrameDriver<ManualTime>, ManualTime) {
    let time = ManualTime::new();
    let mut driver = FrameDriver::with_clock(params, Clock::with_source(time.clone()));
    driver.start();
    (driver, time)
}

fn driver() -> (FrameDriver<ManualTime>, ManualTime) {
    driver_with(DebugParams {
        firefly_seed: Some(3),
        ..Default::default()
    })
}

#[test]
fn uniforms_carry_the_clock_reading() {
    let (mut d, time) = driver();
    let mut sink = Recorder::default();
    for t in [0.0, 0.016, 0.5, 3.25] {
        time.set(t);
        let f = d.tick(&mut sink).unwrap();
        assert_eq!(f.time, t as f32);
        assert_eq!(f.uniforms.fireflies.time, f.time);
        assert_eq!(f.uniforms.portal.time, f.time);
        assert_eq!(d.elapsed(), f.time);
        assert_eq!(d.uniforms().portal.time, f.time);
    }
    assert_eq!(sink.frames.len(), 4);
    assert_eq!(d.frame_count(), 4);
}

#[test]
fn time_never_goes_backwards() {
    let (mut d, time) = driver();
    let mut sink = Recorder::default();
    time.set(2.0);
    d.tick(&mut sink).unwrap();
    time.set(1.5);
    d.tick(&mut sink).unwrap();
    time.set(2.5);
    d.tick(&mut sink).unwrap();
    let times: Vec<f32> = sink.frames.iter().map(|f| f.time).collect();
    assert_eq!(times, vec![2.0, 2.0, 2.5]);
}

#[test]
fn ticking_without_start_starts_the_clock() {
    let time = ManualTime::new();
    time.set(10.0);
    let mut d = FrameDriver::with_clock(DebugParams::default(), Clock::with_source(time.clone()));
    let mut sink = Recorder::default();
    assert_eq!(d.tick(&mut sink).unwrap().time, 0.0);
    time.advance(0.25);
    assert_eq!(d.tick(&mut sink).unwrap().time, 0.25);
}

#[test]
fn loaded_scene_is_bound_and_uploaded_once() {
    let (mut d, time) = driver();
    let mut sink = Recorder::default();
    d.load_scene(PendingScene::ready(Ok(SceneGraph::portal_diorama())));
    assert!(d.is_loading());
    time.set(0.1);
    let f = d.tick(&mut sink).unwrap();
    assert!(f.scene_loaded);
    assert!(!d.is_loading());
    time.set(0.2);
    d.tick(&mut sink).unwrap();
    assert_eq!(sink.uploads, 1);
    let scene = d.scene().unwrap();
    assert_eq!(
        scene.node(PORTAL_NODE).unwrap().material,
        portal_core::Material::PortalLights
    );
}

#[test]
fn failed_load_leaves_scene_empty() {
    let (mut d, _time) = driver();
    let mut sink = Recorder::default();
    d.load_scene(PendingScene::ready(Err(SceneError::Fetch("404".into()))));
    d.tick(&mut sink).unwrap();
    assert!(d.scene().is_none());
    assert!(!d.is_loading());
    assert_eq!(sink.uploads, 0);
}

#[test]
fn model_without_portal_node_is_rejected() {
    let (mut d, _time) = driver();
    let mut sink = Recorder::default();
    let mut graph = SceneGraph::portal_diorama();
    graph.nodes.retain(|n| n.name != PORTAL_NODE);
    d.load_scene(PendingScene::ready(Ok(graph)));
    let f = d.tick(&mut sink).unwrap();
    assert!(!f.scene_loaded);
    assert!(d.scene().is_none());
}

#[test]
fn dropped_loader_closes_quietly() {
    let (mut d, _time) = driver();
    let mut sink = Recorder::default();
    let (tx, pending) = PendingScene::channel();
    d.load_scene(pending);
    d.tick(&mut sink).unwrap();
    assert!(d.is_loading());
    drop(tx);
    d.tick(&mut sink).unwrap();
    assert!(!d.is_loading());
    assert!(d.scene().is_none());
}

#[test]
fn intro_scales_firefly_size_and_scene() {
    let (mut d, time) = driver();
    let mut sink = Recorder::default();
    d.load_scene(PendingScene::ready(Ok(SceneGraph::portal_diorama())));

    time.set(1.0);
    let f = d.tick(&mut sink).unwrap();
    assert_eq!(f.uniforms.fireflies.size, 100.0);
    assert_eq!(f.scene_transform, SceneTransform::IDENTITY);

    // Firefly tween created at 13s and still in its delay; scene tween not yet
    time.set(13.8);
    let f = d.tick(&mut sink).unwrap();
    assert_eq!(f.uniforms.fireflies.size, 0.0);
    assert_eq!(f.scene_transform, SceneTransform::IDENTITY);

    time.set(14.5);
    let f = d.tick(&mut sink).unwrap();
    assert!(f.uniforms.fireflies.size > 0.0 && f.uniforms.fireflies.size < 100.0);
    assert!(f.scene_transform.scale > 0.0 && f.scene_transform.scale < 1.0);

    time.set(30.0);
    let f = d.tick(&mut sink).unwrap();
    assert_eq!(f.uniforms.fireflies.size, 100.0);
    assert_eq!(f.scene_transform.scale, 1.0);
    assert_eq!(f.scene_transform.rotation_y, 0.0);
}

#[test]
fn panel_size_applies_through_intro_factor() {
    let (mut d, time) = driver();
    let mut sink = Recorder::default();
    d.apply_control("Flies Size", ControlValue::Number(250.0))
        .unwrap();
    time.set(0.5);
    assert_eq!(d.tick(&mut sink).unwrap().uniforms.fireflies.size, 250.0);
    time.set(13.5);
    assert_eq!(d.tick(&mut sink).unwrap().uniforms.fireflies.size, 0.0);
}

#[test]
fn resize_updates_aspect_and_capped_pixel_ratio() {
    let (mut d, time) = driver();
    let mut sink = Recorder::default();
    d.resize(800, 600, 3.0);
    time.set(0.1);
    let f = d.tick(&mut sink).unwrap();
    assert!((f.camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    assert_eq!(f.uniforms.fireflies.pixel_ratio, 2.0);

    d.resize(0, 600, 1.0);
    assert_eq!(d.viewport().width, 800);
}

#[test]
fn panel_colours_reach_portal_uniforms() {
    let (mut d, time) = driver();
    let mut sink = Recorder::default();
    d.apply_control(
        "Inner Colour",
        ControlValue::parse("#ff0000").unwrap(),
    )
    .unwrap();
    time.set(0.1);
    let f = d.tick(&mut sink).unwrap();
    assert_eq!(f.uniforms.portal.color_start, glam::Vec3::X);
}

#[test]
fn ensemble_size_follows_params() {
    let (d, _) = driver_with(DebugParams {
        firefly_count: 5,
        firefly_seed: Some(1),
        ..Default::default()
    });
    assert_eq!(d.fireflies().len(), 5);
}

/// Refuses the first `failures` uploads.
struct FlakySink {
    failures: usize,
    uploads: usize,
}

impl FrameSink for FlakySink {
    type Error = &'static str;

    fn upload_scene(&mut self, _scene: &SceneGraph) -> Result<(), Self::Error> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err("upload failed");
        }
        self.uploads += 1;
        Ok(())
    }

    fn draw(&mut self, _frame: &FrameState) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[test]
fn failed_upload_keeps_scene_and_defers_intro() {
    let (mut d, time) = driver();
    let mut sink = FlakySink {
        failures: 1,
        uploads: 0,
    };
    d.load_scene(PendingScene::ready(Ok(SceneGraph::portal_diorama())));

    time.set(1.0);
    assert_eq!(d.tick(&mut sink).err(), Some("upload failed"));
    assert!(d.scene().is_none());
    assert!(!d.is_loading());

    // Retried on the next tick; the intro is anchored there, not at the failure
    time.set(3.0);
    let f = d.tick(&mut sink).unwrap();
    assert!(f.scene_loaded);
    assert_eq!(sink.uploads, 1);
    assert!(d.scene().is_some());
    let load_delay = d.params().load_delay_secs();
    assert_eq!(d.frame_at(1.0 + load_delay + 0.5).scene_transform, SceneTransform::IDENTITY);
    assert_ne!(d.frame_at(3.0 + load_delay + 0.5).scene_transform, SceneTransform::IDENTITY);

    time.set(4.0);
    d.tick(&mut sink).unwrap();
    assert_eq!(sink.uploads, 1);
}

#[test]
fn panel_camera_edit_reaches_the_frame() {
    let (mut d, time) = driver();
    let mut sink = Recorder::default();
    d.apply_control("Enable Orbit Control", ControlValue::Bool(false))
        .unwrap();
    d.apply_control("Position Y", ControlValue::Number(7.5)).unwrap();
    assert_eq!(d.camera().eye.y, 7.5);
    time.set(0.1);
    let f = d.tick(&mut sink).unwrap();
    assert_eq!(f.camera.eye, d.camera().eye);
}
