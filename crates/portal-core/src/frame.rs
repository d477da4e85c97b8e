//! Frame driver: owns the clock, both uniform sets, the camera and the scene,
//! and pushes one `FrameState` per refresh into a `FrameSink`.

use glam::Vec3;

use crate::clock::{Clock, MonotonicTime, TimeSource};
use crate::controls::{self, ControlTarget, ControlValue};
use crate::error::ControlError;
use crate::fireflies::{scatter_seeded, Firefly, FireflyUniforms};
use crate::params::DebugParams;
use crate::portal::PortalUniforms;
use crate::scene::{PendingScene, SceneGraph, ScenePoll, SceneTransform};
use crate::state::{Camera, OrbitControls, Viewport};
use crate::tween::Intro;

/// Both kernels' uniforms, written together once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneUniforms {
    pub fireflies: FireflyUniforms,
    pub portal: PortalUniforms,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug)]
pub struct FrameState {
    pub index: u64,
    pub time: f32,
    pub uniforms: SceneUniforms,
    pub camera: Camera,
    pub viewport: Viewport,
    pub clear_color: Vec3,
    pub lamp_color: Vec3,
    pub scene_transform: SceneTransform,
    pub scene_loaded: bool,
}

/// Where frames go. The GPU renderer is one; tests use recorders.
pub trait FrameSink {
    type Error;

    /// Called once when the model has been loaded and bound.
    fn upload_scene(&mut self, _scene: &SceneGraph) -> Result<(), Self::Error> {
        Ok(())
    }

    fn draw(&mut self, frame: &FrameState) -> Result<(), Self::Error>;
}

pub struct FrameDriver<S: TimeSource = MonotonicTime> {
    clock: Clock<S>,
    params: DebugParams,
    camera: Camera,
    orbit: OrbitControls,
    viewport: Viewport,
    uniforms: SceneUniforms,
    fireflies: Vec<Firefly>,
    scene: Option<SceneGraph>,
    scene_uploaded: bool,
    pending: Option<PendingScene>,
    intro: Intro,
    frames: u64,
}

impl FrameDriver<MonotonicTime> {
    pub fn new(params: DebugParams) -> Self {
        Self::with_clock(params, Clock::new())
    }
}

impl<S: TimeSource> FrameDriver<S> {
    pub fn with_clock(params: DebugParams, clock: Clock<S>) -> Self {
        let fireflies = scatter_seeded(params.firefly_count, params.firefly_seed);
        let intro = Intro::new(&params);
        let mut driver = Self {
            clock,
            params,
            camera: Camera::default(),
            orbit: OrbitControls::default(),
            viewport: Viewport::default(),
            uniforms: SceneUniforms::default(),
            fireflies,
            scene: None,
            scene_uploaded: false,
            pending: None,
            intro,
            frames: 0,
        };
        driver.sync_uniforms(0.0);
        driver
    }

    /// Starts the clock. Ticking also starts it, so calling this is optional.
    pub fn start(&mut self) {
        if !self.clock.is_running() {
            self.clock.start();
            log::info!(
                "[frame] started with {} fireflies",
                self.fireflies.len()
            );
        }
    }

    /// Hands over the receiving end of a model load.
    pub fn load_scene(&mut self, pending: PendingScene) {
        self.pending = Some(pending);
    }

    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) {
        if !self.viewport.resize(width, height, device_pixel_ratio) {
            return;
        }
        self.camera.aspect = self.viewport.aspect();
        self.uniforms.fireflies.pixel_ratio =
            self.viewport.pixel_ratio(self.params.max_pixel_ratio);
        log::info!(
            "[frame] resize {}x{} @{}",
            width,
            height,
            self.uniforms.fireflies.pixel_ratio
        );
    }

    /// One refresh: read the clock, splice in a finished load, advance the
    /// orbit, write the uniforms and draw.
    ///
    /// A loaded scene is kept until the sink accepts it; the upload is retried
    /// on later ticks and the intro starts only once it succeeds.
    pub fn tick<K: FrameSink>(&mut self, sink: &mut K) -> Result<FrameState, K::Error> {
        let t = self.clock.elapsed_time();
        if let Some(scene) = self.poll_scene(t) {
            self.scene = Some(scene);
            self.scene_uploaded = false;
        }
        if let (Some(scene), false) = (&self.scene, self.scene_uploaded) {
            if let Err(e) = sink.upload_scene(scene) {
                log::error!("[scene] upload failed, retrying next frame");
                return Err(e);
            }
            self.scene_uploaded = true;
            self.intro.scene_loaded(t);
        }
        if self.orbit.enabled {
            self.orbit.update(&mut self.camera);
        }
        let frame = self.frame_at(t);
        sink.draw(&frame)?;
        self.frames += 1;
        Ok(frame)
    }

    /// Builds the frame for time `t` without drawing it.
    pub fn frame_at(&mut self, t: f32) -> FrameState {
        self.sync_uniforms(t);
        FrameState {
            index: self.frames,
            time: t,
            uniforms: self.uniforms,
            camera: self.camera.clone(),
            viewport: self.viewport,
            clear_color: self.params.clear_color.to_vec3(),
            lamp_color: self.params.lamp_color.to_vec3(),
            scene_transform: self.intro.scene_transform(t),
            scene_loaded: self.scene_uploaded,
        }
    }

    fn sync_uniforms(&mut self, t: f32) {
        let f = &mut self.uniforms.fireflies;
        f.time = t;
        f.size = self.params.firefly_size * self.intro.firefly_size_factor(t);
        f.pixel_ratio = self.viewport.pixel_ratio(self.params.max_pixel_ratio);
        let p = &mut self.uniforms.portal;
        p.time = t;
        p.color_start = self.params.portal_color_start.to_vec3();
        p.color_end = self.params.portal_color_end.to_vec3();
    }

    fn poll_scene(&mut self, t: f32) -> Option<SceneGraph> {
        let pending = self.pending.as_mut()?;
        let result = match pending.poll() {
            ScenePoll::Pending => return None,
            ScenePoll::Closed => {
                log::warn!("[scene] loader closed without a result");
                self.pending = None;
                return None;
            }
            ScenePoll::Ready(result) => result,
        };
        self.pending = None;
        let bound = result.and_then(|mut graph| graph.bind_materials().map(|_| graph));
        match bound {
            Ok(graph) => {
                log::info!(
                    "[scene] loaded {} nodes, {} triangles at t={:.2}s",
                    graph.nodes.len(),
                    graph.triangle_count(),
                    t
                );
                Some(graph)
            }
            Err(e) => {
                log::error!("[scene] load failed: {e}");
                None
            }
        }
    }

    /// Applies a debug panel value by label.
    pub fn apply_control(
        &mut self,
        label: &str,
        value: ControlValue,
    ) -> Result<ControlValue, ControlError> {
        controls::apply(label, value, &mut self.control_target())
    }

    pub fn nudge_control(&mut self, label: &str, steps: i32) -> Result<ControlValue, ControlError> {
        controls::find(label)?.nudge(steps, &mut self.control_target())
    }

    pub fn control_target(&mut self) -> ControlTarget<'_> {
        ControlTarget {
            params: &mut self.params,
            camera: &mut self.camera,
            orbit: &mut self.orbit,
        }
    }

    pub fn uniforms(&self) -> &SceneUniforms {
        &self.uniforms
    }

    pub fn fireflies(&self) -> &[Firefly] {
        &self.fireflies
    }

    /// The scene once it has been loaded, bound and uploaded.
    pub fn scene(&self) -> Option<&SceneGraph> {
        self.scene.as_ref().filter(|_| self.scene_uploaded)
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn params(&self) -> &DebugParams {
        &self.params
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Pointer drag in device pixels.
    pub fn orbit_drag(&mut self, dx_px: f32, dy_px: f32) {
        self.orbit.rotate(dx_px, dy_px, &self.viewport);
    }

    pub fn orbit_zoom(&mut self, delta: f32) {
        self.orbit.zoom(delta);
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Last time value written into the uniforms.
    pub fn elapsed(&self) -> f32 {
        self.clock.last_elapsed()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}
