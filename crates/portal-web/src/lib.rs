#![cfg(target_arch = "wasm32")]
use anyhow::anyhow;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

use portal_core::controls::{self, ControlValue};
use portal_core::{DebugParams, FrameDriver, PendingScene, Renderer, SceneGraph};

mod constants;
mod dom;
mod events;
mod frame;
mod input;
mod loader;

use constants::{CANVAS_ID, MODEL_ATTR};

/// Everything one page owns: the driver, the GPU side and the canvas.
pub(crate) struct App {
    pub driver: FrameDriver,
    pub renderer: Renderer<'static>,
    pub canvas: web::HtmlCanvasElement,
}

impl App {
    /// Re-reads the canvas CSS size and resizes the backing store, the
    /// surface and the driver to match.
    pub fn sync_size(&mut self) {
        let (w, h, dpr) = dom::canvas_css_size(&self.canvas);
        self.driver.resize(w, h, dpr);
        let physical = self
            .driver
            .viewport()
            .physical_size(self.driver.params().max_pixel_ratio);
        dom::sync_canvas_backing_size(&self.canvas, physical);
        self.renderer.resize(physical.0, physical.1);
    }
}

thread_local! {
    static APP: RefCell<Option<Rc<RefCell<App>>>> = const { RefCell::new(None) };
}

fn with_app<R>(f: impl FnOnce(&mut App) -> Result<R, JsValue>) -> Result<R, JsValue> {
    let app = APP
        .with(|slot| slot.borrow().clone())
        .ok_or_else(|| JsValue::from_str("portal is not running yet"))?;
    let mut app = app.borrow_mut();
    f(&mut app)
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("portal-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow!("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow!("missing #{CANVAS_ID}"))?
        .dyn_into()
        .map_err(|e| anyhow!("#{CANVAS_ID} is not a canvas: {e:?}"))?;

    let (w, h, dpr) = dom::canvas_css_size(&canvas);
    let mut driver = FrameDriver::new(DebugParams::default());
    driver.resize(w, h, dpr);
    let physical = driver
        .viewport()
        .physical_size(driver.params().max_pixel_ratio);
    dom::sync_canvas_backing_size(&canvas, physical);

    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
    let mut renderer = Renderer::new(&instance, surface, physical.0, physical.1).await?;
    renderer.upload_fireflies(driver.fireflies());

    let pending = match canvas.get_attribute(MODEL_ATTR) {
        Some(url) => loader::fetch_scene(url),
        None => PendingScene::ready(Ok(SceneGraph::portal_diorama())),
    };
    driver.load_scene(pending);
    driver.start();

    let app = Rc::new(RefCell::new(App {
        driver,
        renderer,
        canvas,
    }));
    APP.with(|slot| *slot.borrow_mut() = Some(Rc::clone(&app)));
    events::wire(&app);
    frame::start_loop(app);
    Ok(())
}

/// Sets a debug panel control by label. Returns the stored value, after
/// clamping and snapping, as a string.
#[wasm_bindgen]
pub fn set_control(label: &str, value: &str) -> Result<String, JsValue> {
    let value = ControlValue::parse(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    with_app(|app| {
        app.driver
            .apply_control(label, value)
            .map(|stored| stored.as_string())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    })
}

/// Current value of a debug panel control, as a string.
#[wasm_bindgen]
pub fn get_control(label: &str) -> Result<String, JsValue> {
    let control = controls::find(label).map_err(|e| JsValue::from_str(&e.to_string()))?;
    with_app(|app| Ok(control.read(&app.driver.control_target()).as_string()))
}

/// Labels of every panel control, in panel order.
#[wasm_bindgen]
pub fn control_labels() -> js_sys::Array {
    controls::PANEL
        .iter()
        .map(|c| JsValue::from_str(c.label))
        .collect()
}
