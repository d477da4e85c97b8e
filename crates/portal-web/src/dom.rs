use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Registers `handler` for `event` on `target` for the lifetime of the page.
pub fn add_listener<E>(target: &web::EventTarget, event: &str, mut handler: impl FnMut(E) + 'static)
where
    E: JsCast + 'static,
{
    let closure = Closure::wrap(Box::new(move |ev: web::Event| {
        if let Ok(ev) = ev.dyn_into::<E>() {
            handler(ev);
        }
    }) as Box<dyn FnMut(web::Event)>);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
    {
        log::warn!("[dom] could not listen for {event}: {e:?}");
    }
    closure.forget();
}

/// CSS size of the canvas and the device pixel ratio.
pub fn canvas_css_size(canvas: &web::HtmlCanvasElement) -> (u32, u32, f32) {
    let dpr = web::window().map_or(1.0, |w| w.device_pixel_ratio());
    let rect = canvas.get_bounding_client_rect();
    (
        rect.width().round().max(1.0) as u32,
        rect.height().round().max(1.0) as u32,
        dpr as f32,
    )
}

/// Sets the canvas backing store to `physical` device pixels.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, physical: (u32, u32)) {
    if canvas.width() != physical.0 {
        canvas.set_width(physical.0);
    }
    if canvas.height() != physical.1 {
        canvas.set_height(physical.1);
    }
}

pub fn toggle_fullscreen(canvas: &web::HtmlCanvasElement) {
    let Some(doc) = window_document() else {
        return;
    };
    let result = if doc.fullscreen_element().is_some() {
        doc.exit_fullscreen();
        Ok(())
    } else {
        canvas.request_fullscreen()
    };
    if let Err(e) = result {
        log::warn!("[dom] fullscreen request refused: {e:?}");
    }
}
