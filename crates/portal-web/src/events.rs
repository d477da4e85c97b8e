use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

use portal_core::controls::{key_action, KeyAction};

use crate::dom::{add_listener, toggle_fullscreen};
use crate::input::{wheel_steps, DragTracker};
use crate::App;

/// Hooks pointer, wheel, keyboard and resize events up to the app.
pub fn wire(app: &Rc<RefCell<App>>) {
    let Some(window) = web::window() else {
        return;
    };
    let canvas: web::EventTarget = app.borrow().canvas.clone().unchecked_into();
    let drag = Rc::new(RefCell::new(DragTracker::default()));

    {
        let drag = drag.clone();
        let app = app.clone();
        add_listener(&canvas, "pointerdown", move |ev: web::PointerEvent| {
            if ev.button() != 0 {
                return;
            }
            let pid = ev.pointer_id();
            if let Err(e) = app.borrow().canvas.set_pointer_capture(pid) {
                log::debug!("[dom] pointer capture refused: {e:?}");
            }
            drag.borrow_mut()
                .begin(pid, ev.client_x() as f32, ev.client_y() as f32);
        });
    }
    {
        let drag = drag.clone();
        let app = app.clone();
        add_listener(&canvas, "pointermove", move |ev: web::PointerEvent| {
            let moved = drag
                .borrow_mut()
                .moved(ev.pointer_id(), ev.client_x() as f32, ev.client_y() as f32);
            if let Some([dx, dy]) = moved {
                app.borrow_mut().driver.orbit_drag(dx, dy);
            }
        });
    }
    for name in ["pointerup", "pointercancel"] {
        let drag = drag.clone();
        add_listener(&canvas, name, move |ev: web::PointerEvent| {
            drag.borrow_mut().end(ev.pointer_id());
        });
    }
    {
        let app = app.clone();
        add_listener(&canvas, "wheel", move |ev: web::WheelEvent| {
            ev.prevent_default();
            app.borrow_mut()
                .driver
                .orbit_zoom(wheel_steps(ev.delta_y(), ev.delta_mode()));
        });
    }
    {
        let app = app.clone();
        add_listener(&canvas, "dblclick", move |_: web::MouseEvent| {
            toggle_fullscreen(&app.borrow().canvas);
        });
    }
    {
        let app = app.clone();
        add_listener(&window, "keydown", move |ev: web::KeyboardEvent| {
            match key_action(&ev.key()) {
                Some(KeyAction::Nudge { label, steps }) => {
                    ev.prevent_default();
                    if let Err(e) = app.borrow_mut().driver.nudge_control(label, steps) {
                        log::warn!("[panel] {e}");
                    }
                }
                Some(KeyAction::Fullscreen) => toggle_fullscreen(&app.borrow().canvas),
                None => {}
            }
        });
    }
    {
        let app = app.clone();
        add_listener(&window, "resize", move |_: web::Event| {
            app.borrow_mut().sync_size();
        });
    }
}
