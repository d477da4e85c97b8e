use crate::constants::{DOM_DELTA_LINE, DOM_DELTA_PAGE, WHEEL_LINES_PER_STEP, WHEEL_PIXELS_PER_STEP};

/// Tracks one pointer drag and turns moves into deltas in CSS pixels.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct DragTracker {
    pointer: Option<i32>,
    last: [f32; 2],
}

impl DragTracker {
    pub fn begin(&mut self, pointer_id: i32, x: f32, y: f32) {
        self.pointer = Some(pointer_id);
        self.last = [x, y];
    }

    /// Delta since the previous position, or `None` when `pointer_id` is not
    /// the one being dragged.
    pub fn moved(&mut self, pointer_id: i32, x: f32, y: f32) -> Option<[f32; 2]> {
        if self.pointer != Some(pointer_id) {
            return None;
        }
        let d = [x - self.last[0], y - self.last[1]];
        self.last = [x, y];
        Some(d)
    }

    pub fn end(&mut self, pointer_id: i32) {
        if self.pointer == Some(pointer_id) {
            self.pointer = None;
        }
    }

    pub fn is_active(&self) -> bool {
        self.pointer.is_some()
    }
}

/// Wheel input in notches, positive when scrolling down (zoom out).
pub fn wheel_steps(delta_y: f64, delta_mode: u32) -> f32 {
    let steps = match delta_mode {
        DOM_DELTA_LINE => delta_y / WHEEL_LINES_PER_STEP,
        DOM_DELTA_PAGE => delta_y,
        _ => delta_y / WHEEL_PIXELS_PER_STEP,
    };
    steps as f32
}
