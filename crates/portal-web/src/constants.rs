// Page wiring and input tuning

// Canvas the renderer attaches to
pub const CANVAS_ID: &str = "webgl";

// Optional canvas attribute naming an OBJ to fetch instead of the built-in model
pub const MODEL_ATTR: &str = "data-model";

// WheelEvent.deltaMode values
pub const DOM_DELTA_PIXEL: u32 = 0;
pub const DOM_DELTA_LINE: u32 = 1;
pub const DOM_DELTA_PAGE: u32 = 2;

// Pixels per wheel notch; browsers report roughly this much per line
pub const WHEEL_PIXELS_PER_STEP: f64 = 100.0;
pub const WHEEL_LINES_PER_STEP: f64 = 3.0;
