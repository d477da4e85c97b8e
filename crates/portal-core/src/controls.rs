//! Debug panel bindings.
//!
//! The panel is a static table of labelled controls. Frontends look a control
//! up by label and push values through it; the control enforces its own range
//! and writes the bound field.

use crate::error::ControlError;
use crate::params::{DebugParams, HexColor, FIREFLY_SIZE_RANGE};
use crate::state::{Camera, OrbitControls};

const CAMERA_RANGE: f32 = 34.0;
const FINE_STEP: f32 = 0.001;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Binding {
    FireflySize,
    PortalColorStart,
    PortalColorEnd,
    ClearColor,
    OrbitEnabled,
    CameraX,
    CameraY,
    CameraZ,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlKind {
    /// `nudge` is the keyboard increment, `step` the panel's resolution.
    Range {
        min: f32,
        max: f32,
        step: f32,
        nudge: f32,
    },
    Color,
    Toggle,
}

impl ControlKind {
    fn name(&self) -> &'static str {
        match self {
            ControlKind::Range { .. } => "number",
            ControlKind::Color => "colour",
            ControlKind::Toggle => "boolean",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Control {
    pub folder: &'static str,
    pub label: &'static str,
    pub binding: Binding,
    pub kind: ControlKind,
}

const fn camera_axis(label: &'static str, binding: Binding) -> Control {
    Control {
        folder: "Camera Controls",
        label,
        binding,
        kind: ControlKind::Range {
            min: -CAMERA_RANGE,
            max: CAMERA_RANGE,
            step: FINE_STEP,
            nudge: 0.1,
        },
    }
}

pub const PANEL: [Control; 8] = [
    Control {
        folder: "Portal",
        label: "Inner Colour",
        binding: Binding::PortalColorStart,
        kind: ControlKind::Color,
    },
    Control {
        folder: "Portal",
        label: "Outer Colour",
        binding: Binding::PortalColorEnd,
        kind: ControlKind::Color,
    },
    Control {
        folder: "Fireflies",
        label: "Flies Size",
        binding: Binding::FireflySize,
        kind: ControlKind::Range {
            min: FIREFLY_SIZE_RANGE.0,
            max: FIREFLY_SIZE_RANGE.1,
            step: FINE_STEP,
            nudge: 10.0,
        },
    },
    Control {
        folder: "Control Center",
        label: "Enable Orbit Control",
        binding: Binding::OrbitEnabled,
        kind: ControlKind::Toggle,
    },
    camera_axis("Position X", Binding::CameraX),
    camera_axis("Position Y", Binding::CameraY),
    camera_axis("Position Z", Binding::CameraZ),
    Control {
        folder: "",
        label: "Background Colour",
        binding: Binding::ClearColor,
        kind: ControlKind::Color,
    },
];

/// A value flowing into or out of a control.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlValue {
    Number(f32),
    Color(HexColor),
    Bool(bool),
}

impl ControlValue {
    /// Parses panel input: `true`/`false`, a `#rrggbb`/`0xrrggbb` colour, or
    /// a number.
    pub fn parse(s: &str) -> Result<Self, ControlError> {
        let t = s.trim();
        match t {
            "true" => return Ok(ControlValue::Bool(true)),
            "false" => return Ok(ControlValue::Bool(false)),
            _ => {}
        }
        if t.starts_with('#') || t.starts_with("0x") || t.starts_with("0X") {
            return HexColor::parse(t)
                .map(ControlValue::Color)
                .ok_or_else(|| ControlError::BadValue(s.to_string()));
        }
        t.parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(ControlValue::Number)
            .ok_or_else(|| ControlError::BadValue(s.to_string()))
    }

    pub fn as_string(&self) -> String {
        match self {
            ControlValue::Number(v) => format!("{v}"),
            ControlValue::Color(c) => c.to_css(),
            ControlValue::Bool(b) => b.to_string(),
        }
    }
}

/// Everything the panel can write to.
pub struct ControlTarget<'a> {
    pub params: &'a mut DebugParams,
    pub camera: &'a mut Camera,
    pub orbit: &'a mut OrbitControls,
}

pub fn find(label: &str) -> Result<&'static Control, ControlError> {
    PANEL
        .iter()
        .find(|c| c.label == label)
        .ok_or_else(|| ControlError::Unknown(label.to_string()))
}

/// Looks up `label` and applies `value` to it.
pub fn apply(
    label: &str,
    value: ControlValue,
    target: &mut ControlTarget<'_>,
) -> Result<ControlValue, ControlError> {
    find(label)?.apply(value, target)
}

fn snap(v: f32, min: f32, max: f32, step: f32) -> f32 {
    let v = v.clamp(min, max);
    if step <= 0.0 {
        return v;
    }
    let (v, min, step) = (v as f64, min as f64, step as f64);
    // Decimal steps (0.001) divide by their rounded inverse so results land
    // on exact decimals instead of drifting by the f32 error in `step`.
    let inv = (1.0 / step).round();
    let snapped = if inv >= 1.0 && (inv * step - 1.0).abs() < 1e-6 {
        min + ((v - min) * inv).round() / inv
    } else {
        min + ((v - min) / step).round() * step
    };
    (snapped as f32).clamp(min as f32, max)
}

impl Control {
    fn mismatch(&self) -> ControlError {
        ControlError::KindMismatch {
            label: self.label,
            expected: self.kind.name(),
        }
    }

    /// Current value of the bound field.
    pub fn read(&self, target: &ControlTarget<'_>) -> ControlValue {
        match self.binding {
            Binding::FireflySize => ControlValue::Number(target.params.firefly_size),
            Binding::PortalColorStart => ControlValue::Color(target.params.portal_color_start),
            Binding::PortalColorEnd => ControlValue::Color(target.params.portal_color_end),
            Binding::ClearColor => ControlValue::Color(target.params.clear_color),
            Binding::OrbitEnabled => ControlValue::Bool(target.orbit.enabled),
            Binding::CameraX => ControlValue::Number(target.camera.eye.x),
            Binding::CameraY => ControlValue::Number(target.camera.eye.y),
            Binding::CameraZ => ControlValue::Number(target.camera.eye.z),
        }
    }

    /// Writes `value` after clamping and step-snapping it to the control's
    /// range. Returns the value actually stored.
    pub fn apply(
        &self,
        value: ControlValue,
        target: &mut ControlTarget<'_>,
    ) -> Result<ControlValue, ControlError> {
        let stored = match (self.kind, value) {
            (ControlKind::Range { min, max, step, .. }, ControlValue::Number(v)) => {
                ControlValue::Number(snap(v, min, max, step))
            }
            (ControlKind::Color, ControlValue::Color(c)) => ControlValue::Color(c),
            (ControlKind::Toggle, ControlValue::Bool(b)) => ControlValue::Bool(b),
            _ => return Err(self.mismatch()),
        };
        self.write(stored, target);
        log::info!("[panel] {} = {}", self.label, stored.as_string());
        Ok(stored)
    }

    /// Keyboard adjustment: ranges move by `steps` nudge increments, toggles
    /// flip on odd counts. Colours cannot be nudged.
    pub fn nudge(
        &self,
        steps: i32,
        target: &mut ControlTarget<'_>,
    ) -> Result<ControlValue, ControlError> {
        match (self.kind, self.read(target)) {
            (ControlKind::Range { nudge, .. }, ControlValue::Number(v)) => {
                self.apply(ControlValue::Number(v + nudge * steps as f32), target)
            }
            (ControlKind::Toggle, ControlValue::Bool(b)) => {
                self.apply(ControlValue::Bool(b ^ (steps % 2 != 0)), target)
            }
            _ => Err(self.mismatch()),
        }
    }

    fn write(&self, value: ControlValue, target: &mut ControlTarget<'_>) {
        match (self.binding, value) {
            (Binding::FireflySize, ControlValue::Number(v)) => target.params.firefly_size = v,
            (Binding::PortalColorStart, ControlValue::Color(c)) => {
                target.params.portal_color_start = c
            }
            (Binding::PortalColorEnd, ControlValue::Color(c)) => target.params.portal_color_end = c,
            (Binding::ClearColor, ControlValue::Color(c)) => target.params.clear_color = c,
            (Binding::OrbitEnabled, ControlValue::Bool(b)) => target.orbit.enabled = b,
            (Binding::CameraX, ControlValue::Number(v)) => target.camera.eye.x = v,
            (Binding::CameraY, ControlValue::Number(v)) => target.camera.eye.y = v,
            (Binding::CameraZ, ControlValue::Number(v)) => target.camera.eye.z = v,
            _ => {}
        }
    }
}

/// Keyboard shortcuts shared by both frontends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Nudge { label: &'static str, steps: i32 },
    Fullscreen,
}

/// Maps a key name (DOM `KeyboardEvent.key` spelling) to a shortcut.
pub fn key_action(key: &str) -> Option<KeyAction> {
    let nudge = |label: &'static str, steps: i32| Some(KeyAction::Nudge { label, steps });
    match key {
        "o" | "O" => nudge("Enable Orbit Control", 1),
        "+" | "=" => nudge("Flies Size", 1),
        "-" | "_" => nudge("Flies Size", -1),
        "ArrowLeft" => nudge("Position X", -1),
        "ArrowRight" => nudge("Position X", 1),
        "ArrowUp" => nudge("Position Z", -1),
        "ArrowDown" => nudge("Position Z", 1),
        "PageUp" => nudge("Position Y", 1),
        "PageDown" => nudge("Position Y", -1),
        "f" | "F" => Some(KeyAction::Fullscreen),
        _ => None,
    }
}
