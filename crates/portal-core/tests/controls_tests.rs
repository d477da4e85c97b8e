// Integration tests for the debug panel bindings.

use portal_core::controls::{self, ControlKind, ControlTarget, ControlValue, PANEL};
use portal_core::{Camera, ControlError, DebugParams, HexColor, OrbitControls};

struct World {
    params: DebugParams,
    camera: Camera,
    orbit: OrbitControls,
}

impl World {
    fn new() -> Self {
        Self {
            params: DebugParams::default(),
            camera: Camera::default(),
            orbit: OrbitControls::default(),
        }
    }

    fn target(&mut self) -> ControlTarget<'_> {
        ControlTarget {
            params: &mut self.params,
            camera: &mut self.camera,
            orbit: &mut self.orbit,
        }
    }
}

fn number(v: ControlValue) -> f32 {
    match v {
        ControlValue::Number(n) => n,
        other => panic!("expected a number, got {other:?}"),
    }
}

#[test]
fn labels_are_unique() {
    for (i, a) in PANEL.iter().enumerate() {
        for b in &PANEL[i + 1..] {
            assert_ne!(a.label, b.label);
        }
    }
}

#[test]
fn size_is_clamped_to_panel_range() {
    let mut w = World::new();
    let stored = controls::apply("Flies Size", ControlValue::Number(600.0), &mut w.target());
    assert_eq!(stored, Ok(ControlValue::Number(500.0)));
    assert_eq!(w.params.firefly_size, 500.0);
    controls::apply("Flies Size", ControlValue::Number(-3.0), &mut w.target()).unwrap();
    assert_eq!(w.params.firefly_size, 0.0);
}

#[test]
fn values_snap_to_step() {
    let mut w = World::new();
    let v = number(
        controls::apply("Flies Size", ControlValue::Number(123.456_78), &mut w.target()).unwrap(),
    );
    assert!((v - 123.457).abs() < 1e-3);
}

#[test]
fn camera_axes_write_the_eye() {
    let mut w = World::new();
    controls::apply("Position X", ControlValue::Number(50.0), &mut w.target()).unwrap();
    controls::apply("Position Y", ControlValue::Number(-1.5), &mut w.target()).unwrap();
    assert_eq!(w.camera.eye.x, 34.0);
    assert!((w.camera.eye.y + 1.5).abs() < 1e-4);
    let read = controls::find("Position Y").unwrap().read(&w.target());
    assert!((number(read) + 1.5).abs() < 1e-4);
}

#[test]
fn colours_and_toggles() {
    let mut w = World::new();
    controls::apply(
        "Background Colour",
        ControlValue::Color(HexColor(0x333333)),
        &mut w.target(),
    )
    .unwrap();
    assert_eq!(w.params.clear_color, HexColor(0x333333));
    controls::apply("Enable Orbit Control", ControlValue::Bool(false), &mut w.target()).unwrap();
    assert!(!w.orbit.enabled);
}

#[test]
fn unknown_label_and_wrong_kind_are_errors() {
    let mut w = World::new();
    assert_eq!(
        controls::apply("Nope", ControlValue::Bool(true), &mut w.target()),
        Err(ControlError::Unknown("Nope".into()))
    );
    assert!(matches!(
        controls::apply("Inner Colour", ControlValue::Number(1.0), &mut w.target()),
        Err(ControlError::KindMismatch { label: "Inner Colour", .. })
    ));
    assert_eq!(w.params.portal_color_start, HexColor(0xffe8aa));
}

#[test]
fn nudge_moves_by_increments() {
    let mut w = World::new();
    let size = controls::find("Flies Size").unwrap();
    assert_eq!(size.nudge(2, &mut w.target()), Ok(ControlValue::Number(120.0)));
    assert_eq!(size.nudge(-100, &mut w.target()), Ok(ControlValue::Number(0.0)));

    let orbit = controls::find("Enable Orbit Control").unwrap();
    orbit.nudge(1, &mut w.target()).unwrap();
    assert!(!w.orbit.enabled);
    orbit.nudge(2, &mut w.target()).unwrap();
    assert!(!w.orbit.enabled);

    let colour = controls::find("Outer Colour").unwrap();
    assert!(colour.nudge(1, &mut w.target()).is_err());
}

#[test]
fn string_values_parse() {
    assert_eq!(ControlValue::parse("true"), Ok(ControlValue::Bool(true)));
    assert_eq!(
        ControlValue::parse("#00ff00"),
        Ok(ControlValue::Color(HexColor(0x00ff00)))
    );
    assert_eq!(ControlValue::parse(" 12.5 "), Ok(ControlValue::Number(12.5)));
    assert!(ControlValue::parse("abc").is_err());
    assert!(ControlValue::parse("#xyz").is_err());
    assert!(ControlValue::parse("NaN").is_err());
}

#[test]
fn camera_controls_share_the_same_range() {
    for label in ["Position X", "Position Y", "Position Z"] {
        let c = controls::find(label).unwrap();
        assert_eq!(c.folder, "Camera Controls");
        assert!(matches!(
            c.kind,
            ControlKind::Range { min, max, .. } if min == -34.0 && max == 34.0
        ));
    }
}

#[test]
fn shortcuts_nudge_adjustable_controls() {
    use controls::{key_action, KeyAction};
    for key in ["o", "+", "-", "ArrowLeft", "ArrowUp", "PageDown"] {
        let Some(KeyAction::Nudge { label, .. }) = key_action(key) else {
            panic!("{key} should nudge");
        };
        let control = controls::find(label).expect("shortcut label exists");
        assert_ne!(control.kind, ControlKind::Color);
    }
    assert_eq!(key_action("F"), Some(KeyAction::Fullscreen));
    assert_eq!(key_action("x"), None);
}
