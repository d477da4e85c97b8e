// Integration tests for easing, tweens and the intro timeline.

use std::f32::consts::TAU;

use portal_core::tween::{Ease, Intro, Tween};
use portal_core::{DebugParams, SceneTransform};

#[test]
fn eases_hit_their_endpoints() {
    for ease in [Ease::Linear, Ease::SMOOTH] {
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
        assert_eq!(ease.apply(-2.0), 0.0);
        assert_eq!(ease.apply(3.0), 1.0);
    }
}

#[test]
fn smooth_ease_is_monotonic_and_front_loaded() {
    let mut prev = 0.0;
    for i in 1..=100 {
        let v = Ease::SMOOTH.apply(i as f32 / 100.0);
        assert!(v >= prev - 1e-5, "dip at {i}: {v} < {prev}");
        prev = v;
    }
    assert!(Ease::SMOOTH.apply(0.5) > 0.8);
    assert!(Ease::SMOOTH.apply(0.25) > 0.45);
}

#[test]
fn symmetric_bezier_matches_linear_midpoint() {
    let ease = Ease::CubicBezier {
        x1: 0.25,
        y1: 0.25,
        x2: 0.75,
        y2: 0.75,
    };
    for p in [0.1, 0.3, 0.5, 0.9] {
        assert!((ease.apply(p) - p).abs() < 1e-4);
    }
}

#[test]
fn tween_holds_through_delay_and_after_end() {
    let t = Tween::new(2.0, 4.0, 1.0).with_delay(0.5);
    assert_eq!(t.sample(0.0), 2.0);
    assert_eq!(t.sample(0.5), 2.0);
    assert!((t.sample(1.0) - 3.0).abs() < 1e-6);
    assert_eq!(t.sample(1.5), 4.0);
    assert_eq!(t.sample(9.0), 4.0);
    assert!(!t.is_finished(1.2));
    assert!(t.is_finished(1.5));
}

#[test]
fn zero_duration_jumps_to_end() {
    let t = Tween::new(0.0, 1.0, 0.0);
    assert_eq!(t.sample(0.0), 0.0);
    assert_eq!(t.sample(0.001), 1.0);
}

#[test]
fn intro_timeline() {
    let params = DebugParams::default();
    let mut intro = Intro::new(&params);

    // Nothing happens before the load delay
    assert_eq!(intro.firefly_size_factor(5.0), 1.0);
    assert_eq!(intro.scene_transform(5.0), SceneTransform::IDENTITY);

    intro.scene_loaded(2.0);
    intro.scene_loaded(4.0);

    // Tweens are created: fireflies snap to zero, scene waits for its anchor
    assert_eq!(intro.firefly_size_factor(13.0), 0.0);
    assert_eq!(intro.scene_transform(14.9), SceneTransform::IDENTITY);
    let start = intro.scene_transform(15.0);
    assert_eq!(start.scale, 0.0);
    assert!((start.rotation_y - TAU).abs() < 1e-6);

    let mid = intro.scene_transform(16.0);
    assert!(mid.scale > 0.0 && mid.scale < 1.0);
    assert!(mid.rotation_y > 0.0 && mid.rotation_y < TAU);

    assert!(!intro.is_finished(16.0));
    assert_eq!(intro.scene_transform(17.3), SceneTransform::IDENTITY);
    assert_eq!(intro.firefly_size_factor(16.3), 1.0);
    assert!(intro.is_finished(17.3));
}
