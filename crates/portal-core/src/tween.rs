//! Easing curves, tweens and the intro timeline.

use std::f32::consts::TAU;

use crate::params::DebugParams;
use crate::scene::SceneTransform;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ease {
    Linear,
    /// CSS-style cubic bezier through (0,0), (x1,y1), (x2,y2), (1,1).
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl Ease {
    /// Fast start, long soft landing.
    pub const SMOOTH: Ease = Ease::CubicBezier {
        x1: 0.33,
        y1: 0.0,
        x2: 0.0,
        y2: 1.0,
    };

    /// Maps linear progress in `[0, 1]` to eased progress. Input is clamped.
    pub fn apply(self, progress: f32) -> f32 {
        let p = progress.clamp(0.0, 1.0);
        match self {
            Ease::Linear => p,
            Ease::CubicBezier { x1, y1, x2, y2 } => {
                if p == 0.0 || p == 1.0 {
                    return p;
                }
                bezier(y1, y2, solve_t(x1, x2, p))
            }
        }
    }
}

// One coordinate of the curve at parameter t, with P0 = 0 and P3 = 1.
#[inline]
fn bezier(a1: f32, a2: f32, t: f32) -> f32 {
    ((1.0 - 3.0 * a2 + 3.0 * a1) * t + (3.0 * a2 - 6.0 * a1)) * t * t + 3.0 * a1 * t
}

#[inline]
fn bezier_slope(a1: f32, a2: f32, t: f32) -> f32 {
    3.0 * (1.0 - 3.0 * a2 + 3.0 * a1) * t * t + 2.0 * (3.0 * a2 - 6.0 * a1) * t + 3.0 * a1
}

/// Finds t with x(t) = x. Newton first, bisection if the slope flattens out.
fn solve_t(x1: f32, x2: f32, x: f32) -> f32 {
    const EPS: f32 = 1e-6;
    let mut t = x;
    for _ in 0..8 {
        let err = bezier(x1, x2, t) - x;
        if err.abs() < EPS {
            return t;
        }
        let slope = bezier_slope(x1, x2, t);
        if slope.abs() < EPS {
            break;
        }
        t -= err / slope;
    }
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    t = x;
    for _ in 0..32 {
        let v = bezier(x1, x2, t);
        if (v - x).abs() < EPS {
            break;
        }
        if v < x {
            lo = t;
        } else {
            hi = t;
        }
        t = 0.5 * (lo + hi);
    }
    t
}

/// A single eased scalar animation, timed relative to its own creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub delay: f32,
    pub duration: f32,
    pub ease: Ease,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            delay: 0.0,
            duration,
            ease: Ease::Linear,
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Value `elapsed` seconds after creation. Holds `from` through the delay.
    pub fn sample(&self, elapsed: f32) -> f32 {
        let local = elapsed - self.delay;
        if local <= 0.0 {
            return self.from;
        }
        if self.duration <= 0.0 || local >= self.duration {
            return self.to;
        }
        let k = self.ease.apply(local / self.duration);
        self.from + (self.to - self.from) * k
    }

    pub fn is_finished(&self, elapsed: f32) -> bool {
        elapsed >= self.delay + self.duration
    }
}

/// Intro choreography.
///
/// Both animations are "from" tweens created `load_delay` after their
/// anchor: the property sits at its resting value until then, snaps to the
/// start value when the tween is created and eases back. Fireflies are
/// anchored at startup, the scene pop-in at the moment the model is spliced
/// into the scene.
#[derive(Clone, Debug)]
pub struct Intro {
    load_delay: f32,
    firefly_size: Tween,
    scene_scale: Tween,
    scene_rotation: Tween,
    scene_loaded_at: Option<f32>,
}

impl Intro {
    pub fn new(params: &DebugParams) -> Self {
        let d = params.intro_duration;
        Self {
            load_delay: params.load_delay_secs(),
            firefly_size: Tween::new(0.0, 1.0, d)
                .with_delay(params.firefly_intro_delay)
                .with_ease(Ease::SMOOTH),
            scene_scale: Tween::new(0.0, 1.0, d).with_ease(Ease::SMOOTH),
            scene_rotation: Tween::new(TAU, 0.0, d).with_ease(Ease::SMOOTH),
            scene_loaded_at: None,
        }
    }

    /// Anchors the scene pop-in. Only the first call counts.
    pub fn scene_loaded(&mut self, now: f32) {
        if self.scene_loaded_at.is_none() {
            self.scene_loaded_at = Some(now);
        }
    }

    /// Multiplier for the panel's firefly size.
    pub fn firefly_size_factor(&self, now: f32) -> f32 {
        if now < self.load_delay {
            1.0
        } else {
            self.firefly_size.sample(now - self.load_delay)
        }
    }

    pub fn scene_transform(&self, now: f32) -> SceneTransform {
        let Some(anchor) = self.scene_loaded_at else {
            return SceneTransform::IDENTITY;
        };
        let created = anchor + self.load_delay;
        if now < created {
            return SceneTransform::IDENTITY;
        }
        SceneTransform {
            scale: self.scene_scale.sample(now - created),
            rotation_y: self.scene_rotation.sample(now - created),
        }
    }

    pub fn is_finished(&self, now: f32) -> bool {
        let fireflies_done = self.firefly_size.is_finished(now - self.load_delay);
        let scene_done = self
            .scene_loaded_at
            .map(|a| self.scene_scale.is_finished(now - a - self.load_delay))
            .unwrap_or(false);
        fireflies_done && scene_done
    }
}
