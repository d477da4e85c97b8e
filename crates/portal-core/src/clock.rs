//! Elapsed-time source for the frame driver.

use instant::Instant;
use std::cell::Cell;
use std::rc::Rc;

/// Anything that can report seconds since some fixed origin.
pub trait TimeSource {
    fn now_secs(&self) -> f64;
}

/// Wall clock backed by `instant::Instant` (performance.now() on the web).
#[derive(Clone, Copy, Debug)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven time, shared between clones. Used for headless snapshots and
/// tests.
#[derive(Clone, Debug, Default)]
pub struct ManualTime(Rc<Cell<f64>>);

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, secs: f64) {
        self.0.set(secs);
    }

    pub fn advance(&self, dt: f64) {
        self.0.set(self.0.get() + dt);
    }
}

impl TimeSource for ManualTime {
    fn now_secs(&self) -> f64 {
        self.0.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ClockState {
    Stopped,
    Running { started_at: f64 },
}

/// Monotonic elapsed-seconds clock.
///
/// Starts on the first read if `start` was never called. Reads never go
/// backwards, even if the underlying source does.
#[derive(Debug)]
pub struct Clock<S: TimeSource = MonotonicTime> {
    source: S,
    state: ClockState,
    last: f32,
}

impl Clock<MonotonicTime> {
    pub fn new() -> Self {
        Self::with_source(MonotonicTime::new())
    }
}

impl Default for Clock<MonotonicTime> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TimeSource> Clock<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            state: ClockState::Stopped,
            last: 0.0,
        }
    }

    pub fn start(&mut self) {
        if let ClockState::Stopped = self.state {
            self.state = ClockState::Running {
                started_at: self.source.now_secs(),
            };
            self.last = 0.0;
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Running { .. })
    }

    /// Reads the clock, in seconds since `start`.
    pub fn elapsed_time(&mut self) -> f32 {
        self.start();
        let ClockState::Running { started_at } = self.state else {
            return self.last;
        };
        let elapsed = (self.source.now_secs() - started_at) as f32;
        self.last = elapsed.max(self.last);
        self.last
    }

    /// Most recent value returned by `elapsed_time`.
    pub fn last_elapsed(&self) -> f32 {
        self.last
    }
}
