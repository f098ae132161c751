#![forbid(unsafe_code)]

//! Host-clocked timing for staged transitions.
//!
//! A [`StageClock`] times one stage of a transition: it idles through a
//! delay, then reports eased progress from 0.0 to 1.0 over a duration.
//! Clocks only move when the host calls [`Animation::tick`], never from a
//! wall clock, so a scene driven by them replays identically under test.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Easing
// ---------------------------------------------------------------------------

/// Maps linear progress in [0, 1] to eased progress in [0, 1].
pub type EasingFn = fn(f32) -> f32;

#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Cubic ease-in-out, the default curve for scene transitions.
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t.powi(3)
    } else {
        let u = 2.0 - 2.0 * t;
        1.0 - u.powi(3) / 2.0
    }
}

/// Value between `from` and `to` at eased progress `t`.
#[inline]
pub fn lerp(from: f64, to: f64, t: f32) -> f64 {
    from + (to - from) * f64::from(t)
}

// ---------------------------------------------------------------------------
// Animation
// ---------------------------------------------------------------------------

/// Where a timed animation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not ticked yet, or still inside the delay.
    Waiting,
    Running,
    Done,
}

/// Something that progresses on host ticks.
pub trait Animation {
    fn tick(&mut self, dt: Duration);

    fn phase(&self) -> Phase;

    /// Eased progress in [0.0, 1.0]; 0.0 while waiting.
    fn value(&self) -> f32;

    /// Time ticked past the end. A chain of stages hands this to the next
    /// stage so one large tick can cross several of them.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }

    #[inline]
    fn is_complete(&self) -> bool {
        self.phase() == Phase::Done
    }
}

// ---------------------------------------------------------------------------
// StageClock
// ---------------------------------------------------------------------------

/// Delay followed by an eased run.
///
/// A clock always waits for its first tick, even with no delay: a snap
/// (zero duration) scheduled now lands on the next tick, including a
/// zero-length one.
#[derive(Debug, Clone, Copy)]
pub struct StageClock {
    delay: Duration,
    duration: Duration,
    elapsed: Duration,
    ticked: bool,
    easing: EasingFn,
}

impl StageClock {
    pub fn new(delay: Duration, duration: Duration) -> Self {
        Self {
            delay,
            duration,
            elapsed: Duration::ZERO,
            ticked: false,
            easing: linear,
        }
    }

    /// Set the easing curve (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time since the end of the delay, if it has passed.
    fn running_for(&self) -> Option<Duration> {
        if !self.ticked {
            return None;
        }
        self.elapsed.checked_sub(self.delay)
    }

    /// Linear progress before easing.
    pub fn linear_progress(&self) -> f32 {
        match self.running_for() {
            None => 0.0,
            Some(_) if self.duration.is_zero() => 1.0,
            Some(run) => ((run.as_secs_f64() / self.duration.as_secs_f64()) as f32).min(1.0),
        }
    }
}

impl Animation for StageClock {
    fn tick(&mut self, dt: Duration) {
        self.ticked = true;
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn phase(&self) -> Phase {
        match self.running_for() {
            None => Phase::Waiting,
            Some(run) if run >= self.duration => Phase::Done,
            Some(_) => Phase::Running,
        }
    }

    fn value(&self) -> f32 {
        match self.phase() {
            Phase::Waiting => 0.0,
            Phase::Running => (self.easing)(self.linear_progress()),
            Phase::Done => 1.0,
        }
    }

    fn overshoot(&self) -> Duration {
        match self.running_for() {
            Some(run) => run.saturating_sub(self.duration),
            None => Duration::ZERO,
        }
    }
}
