#![forbid(unsafe_code)]

//! Staged attribute transitions.
//!
//! A [`Transition`] is an ordered chain of [`Stage`]s. Each stage waits for
//! its delay (measured from the end of the previous stage), then moves its
//! target attributes from whatever values they hold at that moment to the
//! targets over its duration. A zero-duration stage is a snap.
//!
//! # Invariants
//!
//! 1. Start values are captured when a stage begins, not when it is
//!    scheduled, so chained stages compose.
//! 2. When a stage completes, its targets hold exactly (no interpolation
//!    residue).
//! 3. Scheduling a transition on an element replaces its pending chain; the
//!    new chain starts from the element's current values.

use std::time::Duration;

use smallvec::SmallVec;

use scrollviz_core::animation::{Animation, EasingFn, Phase, StageClock, ease_in_out_cubic, lerp};

use crate::element::Attr;

/// Target list of a stage. Most stages touch four attributes or fewer.
pub type Targets = SmallVec<[(Attr, f64); 4]>;

/// One timed step of a [`Transition`].
#[derive(Debug, Clone)]
pub struct Stage {
    pub(crate) delay: Duration,
    pub(crate) duration: Duration,
    pub(crate) easing: EasingFn,
    pub(crate) targets: Targets,
}

impl Stage {
    /// A stage animating over `duration` with cubic in-out easing.
    #[must_use]
    pub fn over(duration: Duration) -> Self {
        Self {
            delay: Duration::ZERO,
            duration,
            easing: ease_in_out_cubic,
            targets: Targets::new(),
        }
    }

    /// A zero-duration stage.
    #[must_use]
    pub fn snap() -> Self {
        Self::over(Duration::ZERO)
    }

    /// Wait before starting (builder).
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the easing curve (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Add an attribute target (builder). A repeated attribute overwrites.
    #[must_use]
    pub fn set(mut self, attr: Attr, value: f64) -> Self {
        if let Some(slot) = self.targets.iter_mut().find(|(a, _)| *a == attr) {
            slot.1 = value;
        } else {
            self.targets.push((attr, value));
        }
        self
    }

    /// Target for `attr`, if this stage sets it.
    pub fn target(&self, attr: Attr) -> Option<f64> {
        self.targets.iter().find(|(a, _)| *a == attr).map(|(_, v)| *v)
    }

    /// Delay plus duration.
    pub fn span(&self) -> Duration {
        self.delay.saturating_add(self.duration)
    }
}

/// An ordered chain of stages applied to one element.
#[derive(Debug, Clone, Default)]
pub struct Transition {
    pub(crate) stages: SmallVec<[Stage; 3]>,
}

impl Transition {
    /// An empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-stage chain.
    #[must_use]
    pub fn single(stage: Stage) -> Self {
        Self::new().then(stage)
    }

    /// Append a stage (builder).
    #[must_use]
    pub fn then(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Total time from scheduling to completion.
    pub fn total(&self) -> Duration {
        self.stages
            .iter()
            .fold(Duration::ZERO, |acc, s| acc.saturating_add(s.span()))
    }

    /// Value `attr` holds once the chain completes, if any stage sets it.
    pub fn final_value(&self, attr: Attr) -> Option<f64> {
        self.stages.iter().rev().find_map(|s| s.target(attr))
    }
}

/// A stage being played against an element's attribute table.
#[derive(Debug, Clone)]
pub(crate) struct RunningStage {
    stage: Stage,
    clock: StageClock,
    from: Option<SmallVec<[f64; 4]>>,
}

impl RunningStage {
    pub(crate) fn new(stage: Stage) -> Self {
        let clock = StageClock::new(stage.delay, stage.duration).easing(stage.easing);
        Self {
            stage,
            clock,
            from: None,
        }
    }

    pub(crate) fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Advance by `dt`, writing interpolated values into `attrs`.
    ///
    /// Returns the leftover time when the stage completed, or `None` while it
    /// is still waiting or running.
    pub(crate) fn advance(&mut self, attrs: &mut [f64; Attr::COUNT], dt: Duration) -> Option<Duration> {
        self.clock.tick(dt);
        if self.clock.phase() == Phase::Waiting {
            return None;
        }
        let from = self.from.get_or_insert_with(|| {
            self.stage
                .targets
                .iter()
                .map(|(attr, _)| attrs[attr.index()])
                .collect()
        });
        if self.clock.is_complete() {
            self.apply_final(attrs);
            return Some(self.clock.overshoot());
        }
        let t = self.clock.value();
        for ((attr, to), start) in self.stage.targets.iter().zip(from.iter()) {
            attrs[attr.index()] = lerp(*start, *to, t);
        }
        None
    }

    /// Write the stage's targets exactly.
    pub(crate) fn apply_final(&self, attrs: &mut [f64; Attr::COUNT]) {
        for (attr, to) in &self.stage.targets {
            attrs[attr.index()] = *to;
        }
    }
}
