#![forbid(unsafe_code)]

//! The narrative's steps and the registry that dispatches them.
//!
//! Each step describes the whole chart: which axes are out, where markers
//! sit and how they are coloured, which guides are drawn. Applying a step
//! sets every one of those from scratch, so the chart a reader sees after
//! scrolling to step `k` does not depend on the path taken to get there.

use std::fmt;
use std::time::Duration;

use scrollviz_core::geometry::{Point, Size};
use scrollviz_scene::{Attr, Handle, Scene, Stage, Transition};

use crate::config::NarrativeConfig;
use crate::controller::{Controller, Guide, Visibility};
use crate::data::Arm;
use crate::guides::GuidePlan;
use crate::scale::Scales;
use crate::session::{Marker, Session};
use crate::stats::NarrativeStats;

/// Number of steps in the narrative.
pub const STEP_COUNT: usize = 9;

/// Where markers sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Every marker packed around one column, at its own outcome.
    Pooled,
    /// Each arm packed around its own column, at its own outcome.
    Split,
    /// Each arm collapsed onto its column at the arm's outcome mean.
    ArmAnchor,
    /// Each arm collapsed onto (arm itch mean, arm outcome mean).
    ArmMean,
    /// Each marker at its own (itch, outcome).
    Individual,
}

/// Complete target state of the chart for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub y_axis: bool,
    pub x_axis: bool,
    /// Colour markers by arm.
    pub by_arm: bool,
    pub placement: Placement,
    /// Markers drawn at the faded opacity.
    pub faded: bool,
    /// Mean lines drawn at the softened opacity.
    pub softened: bool,
    /// Guides shown, each with its draw delay in transition durations.
    /// Every other guide is erased.
    pub guides: &'static [(Guide, u32)],
    /// Annotation shown after this many transition durations, or hidden.
    pub annotation: Option<u32>,
}

const BASE: Appearance = Appearance {
    y_axis: false,
    x_axis: false,
    by_arm: false,
    placement: Placement::Pooled,
    faded: false,
    softened: false,
    guides: &[],
    annotation: None,
};

/// Target appearance of every step, in order.
pub const NARRATIVE: [Appearance; STEP_COUNT] = [
    BASE,
    Appearance {
        y_axis: true,
        ..BASE
    },
    Appearance {
        y_axis: true,
        by_arm: true,
        placement: Placement::Split,
        ..BASE
    },
    Appearance {
        y_axis: true,
        by_arm: true,
        placement: Placement::ArmAnchor,
        guides: &[
            (Guide::PboOutcomeMean, 1),
            (Guide::RxOutcomeMean, 1),
            (Guide::OutcomeDifference, 2),
        ],
        ..BASE
    },
    Appearance {
        y_axis: true,
        x_axis: true,
        by_arm: true,
        placement: Placement::ArmMean,
        guides: &[(Guide::PboOutcomeMean, 0), (Guide::RxOutcomeMean, 0)],
        ..BASE
    },
    Appearance {
        y_axis: true,
        x_axis: true,
        by_arm: true,
        placement: Placement::ArmMean,
        guides: &[
            (Guide::PboOutcomeMean, 0),
            (Guide::RxOutcomeMean, 0),
            (Guide::PboItchMean, 0),
            (Guide::RxItchMean, 0),
            (Guide::ItchDifference, 1),
        ],
        ..BASE
    },
    Appearance {
        y_axis: true,
        x_axis: true,
        by_arm: true,
        placement: Placement::Individual,
        softened: true,
        guides: &[
            (Guide::PboOutcomeMean, 0),
            (Guide::RxOutcomeMean, 0),
            (Guide::PboItchMean, 0),
            (Guide::RxItchMean, 0),
        ],
        ..BASE
    },
    Appearance {
        y_axis: true,
        x_axis: true,
        by_arm: true,
        placement: Placement::Individual,
        faded: true,
        softened: true,
        guides: &[
            (Guide::PboOutcomeMean, 0),
            (Guide::RxOutcomeMean, 0),
            (Guide::PboItchMean, 0),
            (Guide::RxItchMean, 0),
            (Guide::PboRegression, 1),
            (Guide::RxRegression, 1),
        ],
        ..BASE
    },
    Appearance {
        y_axis: true,
        x_axis: true,
        by_arm: true,
        placement: Placement::Individual,
        faded: true,
        softened: true,
        guides: &[
            (Guide::PboOutcomeMean, 0),
            (Guide::RxOutcomeMean, 0),
            (Guide::OutcomeDifference, 1),
            (Guide::PboItchMean, 0),
            (Guide::RxItchMean, 0),
            (Guide::PboRegression, 0),
            (Guide::RxRegression, 0),
            (Guide::Mediator, 1),
        ],
        annotation: Some(2),
    },
];

/// A step handler.
pub type StepHandler<S> = fn(&mut Session<S>);

/// Ordered table of step handlers, indexed by step number.
pub struct StepRegistry<S: Scene> {
    handlers: Vec<StepHandler<S>>,
}

impl<S: Scene> StepRegistry<S> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// The mediation narrative, one handler per entry of [`NARRATIVE`].
    pub fn narrative() -> Self {
        Self::new()
            .with(narrative_step::<S, 0>)
            .with(narrative_step::<S, 1>)
            .with(narrative_step::<S, 2>)
            .with(narrative_step::<S, 3>)
            .with(narrative_step::<S, 4>)
            .with(narrative_step::<S, 5>)
            .with(narrative_step::<S, 6>)
            .with(narrative_step::<S, 7>)
            .with(narrative_step::<S, 8>)
    }

    /// Append a handler as the next step (builder).
    #[must_use]
    pub fn with(mut self, handler: StepHandler<S>) -> Self {
        self.register(handler);
        self
    }

    /// Append a handler as the next step. Returns its index.
    pub fn register(&mut self, handler: StepHandler<S>) -> usize {
        self.handlers.push(handler);
        self.handlers.len() - 1
    }

    /// Handler for step `index`.
    pub fn get(&self, index: usize) -> Option<StepHandler<S>> {
        self.handlers.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<S: Scene> fmt::Debug for StepRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
            .field("steps", &self.handlers.len())
            .finish()
    }
}

fn narrative_step<S: Scene, const STEP: usize>(session: &mut Session<S>) {
    session.apply(&NARRATIVE[STEP]);
}

/// Translation of an axis and its label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AxisFrame {
    pub axis: Point,
    pub label: Point,
}

/// Bottom axis frame; hidden axes drop `axis_offset` below the plot.
pub(crate) fn x_axis_frame(config: &NarrativeConfig, canvas: Size, plot: Size, shown: bool) -> AxisFrame {
    let m = config.margin;
    let offset = if shown { 0.0 } else { config.axis_offset };
    AxisFrame {
        axis: Point::new(m.left, m.top + plot.height + offset),
        label: Point::new(m.left + plot.width / 2.0, canvas.height - m.bottom / 2.0 + offset),
    }
}

/// Left axis frame; hidden axes slide `axis_offset` left of the plot.
pub(crate) fn y_axis_frame(config: &NarrativeConfig, plot: Size, shown: bool) -> AxisFrame {
    let m = config.margin;
    let offset = if shown { 0.0 } else { config.axis_offset };
    AxisFrame {
        axis: Point::new(m.left - offset, m.top),
        label: Point::new(m.left / 2.0 - offset, m.top + plot.height / 2.0),
    }
}

/// Marker position for `placement`, in plot pixels.
pub(crate) fn marker_target(
    marker: &Marker,
    placement: Placement,
    scales: &Scales,
    stats: &NarrativeStats,
    config: &NarrativeConfig,
) -> Point {
    let record = marker.record();
    let arm = record.treatment;
    match placement {
        Placement::Pooled => Point::new(marker.pooled_x(), scales.y.map(record.dlqi)),
        Placement::Split => Point::new(marker.split_x(), scales.y.map(record.dlqi)),
        Placement::ArmAnchor => scales.point(config.arm_anchors.get(arm), stats.outcome.get(arm)),
        Placement::ArmMean => scales.point(stats.itch.get(arm), stats.outcome.get(arm)),
        Placement::Individual => scales.point(record.itch, record.dlqi),
    }
}

fn frame_transition(frame: Point, opacity: f64, duration: Duration) -> Transition {
    Transition::single(
        Stage::over(duration)
            .set(Attr::TranslateX, frame.x)
            .set(Attr::TranslateY, frame.y)
            .set(Attr::Opacity, opacity),
    )
}

impl<S: Scene> Session<S> {
    /// Move the chart to `appearance`.
    pub(crate) fn apply(&mut self, appearance: &Appearance) {
        self.show_axes(appearance.x_axis, appearance.y_axis);
        self.place_markers(appearance);
        self.emphasize_means(!appearance.softened);
        self.show_guides(appearance.guides);
        self.show_annotation(appearance.annotation);
    }

    fn show_axes(&mut self, x_shown: bool, y_shown: bool) {
        let d = self.config.transition();
        let x = x_axis_frame(&self.config, self.canvas, self.plot, x_shown);
        let y = y_axis_frame(&self.config, self.plot, y_shown);
        let x_opacity = if x_shown { 1.0 } else { 0.0 };
        let y_opacity = if y_shown { 1.0 } else { 0.0 };
        let e = self.elements;
        self.scene.transition(e.x_axis, frame_transition(x.axis, x_opacity, d));
        self.scene.transition(e.x_label, frame_transition(x.label, x_opacity, d));
        self.scene.transition(e.y_axis, frame_transition(y.axis, y_opacity, d));
        self.scene.transition(e.y_label, frame_transition(y.label, y_opacity, d));
    }

    fn place_markers(&mut self, appearance: &Appearance) {
        let d = self.config.transition();
        let opacity = if appearance.faded {
            self.config.faded_marker_opacity
        } else {
            1.0
        };
        for marker in &self.markers {
            let p = marker_target(marker, appearance.placement, &self.scales, &self.stats, &self.config);
            let h = marker.handle();
            let arm = marker.record().treatment;
            for class_arm in Arm::ALL {
                self.scene
                    .set_class(h, class_arm.marker_class(), appearance.by_arm && arm == class_arm);
            }
            self.scene.transition(
                h,
                Transition::single(
                    Stage::over(d)
                        .set(Attr::Cx, p.x)
                        .set(Attr::Cy, p.y)
                        .set(Attr::Opacity, opacity),
                ),
            );
        }
    }

    fn emphasize_means(&mut self, full: bool) {
        let opacity = if full {
            1.0
        } else {
            self.config.softened_mean_opacity
        };
        self.scene.set_attr(self.elements.means, Attr::Opacity, opacity);
    }

    fn show_guides(&mut self, shown: &[(Guide, u32)]) {
        let d = self.config.transition();
        let plan = GuidePlan::new(&self.stats, &self.config);
        let mut controller = Controller::new(&mut self.scene, &self.scales, &self.elements.guides, d);
        for guide in Guide::ALL {
            let geometry = plan.get(guide);
            match shown.iter().find(|(g, _)| *g == guide) {
                Some(&(_, delay)) => geometry.draw(&mut controller, guide, d * delay),
                None => geometry.erase(&mut controller, guide, d),
            };
        }
    }

    fn show_annotation(&mut self, shown: Option<u32>) {
        let d = self.config.transition();
        let h: Handle = self.elements.annotation;
        let visibility = Visibility::of(&self.scene, h);
        match shown {
            Some(delay) if !visibility.is_bound_visible() => {
                self.scene.transition(
                    h,
                    Transition::single(Stage::over(d).delay(d * delay).set(Attr::Opacity, 1.0)),
                );
            }
            None if visibility.is_bound_visible() => {
                self.scene
                    .transition(h, Transition::single(Stage::over(d).set(Attr::Opacity, 0.0)));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_step_names_each_guide_at_most_once() {
        for (step, appearance) in NARRATIVE.iter().enumerate() {
            for guide in Guide::ALL {
                let n = appearance.guides.iter().filter(|(g, _)| *g == guide).count();
                assert!(n <= 1, "step {step} lists {guide:?} {n} times");
            }
        }
    }

    #[test]
    fn axes_appear_in_order() {
        assert!(!NARRATIVE[0].y_axis);
        assert!(NARRATIVE[1..].iter().all(|a| a.y_axis));
        assert!(NARRATIVE[..4].iter().all(|a| !a.x_axis));
        assert!(NARRATIVE[4..].iter().all(|a| a.x_axis));
    }

    #[test]
    fn mediator_only_in_final_step() {
        for (step, appearance) in NARRATIVE.iter().enumerate() {
            let shown = appearance.guides.iter().any(|(g, _)| *g == Guide::Mediator);
            assert_eq!(shown, step == STEP_COUNT - 1);
        }
    }

    #[test]
    fn hidden_axes_sit_at_offset() {
        let config = NarrativeConfig::default();
        let canvas = Size::new(800.0, 600.0);
        let plot = canvas.inner(config.margin);
        let shown = x_axis_frame(&config, canvas, plot, true);
        let hidden = x_axis_frame(&config, canvas, plot, false);
        assert_eq!(shown.axis, Point::new(80.0, 520.0));
        assert_eq!(hidden.axis.y - shown.axis.y, 200.0);
        assert_eq!(hidden.label.y - shown.label.y, 200.0);

        let shown = y_axis_frame(&config, plot, true);
        let hidden = y_axis_frame(&config, plot, false);
        assert_eq!(shown.axis, Point::new(80.0, 40.0));
        assert_eq!(shown.axis.x - hidden.axis.x, 200.0);
    }
}
