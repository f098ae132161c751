#![forbid(unsafe_code)]

//! Where each guide line sits, grows from and collapses into.
//!
//! Every guide has exactly one geometry per session, so a visible guide has
//! the same endpoints no matter which step drew it.

use std::time::Duration;

use scrollviz_scene::Scene;

use crate::config::NarrativeConfig;
use crate::controller::{Controller, Guide, Segment};
use crate::data::Arm;
use crate::stats::NarrativeStats;

/// Orientation-specific geometry, in domain units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuideShape {
    /// Grows from `(x_start, y)` and collapses into `(x_end, y)`.
    Horizontal {
        y: f64,
        x1: f64,
        x2: f64,
        x_start: f64,
        x_end: f64,
    },
    /// Grows from `(x, y_start)` and collapses into `(x, y_end)`.
    Vertical {
        x: f64,
        y1: f64,
        y2: f64,
        y_start: f64,
        y_end: f64,
    },
    Sloped {
        span: Segment,
        origin: (f64, f64),
        collapse: (f64, f64),
    },
}

/// Canonical geometry of one guide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideGeometry {
    pub shape: GuideShape,
    /// Wait before collapsing, in transition durations.
    pub erase_delay: u32,
}

impl GuideGeometry {
    /// Geometry of `guide` for the given statistics and configuration.
    pub fn of(guide: Guide, stats: &NarrativeStats, config: &NarrativeConfig) -> Self {
        let [x_lo, x_hi] = config.guide_x_extent;
        let [y_lo, y_hi] = config.guide_y_extent;

        let outcome_mean = |arm: Arm| GuideShape::Horizontal {
            y: stats.outcome.get(arm),
            x1: x_lo,
            x2: x_hi,
            x_start: x_lo,
            x_end: x_lo,
        };
        let itch_mean = |arm: Arm| GuideShape::Vertical {
            x: stats.itch.get(arm),
            y1: y_lo,
            y2: y_hi,
            y_start: y_lo,
            y_end: y_lo,
        };
        let regression = |arm: Arm| {
            let start = (x_lo, stats.predicted(arm, x_lo));
            GuideShape::Sloped {
                span: Segment::new(start.0, start.1, x_hi, stats.predicted(arm, x_hi)),
                origin: start,
                collapse: start,
            }
        };

        let (shape, erase_delay) = match guide {
            Guide::PboOutcomeMean => (outcome_mean(Arm::Placebo), 0),
            Guide::RxOutcomeMean => (outcome_mean(Arm::Treatment), 0),
            Guide::OutcomeDifference => {
                let mid = stats.outcome_midpoint();
                let shape = GuideShape::Vertical {
                    x: config.outcome_bracket_x,
                    y1: stats.outcome.placebo,
                    y2: stats.outcome.treatment,
                    y_start: mid,
                    y_end: mid,
                };
                (shape, 0)
            }
            Guide::PboItchMean => (itch_mean(Arm::Placebo), 0),
            Guide::RxItchMean => (itch_mean(Arm::Treatment), 0),
            Guide::ItchDifference => {
                let mid = stats.itch_midpoint();
                let shape = GuideShape::Horizontal {
                    y: config.itch_bracket_y,
                    x1: stats.itch.treatment,
                    x2: stats.itch.placebo,
                    x_start: mid,
                    x_end: mid,
                };
                (shape, 0)
            }
            Guide::PboRegression => (regression(Arm::Placebo), 1),
            Guide::RxRegression => (regression(Arm::Treatment), 1),
            Guide::Mediator => {
                let x = stats.itch_midpoint();
                let pbo = stats.predicted(Arm::Placebo, x);
                let rx = stats.predicted(Arm::Treatment, x);
                let mid = (pbo + rx) / 2.0;
                let shape = GuideShape::Vertical {
                    x,
                    y1: pbo,
                    y2: rx,
                    y_start: mid,
                    y_end: mid,
                };
                (shape, 1)
            }
        };
        Self { shape, erase_delay }
    }

    /// The visible span.
    pub fn span(&self) -> Segment {
        match self.shape {
            GuideShape::Horizontal { y, x1, x2, .. } => Segment::new(x1, y, x2, y),
            GuideShape::Vertical { x, y1, y2, .. } => Segment::new(x, y1, x, y2),
            GuideShape::Sloped { span, .. } => span,
        }
    }

    /// The point both endpoints collapse into when erased.
    pub fn collapse_point(&self) -> (f64, f64) {
        match self.shape {
            GuideShape::Horizontal { y, x_end, .. } => (x_end, y),
            GuideShape::Vertical { x, y_end, .. } => (x, y_end),
            GuideShape::Sloped { collapse, .. } => collapse,
        }
    }

    /// Show `guide` after `delay`. Returns whether a draw was scheduled.
    pub fn draw<S: Scene + ?Sized>(&self, controller: &mut Controller<'_, S>, guide: Guide, delay: Duration) -> bool {
        match self.shape {
            GuideShape::Horizontal {
                y, x1, x2, x_start, ..
            } => controller.draw_horizontal_line(guide, x_start, x1, x2, y, delay),
            GuideShape::Vertical {
                x, y1, y2, y_start, ..
            } => controller.draw_vertical_line(guide, x, y_start, y1, y2, delay),
            GuideShape::Sloped { span, origin, .. } => controller.draw_line(guide, origin, span, delay),
        }
    }

    /// Hide `guide` after its erase delay. Returns whether an erase was
    /// scheduled.
    pub fn erase<S: Scene + ?Sized>(&self, controller: &mut Controller<'_, S>, guide: Guide, unit: Duration) -> bool {
        let delay = unit * self.erase_delay;
        match self.shape {
            GuideShape::Horizontal { y, x1, x2, x_end, .. } => {
                controller.erase_horizontal_line(guide, x1, x2, x_end, y, delay)
            }
            GuideShape::Vertical { x, y1, y2, y_end, .. } => {
                controller.erase_vertical_line(guide, x, y1, y2, y_end, delay)
            }
            GuideShape::Sloped { span, collapse, .. } => controller.erase_line(guide, span, collapse, delay),
        }
    }
}

/// Geometry of every guide, indexed by [`Guide::index`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuidePlan([GuideGeometry; Guide::COUNT]);

impl GuidePlan {
    pub fn new(stats: &NarrativeStats, config: &NarrativeConfig) -> Self {
        Self(Guide::ALL.map(|g| GuideGeometry::of(g, stats, config)))
    }

    #[inline]
    pub fn get(&self, guide: Guide) -> &GuideGeometry {
        &self.0[guide.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Visit;

    fn plan() -> GuidePlan {
        let stats = NarrativeStats::for_visit(Visit::FollowUp).expect("table row");
        GuidePlan::new(&stats, &NarrativeConfig::default())
    }

    #[test]
    fn outcome_means_span_the_itch_extent() {
        let p = plan();
        assert_eq!(
            p.get(Guide::PboOutcomeMean).span(),
            Segment::new(0.0, 16.245, 10.0, 16.245)
        );
        assert_eq!(p.get(Guide::RxOutcomeMean).collapse_point(), (0.0, 10.81));
    }

    #[test]
    fn brackets_grow_from_the_midpoint() {
        let p = plan();
        let g = p.get(Guide::OutcomeDifference);
        assert_eq!(g.span(), Segment::new(1.5, 16.245, 1.5, 10.81));
        let (x, y) = g.collapse_point();
        assert_eq!(x, 1.5);
        assert!((y - 13.5275).abs() < 1e-9);

        let g = p.get(Guide::ItchDifference);
        assert_eq!(g.span().y1, 4.0);
        assert_eq!(g.span().x1, 4.7133);
    }

    #[test]
    fn regressions_follow_the_model() {
        let p = plan();
        let span = p.get(Guide::PboRegression).span();
        assert_eq!(span.x1, 0.0);
        assert!((span.y1 - 4.60514).abs() < 1e-9);
        assert!((span.y2 - (4.60514 + 17.808)).abs() < 1e-9);
        let rx = p.get(Guide::RxRegression).span();
        assert!((span.y1 - rx.y1 - 2.1886).abs() < 1e-9);
        assert_eq!(p.get(Guide::RxRegression).erase_delay, 1);
    }

    #[test]
    fn mediator_sits_at_itch_midpoint() {
        let p = plan();
        let span = p.get(Guide::Mediator).span();
        assert!((span.x1 - 5.6248).abs() < 1e-9);
        assert_eq!(span.x1, span.x2);
        assert!((span.y1 - span.y2 - 2.1886).abs() < 1e-9);
        assert_eq!(p.get(Guide::Mediator).erase_delay, 1);
    }
}
