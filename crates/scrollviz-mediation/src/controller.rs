#![forbid(unsafe_code)]

//! Draw and erase primitives for guide lines.
//!
//! A guide line is either shown (drawn out from an origin point to its span)
//! or hidden (collapsed to a point, then made transparent). Whether a call
//! acts is decided from the line's [`Visibility`], which looks at both the
//! current opacity and the opacity the line will settle at:
//!
//! | current | settled | visibility     | draw   | erase  |
//! |---------|---------|----------------|--------|--------|
//! | 0       | 0       | `Hidden`       | acts   | no-op  |
//! | 0       | > 0     | `Appearing`    | no-op  | acts   |
//! | > 0     | > 0     | `Visible`      | no-op  | acts   |
//! | > 0     | 0       | `Disappearing` | acts   | no-op  |
//!
//! Guarding on the settled opacity means a draw issued while an erase is
//! still running restarts the draw, and vice versa, so the line always ends
//! in the state the most recent call asked for.

use std::time::Duration;

use scrollviz_core::geometry::Point;
use scrollviz_scene::{Attr, Handle, Scene, Stage, Transition};
use tracing::trace;

use crate::scale::Scales;

/// Visibility of an element, derived from its current and settled opacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Hidden,
    Appearing,
    Visible,
    Disappearing,
}

impl Visibility {
    /// Visibility of `handle` in `scene`.
    pub fn of<S: Scene + ?Sized>(scene: &S, handle: Handle) -> Self {
        let now = scene.attr(handle, Attr::Opacity) > 0.0;
        let settled = scene.settled_attr(handle, Attr::Opacity) > 0.0;
        match (now, settled) {
            (false, false) => Self::Hidden,
            (false, true) => Self::Appearing,
            (true, true) => Self::Visible,
            (true, false) => Self::Disappearing,
        }
    }

    /// Whether the element is, or is about to be, visible.
    #[inline]
    pub fn is_bound_visible(self) -> bool {
        matches!(self, Self::Appearing | Self::Visible)
    }
}

/// Named guide lines of the narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Guide {
    /// Horizontal line at the placebo outcome mean.
    PboOutcomeMean,
    /// Horizontal line at the treatment outcome mean.
    RxOutcomeMean,
    /// Vertical bracket between the two outcome means.
    OutcomeDifference,
    /// Vertical line at the placebo itch mean.
    PboItchMean,
    /// Vertical line at the treatment itch mean.
    RxItchMean,
    /// Horizontal bracket between the two itch means.
    ItchDifference,
    PboRegression,
    RxRegression,
    /// Vertical segment between the two regression lines at the itch
    /// midpoint: the treatment effect net of itch.
    Mediator,
}

impl Guide {
    pub const COUNT: usize = 9;

    pub const ALL: [Guide; Self::COUNT] = [
        Guide::PboOutcomeMean,
        Guide::RxOutcomeMean,
        Guide::OutcomeDifference,
        Guide::PboItchMean,
        Guide::RxItchMean,
        Guide::ItchDifference,
        Guide::PboRegression,
        Guide::RxRegression,
        Guide::Mediator,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Element name in the scene.
    pub const fn name(self) -> &'static str {
        match self {
            Self::PboOutcomeMean => "line.pbo-dlqi-mean",
            Self::RxOutcomeMean => "line.rx-dlqi-mean",
            Self::OutcomeDifference => "line.dlqi-mean-diff",
            Self::PboItchMean => "line.pbo-itch-mean",
            Self::RxItchMean => "line.rx-itch-mean",
            Self::ItchDifference => "line.itch-mean-diff",
            Self::PboRegression => "line.pbo-regression",
            Self::RxRegression => "line.rx-regression",
            Self::Mediator => "line.mediator",
        }
    }

    /// Style classes set on the element.
    pub const fn classes(self) -> &'static [&'static str] {
        match self {
            Self::PboOutcomeMean | Self::PboItchMean => &["mean", "pbo-line"],
            Self::RxOutcomeMean | Self::RxItchMean => &["mean", "rx-line"],
            Self::OutcomeDifference | Self::ItchDifference | Self::Mediator => &["diff"],
            Self::PboRegression => &["regression", "pbo-line"],
            Self::RxRegression => &["regression", "rx-line"],
        }
    }

    /// Whether the line belongs to the mean-line group, whose opacity softens
    /// all four per-arm mean lines at once.
    pub const fn is_mean(self) -> bool {
        matches!(
            self,
            Self::PboOutcomeMean | Self::RxOutcomeMean | Self::PboItchMean | Self::RxItchMean
        )
    }
}

/// Scene handle of every [`Guide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideHandles([Handle; Guide::COUNT]);

impl GuideHandles {
    pub fn new(handles: [Handle; Guide::COUNT]) -> Self {
        Self(handles)
    }

    #[inline]
    pub fn get(&self, guide: Guide) -> Handle {
        self.0[guide.index()]
    }
}

/// A line segment in domain units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Segment {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

/// Draw/erase primitives bound to one scene, scale pair and duration.
///
/// Coordinates are in domain units and mapped through the scales. Every
/// primitive touches only the guide it names and returns whether it
/// scheduled anything.
pub struct Controller<'a, S: Scene + ?Sized> {
    scene: &'a mut S,
    scales: &'a Scales,
    guides: &'a GuideHandles,
    duration: Duration,
}

impl<'a, S: Scene + ?Sized> Controller<'a, S> {
    pub fn new(scene: &'a mut S, scales: &'a Scales, guides: &'a GuideHandles, duration: Duration) -> Self {
        Self {
            scene,
            scales,
            guides,
            duration,
        }
    }

    /// Visibility of `guide`.
    pub fn visibility(&self, guide: Guide) -> Visibility {
        Visibility::of(&*self.scene, self.guides.get(guide))
    }

    /// Draw a horizontal line at `y` from `x1` to `x2`, growing out of
    /// `(x_start, y)`.
    pub fn draw_horizontal_line(
        &mut self,
        guide: Guide,
        x_start: f64,
        x1: f64,
        x2: f64,
        y: f64,
        delay: Duration,
    ) -> bool {
        self.draw_line(guide, (x_start, y), Segment::new(x1, y, x2, y), delay)
    }

    /// Draw a vertical line at `x` from `y1` to `y2`, growing out of
    /// `(x, y_start)`.
    pub fn draw_vertical_line(
        &mut self,
        guide: Guide,
        x: f64,
        y_start: f64,
        y1: f64,
        y2: f64,
        delay: Duration,
    ) -> bool {
        self.draw_line(guide, (x, y_start), Segment::new(x, y1, x, y2), delay)
    }

    /// Draw `span`, growing both endpoints out of `origin`.
    ///
    /// No-op while the guide is visible or appearing. Otherwise, after
    /// `delay`, both endpoints snap to `origin`, then move to `span` while
    /// opacity rises to 1.
    pub fn draw_line(&mut self, guide: Guide, origin: (f64, f64), span: Segment, delay: Duration) -> bool {
        let visibility = self.visibility(guide);
        if visibility.is_bound_visible() {
            trace!(guide = guide.name(), ?visibility, "draw skipped");
            return false;
        }
        let o = self.scales.point(origin.0, origin.1);
        let (a, b) = self.endpoints(span);
        let chain = Transition::new()
            .then(
                Stage::snap()
                    .delay(delay)
                    .set(Attr::X1, o.x)
                    .set(Attr::Y1, o.y)
                    .set(Attr::X2, o.x)
                    .set(Attr::Y2, o.y),
            )
            .then(
                Stage::over(self.duration)
                    .set(Attr::X1, a.x)
                    .set(Attr::Y1, a.y)
                    .set(Attr::X2, b.x)
                    .set(Attr::Y2, b.y)
                    .set(Attr::Opacity, 1.0),
            );
        self.scene.transition(self.guides.get(guide), chain);
        trace!(guide = guide.name(), ?visibility, ?delay, "draw");
        true
    }

    /// Erase a horizontal line at `y` spanning `x1..x2`, collapsing it into
    /// `(x_end, y)`.
    pub fn erase_horizontal_line(
        &mut self,
        guide: Guide,
        x1: f64,
        x2: f64,
        x_end: f64,
        y: f64,
        delay: Duration,
    ) -> bool {
        self.erase_line(guide, Segment::new(x1, y, x2, y), (x_end, y), delay)
    }

    /// Erase a vertical line at `x` spanning `y1..y2`, collapsing it into
    /// `(x, y_end)`.
    pub fn erase_vertical_line(
        &mut self,
        guide: Guide,
        x: f64,
        y1: f64,
        y2: f64,
        y_end: f64,
        delay: Duration,
    ) -> bool {
        self.erase_line(guide, Segment::new(x, y1, x, y2), (x, y_end), delay)
    }

    /// Erase `span` by collapsing both endpoints into `collapse`.
    ///
    /// No-op while the guide is hidden or disappearing. Otherwise, after
    /// `delay`, endpoints snap to `span`, move to `collapse`, and opacity
    /// snaps to 0.
    pub fn erase_line(&mut self, guide: Guide, span: Segment, collapse: (f64, f64), delay: Duration) -> bool {
        let visibility = self.visibility(guide);
        if !visibility.is_bound_visible() {
            trace!(guide = guide.name(), ?visibility, "erase skipped");
            return false;
        }
        let (a, b) = self.endpoints(span);
        let c = self.scales.point(collapse.0, collapse.1);
        let chain = Transition::new()
            .then(
                Stage::snap()
                    .delay(delay)
                    .set(Attr::X1, a.x)
                    .set(Attr::Y1, a.y)
                    .set(Attr::X2, b.x)
                    .set(Attr::Y2, b.y),
            )
            .then(
                Stage::over(self.duration)
                    .set(Attr::X1, c.x)
                    .set(Attr::Y1, c.y)
                    .set(Attr::X2, c.x)
                    .set(Attr::Y2, c.y),
            )
            .then(Stage::snap().set(Attr::Opacity, 0.0));
        self.scene.transition(self.guides.get(guide), chain);
        trace!(guide = guide.name(), ?visibility, ?delay, "erase");
        true
    }

    fn endpoints(&self, span: Segment) -> (Point, Point) {
        (
            self.scales.point(span.x1, span.y1),
            self.scales.point(span.x2, span.y2),
        )
    }
}
