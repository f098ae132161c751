#![forbid(unsafe_code)]

//! Session bootstrap and step dispatch.
//!
//! A [`Session`] owns the scene, the filtered cohort, the scales and every
//! element handle the narrative touches. It is built once per chart (and
//! again after a resize) by [`Session::initialize`], then driven by a scroll
//! detector calling [`Session::on_step`].

use std::fmt;

use scrollviz_core::geometry::Size;
use scrollviz_scene::{Attr, AxisOrient, ElementKind, Handle, Scene};
use tracing::{debug, info, info_span, warn};

use crate::config::NarrativeConfig;
use crate::controller::{Guide, GuideHandles};
use crate::data::Record;
use crate::guides::GuidePlan;
use crate::layout::{pack_by_arm, pack_pooled};
use crate::scale::{DEFAULT_TICK_COUNT, LinearScale, Scales, extent};
use crate::stats::{NarrativeStats, PerArm};
use crate::steps::{StepRegistry, x_axis_frame, y_axis_frame};

/// A step index the registry does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepError {
    Unknown { index: usize, count: usize },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown { index, count } => {
                write!(f, "unknown step {index} (narrative has {count} steps)")
            }
        }
    }
}

impl std::error::Error for StepError {}

/// One plotted record and its cached pack positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    record: Record,
    pooled_x: f64,
    split_x: f64,
    handle: Handle,
}

impl Marker {
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// x pixel in the single pooled pack.
    pub fn pooled_x(&self) -> f64 {
        self.pooled_x
    }

    /// x pixel in the record's arm pack.
    pub fn split_x(&self) -> f64 {
        self.split_x
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }
}

/// Handles of every non-marker element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elements {
    /// Plot-area group, translated to the margins.
    pub data: Handle,
    /// Group holding the four per-arm mean lines.
    pub means: Handle,
    pub x_axis: Handle,
    pub x_label: Handle,
    pub y_axis: Handle,
    pub y_label: Handle,
    pub annotation: Handle,
    pub guides: GuideHandles,
}

/// A live narrative chart.
pub struct Session<S: Scene> {
    pub(crate) scene: S,
    pub(crate) config: NarrativeConfig,
    pub(crate) stats: NarrativeStats,
    pub(crate) canvas: Size,
    pub(crate) plot: Size,
    pub(crate) scales: Scales,
    pub(crate) markers: Vec<Marker>,
    pub(crate) elements: Elements,
    registry: StepRegistry<S>,
    current: Option<usize>,
}

impl<S: Scene> Session<S> {
    /// Build the chart from the precomputed statistics of `config.visit`.
    pub fn initialize(scene: S, records: &[Record], config: NarrativeConfig) -> Self {
        let stats = NarrativeStats::for_visit(config.visit).unwrap_or_else(|| {
            warn!(visit = config.visit.index(), "no precomputed statistics; guides collapse to zero");
            NarrativeStats::default()
        });
        Self::with_stats(scene, records, config, stats)
    }

    /// Build the chart with explicit statistics.
    ///
    /// Clears the scene, filters `records` to the configured visit, builds
    /// the scales and both packs, creates every element and applies step 0.
    /// Never fails: an unmeasured canvas or an empty cohort yields a chart
    /// collapsed onto the range origin.
    pub fn with_stats(mut scene: S, records: &[Record], config: NarrativeConfig, stats: NarrativeStats) -> Self {
        let _span = info_span!("bootstrap").entered();
        scene.clear();

        let canvas = scene.client_size().sanitized();
        let plot = canvas.inner(config.margin);
        let cohort: Vec<Record> = records
            .iter()
            .filter(|r| config.visit.matches(r))
            .cloned()
            .collect();
        info!(
            width = canvas.width,
            height = canvas.height,
            rows = cohort.len(),
            total = records.len(),
            "bootstrap"
        );
        if plot.is_empty() {
            debug!("plot area is empty");
        }

        let scales = Scales {
            x: LinearScale::new(extent(cohort.iter().map(|r| r.itch)), [0.0, plot.width]).nice(),
            y: LinearScale::new(extent(cohort.iter().map(|r| r.dlqi)), [plot.height, 0.0]).nice(),
        };
        debug!(x = ?scales.x.domain(), y = ?scales.y.domain(), "scales");

        let diameter = config.marker_diameter();
        let pooled = pack_pooled(&cohort, scales.x.map(config.pooled_anchor), diameter);
        let anchors = PerArm::new(
            scales.x.map(config.arm_anchors.placebo),
            scales.x.map(config.arm_anchors.treatment),
        );
        let split = pack_by_arm(&cohort, anchors, diameter);

        let elements = create_elements(&mut scene, &config, canvas, plot, &scales, &stats);

        let markers = cohort
            .into_iter()
            .zip(pooled)
            .zip(split)
            .map(|((record, pooled_x), split_x)| {
                let handle = scene.select(Some(elements.data), ElementKind::Circle, &record.marker_name());
                scene.set_class(handle, "datum", true);
                scene.set_attr(handle, Attr::R, config.marker_radius);
                scene.set_attr(handle, Attr::Cx, pooled_x);
                scene.set_attr(handle, Attr::Cy, scales.y.map(record.dlqi));
                scene.set_attr(handle, Attr::Opacity, 1.0);
                Marker {
                    record,
                    pooled_x,
                    split_x,
                    handle,
                }
            })
            .collect();

        let mut session = Self {
            scene,
            config,
            stats,
            canvas,
            plot,
            scales,
            markers,
            elements,
            registry: StepRegistry::narrative(),
            current: None,
        };
        session.on_step(0);
        session
    }

    /// Run the handler for step `index`.
    pub fn step(&mut self, index: usize) -> Result<(), StepError> {
        let handler = self.registry.get(index).ok_or(StepError::Unknown {
            index,
            count: self.registry.len(),
        })?;
        debug!(index, previous = ?self.current, "step");
        handler(self);
        self.current = Some(index);
        Ok(())
    }

    /// Step callback for a scroll detector. Unknown steps are logged and
    /// leave the chart unchanged.
    pub fn on_step(&mut self, index: usize) {
        if let Err(err) = self.step(index) {
            warn!(%err, "step ignored");
        }
    }

    /// The session as a boxed step callback.
    pub fn into_callback(mut self) -> Box<dyn FnMut(usize)>
    where
        S: 'static,
    {
        Box::new(move |index| self.on_step(index))
    }

    /// Most recently applied step.
    pub fn current_step(&self) -> Option<usize> {
        self.current
    }

    pub fn step_count(&self) -> usize {
        self.registry.len()
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Mutable scene access, for hosts that advance its clock.
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Give the scene back, e.g. to bootstrap again after a resize.
    pub fn into_scene(self) -> S {
        self.scene
    }

    pub fn config(&self) -> &NarrativeConfig {
        &self.config
    }

    pub fn stats(&self) -> &NarrativeStats {
        &self.stats
    }

    pub fn scales(&self) -> &Scales {
        &self.scales
    }

    /// Measured canvas size.
    pub fn canvas(&self) -> Size {
        self.canvas
    }

    /// Plot area inside the margins.
    pub fn plot(&self) -> Size {
        self.plot
    }

    /// Markers in cohort order.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    /// Scene handle of `guide`.
    pub fn guide(&self, guide: Guide) -> Handle {
        self.elements.guides.get(guide)
    }
}

impl<S: Scene> fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("canvas", &self.canvas)
            .field("markers", &self.markers.len())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

/// Create axes, labels, guides and the annotation in their step-0 state.
fn create_elements<S: Scene>(
    scene: &mut S,
    config: &NarrativeConfig,
    canvas: Size,
    plot: Size,
    scales: &Scales,
    stats: &NarrativeStats,
) -> Elements {
    let place = |scene: &mut S, h: Handle, x: f64, y: f64, opacity: f64| {
        scene.set_attr(h, Attr::TranslateX, x);
        scene.set_attr(h, Attr::TranslateY, y);
        scene.set_attr(h, Attr::Opacity, opacity);
    };

    let x_frame = x_axis_frame(config, canvas, plot, false);
    let y_frame = y_axis_frame(config, plot, false);

    let x_axis = scene.select(None, ElementKind::Axis, "g.x-axis");
    scene.set_axis(x_axis, scales.x.axis(AxisOrient::Bottom, DEFAULT_TICK_COUNT));
    place(scene, x_axis, x_frame.axis.x, x_frame.axis.y, 0.0);

    let x_label = scene.select(None, ElementKind::Text, "text.x-label");
    scene.set_text(x_label, &config.x_label);
    place(scene, x_label, x_frame.label.x, x_frame.label.y, 0.0);

    let y_axis = scene.select(None, ElementKind::Axis, "g.y-axis");
    scene.set_axis(y_axis, scales.y.axis(AxisOrient::Left, DEFAULT_TICK_COUNT));
    place(scene, y_axis, y_frame.axis.x, y_frame.axis.y, 0.0);

    let y_label = scene.select(None, ElementKind::Text, "text.y-label");
    scene.set_text(y_label, &config.y_label);
    place(scene, y_label, y_frame.label.x, y_frame.label.y, 0.0);

    let data = scene.select(None, ElementKind::Group, "g.data");
    let origin = config.margin.origin();
    place(scene, data, origin.x, origin.y, 1.0);

    let means = scene.select(Some(data), ElementKind::Group, "g.means");

    let plan = GuidePlan::new(stats, config);
    let handles = Guide::ALL.map(|guide| {
        let parent = if guide.is_mean() { means } else { data };
        let h = scene.select(Some(parent), ElementKind::Line, guide.name());
        for &class in guide.classes() {
            scene.set_class(h, class, true);
        }
        let (cx, cy) = plan.get(guide).collapse_point();
        let c = scales.point(cx, cy);
        for (attr, value) in [(Attr::X1, c.x), (Attr::Y1, c.y), (Attr::X2, c.x), (Attr::Y2, c.y)] {
            scene.set_attr(h, attr, value);
        }
        scene.set_attr(h, Attr::Opacity, 0.0);
        h
    });

    let annotation = scene.select(Some(data), ElementKind::Text, "text.annotation");
    scene.set_text(annotation, &config.annotation_text);
    let at = scales.point(config.annotation_at[0], config.annotation_at[1]);
    place(scene, annotation, at.x, at.y, 0.0);

    Elements {
        data,
        means,
        x_axis,
        x_label,
        y_axis,
        y_label,
        annotation,
        guides: GuideHandles::new(handles),
    }
}
