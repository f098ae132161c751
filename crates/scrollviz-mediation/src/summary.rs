#![forbid(unsafe_code)]

//! Static small-multiples summary chart.
//!
//! One row per configured visit and one panel per [`Predictor`]. Each panel
//! plots outcome against the predictor for every record of the visit, with
//! per-arm mean lines in both directions and the two fitted regression
//! lines. Nothing animates; the chart is rebuilt from scratch on each call.

use scrollviz_core::geometry::{Point, Size};
use scrollviz_scene::{Attr, AxisOrient, ElementKind, Handle, Scene};
use tracing::{debug, info};

use crate::config::SummaryConfig;
use crate::data::{Arm, Predictor, Record, Visit};
use crate::scale::LinearScale;
use crate::stats::{regression, summary_statistic};

/// One drawn panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryPanel {
    pub visit: Visit,
    pub predictor: Predictor,
    /// Panel group; its children are positioned in panel pixels.
    pub group: Handle,
    /// Top-left of the plot area in chart pixels.
    pub origin: Point,
    pub x: LinearScale,
    /// Records plotted in this panel.
    pub markers: usize,
}

/// Result of [`draw_summary`].
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryChart {
    /// Plot area of every panel.
    pub panel_size: Size,
    /// Outcome scale shared by every panel.
    pub y: LinearScale,
    pub panels: Vec<SummaryPanel>,
}

/// Suffix marking which effects are significant for `predictor`.
pub fn significance(predictor: Predictor) -> &'static str {
    match predictor {
        Predictor::Itch => " +#",
        Predictor::Bsa | Predictor::Redness => " +",
    }
}

/// Clear `scene` and draw the summary chart for `records`.
pub fn draw_summary<S: Scene>(scene: &mut S, records: &[Record], config: &SummaryConfig) -> SummaryChart {
    scene.clear();

    let m = config.margin;
    let columns = Predictor::ALL.len() as f64;
    let panel_width = ((config.size.width - m.horizontal() - columns * config.panel_spacing) / columns).max(0.0);
    let row_height = if config.visits.is_empty() {
        0.0
    } else {
        config.size.height / config.visits.len() as f64
    };
    let panel_size = Size::new(panel_width, row_height - m.vertical()).sanitized();
    let y = LinearScale::new(config.outcome_domain, [panel_size.height, 0.0]).nice();
    info!(
        visits = config.visits.len(),
        width = panel_size.width,
        height = panel_size.height,
        "summary chart"
    );

    let mut panels = Vec::with_capacity(config.visits.len() * Predictor::ALL.len());
    for (row, &visit) in config.visits.iter().enumerate() {
        let cohort: Vec<&Record> = records.iter().filter(|r| visit.matches(r)).collect();
        let row_group = scene.select(None, ElementKind::Group, &format!("g.visit-{}", visit.index()));
        scene.set_class(row_group, "visit", true);
        scene.set_attr(row_group, Attr::TranslateY, row_height * row as f64);

        let y_axis = scene.select(Some(row_group), ElementKind::Axis, "g.y-axis");
        scene.set_axis(y_axis, y.axis(AxisOrient::Left, config.outcome_ticks));
        translate(scene, y_axis, m.left, m.top);
        let y_label = scene.select(Some(row_group), ElementKind::Text, "text.y-label");
        scene.set_text(y_label, &config.y_label);
        translate(scene, y_label, m.left * 0.3, m.top + panel_size.height / 2.0);

        for (column, predictor) in Predictor::ALL.into_iter().enumerate() {
            let origin = Point::new(
                m.left + (column as f64 + 1.0) * config.panel_spacing + column as f64 * panel_size.width,
                m.top,
            );
            let x = LinearScale::new([0.0, predictor.axis_max()], [0.0, panel_size.width]).nice();
            let group = draw_panel(scene, row_group, &cohort, visit, predictor, origin, panel_size, &x, &y, config);
            debug!(visit = visit.index(), predictor = predictor.label(), rows = cohort.len(), "panel");
            panels.push(SummaryPanel {
                visit,
                predictor,
                group,
                origin: Point::new(origin.x, origin.y + row_height * row as f64),
                x,
                markers: cohort.len(),
            });
        }
    }

    SummaryChart { panel_size, y, panels }
}

#[allow(clippy::too_many_arguments)]
fn draw_panel<S: Scene>(
    scene: &mut S,
    row_group: Handle,
    cohort: &[&Record],
    visit: Visit,
    predictor: Predictor,
    origin: Point,
    size: Size,
    x: &LinearScale,
    y: &LinearScale,
    config: &SummaryConfig,
) -> Handle {
    let name = format!("g.x-{}", predictor.label().to_lowercase());
    let group = scene.select(Some(row_group), ElementKind::Group, &name);
    translate(scene, group, origin.x, origin.y);

    let x_axis = scene.select(Some(group), ElementKind::Axis, "g.x-axis");
    scene.set_axis(x_axis, x.axis(AxisOrient::Bottom, predictor.tick_count()));
    translate(scene, x_axis, 0.0, size.height);

    let x_label = scene.select(Some(group), ElementKind::Text, "text.x-label");
    scene.set_text(x_label, &format!("{}{}", predictor.label(), significance(predictor)));
    translate(scene, x_label, size.width / 2.0, size.height + config.margin.bottom);

    let data = scene.select(Some(group), ElementKind::Group, "g.data");
    for record in cohort {
        let h = scene.select(Some(data), ElementKind::Circle, &record.marker_name());
        scene.set_class(h, "datum", true);
        scene.set_class(h, record.treatment.marker_class(), true);
        scene.set_attr(h, Attr::Cx, x.map(predictor.value(record)));
        scene.set_attr(h, Attr::Cy, y.map(record.dlqi));
        scene.set_attr(h, Attr::R, config.marker_radius);
        scene.set_attr(h, Attr::Opacity, config.marker_opacity);
    }

    let [y_lo, y_hi] = config.outcome_domain;
    let x_hi = predictor.axis_max();
    let model = regression(visit, predictor);
    for arm in Arm::ALL {
        let stat = summary_statistic(arm, visit);
        let outcome_mean = stat.map_or(0.0, |s| s.dlqi);
        let measure_mean = stat.map_or(0.0, |s| s.mean(predictor));
        let prefix = arm.prefix();

        line(
            scene,
            data,
            &format!("line.{prefix}-outcome-mean"),
            &["mean", arm.line_class()],
            [(x.map(0.0), y.map(outcome_mean)), (x.map(x_hi), y.map(outcome_mean))],
        );
        line(
            scene,
            data,
            &format!("line.{prefix}-measure-mean"),
            &["mean", arm.line_class()],
            [(x.map(measure_mean), y.map(y_lo)), (x.map(measure_mean), y.map(y_hi))],
        );
        line(
            scene,
            data,
            &format!("line.{prefix}-regression"),
            &["regression", arm.line_class()],
            [
                (x.map(0.0), y.map(model.predict(arm, 0.0))),
                (x.map(x_hi), y.map(model.predict(arm, x_hi))),
            ],
        );
    }
    group
}

fn translate<S: Scene>(scene: &mut S, h: Handle, x: f64, y: f64) {
    scene.set_attr(h, Attr::TranslateX, x);
    scene.set_attr(h, Attr::TranslateY, y);
}

fn line<S: Scene>(scene: &mut S, parent: Handle, name: &str, classes: &[&'static str], ends: [(f64, f64); 2]) {
    let h = scene.select(Some(parent), ElementKind::Line, name);
    for &class in classes {
        scene.set_class(h, class, true);
    }
    let [(x1, y1), (x2, y2)] = ends;
    scene.set_attr(h, Attr::X1, x1);
    scene.set_attr(h, Attr::Y1, y1);
    scene.set_attr(h, Attr::X2, x2);
    scene.set_attr(h, Attr::Y2, y2);
}
