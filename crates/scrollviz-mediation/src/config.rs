#![forbid(unsafe_code)]

//! Layout, timing and annotation settings for the narrative and the summary
//! chart.
//!
//! Defaults reproduce the published figure. With the `serde` feature every
//! field is optional in JSON; missing fields keep their defaults.

use std::time::Duration;

use scrollviz_core::geometry::{Margin, Size};

use crate::data::Visit;
use crate::stats::PerArm;

/// Settings for the scroll-driven narrative chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NarrativeConfig {
    /// Space around the plot area for axes and labels.
    pub margin: Margin,
    /// Marker radius in pixels. Packs space markers one diameter apart.
    pub marker_radius: f64,
    /// Duration of every transition, in milliseconds.
    pub transition_ms: u64,
    /// Distance hidden axes slide away from the plot, in pixels.
    pub axis_offset: f64,
    /// Visit whose records are shown.
    pub visit: Visit,
    /// Itch value the pooled pack is centred on.
    pub pooled_anchor: f64,
    /// Itch value each arm's pack is centred on when split.
    pub arm_anchors: PerArm<f64>,
    /// Itch span of horizontal outcome-mean lines and regression lines.
    pub guide_x_extent: [f64; 2],
    /// Outcome span of vertical itch-mean lines.
    pub guide_y_extent: [f64; 2],
    /// Itch value of the vertical outcome-difference bracket.
    pub outcome_bracket_x: f64,
    /// Outcome value of the horizontal itch-difference bracket.
    pub itch_bracket_y: f64,
    /// Domain point (itch, outcome) of the annotation.
    pub annotation_at: [f64; 2],
    pub annotation_text: String,
    pub x_label: String,
    pub y_label: String,
    /// Marker opacity once regression lines take focus.
    pub faded_marker_opacity: f64,
    /// Mean-line group opacity once individual markers return.
    pub softened_mean_opacity: f64,
}

impl NarrativeConfig {
    /// Shared transition duration.
    #[inline]
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    /// Marker diameter in pixels.
    #[inline]
    pub fn marker_diameter(&self) -> f64 {
        self.marker_radius * 2.0
    }
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            margin: Margin::new(40.0, 40.0, 80.0, 80.0),
            marker_radius: 5.0,
            transition_ms: 750,
            axis_offset: 200.0,
            visit: Visit::FollowUp,
            pooled_anchor: 5.0,
            arm_anchors: PerArm::new(3.0, 7.0),
            guide_x_extent: [0.0, 10.0],
            guide_y_extent: [0.0, 30.0],
            outcome_bracket_x: 1.5,
            itch_bracket_y: 4.0,
            annotation_at: [0.5, 17.5],
            annotation_text: "Difference in DLQI".to_string(),
            x_label: "Itch".to_string(),
            y_label: "DLQI".to_string(),
            faded_marker_opacity: 0.5,
            softened_mean_opacity: 0.5,
        }
    }
}

/// Settings for the static summary chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SummaryConfig {
    /// Overall chart size in pixels.
    pub size: Size,
    /// Margins around each panel.
    pub margin: Margin,
    /// Gap between panels.
    pub panel_spacing: f64,
    pub marker_radius: f64,
    pub marker_opacity: f64,
    /// One row of panels per visit.
    pub visits: Vec<Visit>,
    /// Outcome axis domain shared by every panel.
    pub outcome_domain: [f64; 2],
    pub outcome_ticks: usize,
    pub y_label: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            size: Size::new(1200.0, 400.0),
            margin: Margin::new(32.0, 8.0, 40.0, 40.0),
            panel_spacing: 32.0,
            marker_radius: 3.0,
            marker_opacity: 0.5,
            visits: vec![Visit::Baseline],
            outcome_domain: [0.0, 30.0],
            outcome_ticks: 6,
            y_label: "DLQI *".to_string(),
        }
    }
}
