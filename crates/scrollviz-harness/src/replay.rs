#![forbid(unsafe_code)]

//! Deterministic replay of a scroll sequence on a [`RetainedScene`].
//!
//! The scene clock only moves when the harness advances it, so a replay of
//! the same dataset, config and step sequence always produces the same
//! checksums.

use std::io::Write;
use std::time::Duration;

use scrollviz_core::geometry::Size;
use scrollviz_mediation::{NarrativeConfig, Record, STEP_COUNT, Session, SummaryConfig, draw_summary};
use scrollviz_scene::RetainedScene;
use tracing::{debug, info, warn};

use crate::error::HarnessError;
use crate::golden::{Event, JsonlWriter, scene_checksum, snapshot};

/// How a replay drives the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOptions {
    /// Canvas size reported to the session.
    pub size: Size,
    /// Step indices delivered in order, as a scroll detector would.
    pub steps: Vec<usize>,
    /// Clock advance per frame. Zero settles each step at once.
    pub frame: Duration,
    /// Frames to play per step before forcing the scene to settle.
    pub max_frames: usize,
    /// Write every element with each step event.
    pub snapshots: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            size: Size::new(1024.0, 768.0),
            steps: (0..STEP_COUNT).collect(),
            frame: Duration::from_millis(16),
            max_frames: 600,
            snapshots: false,
        }
    }
}

/// One replayed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub index: usize,
    pub frames: usize,
    pub checksum: String,
}

/// Everything a replay produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub steps: Vec<StepRecord>,
    pub frames: usize,
}

impl ReplayReport {
    /// Checksums in step order.
    pub fn checksums(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.checksum.clone()).collect()
    }
}

/// Advance `scene` frame by frame until it settles. Returns frames played.
pub fn play(scene: &mut RetainedScene, frame: Duration, max_frames: usize) -> usize {
    let mut frames = 0;
    if !frame.is_zero() {
        while !scene.is_settled() && frames < max_frames {
            scene.advance(frame);
            frames += 1;
        }
    }
    if !scene.is_settled() {
        if !frame.is_zero() {
            warn!(frames, pending = scene.animating_count(), "scene still animating; settling");
        }
        scene.settle();
    }
    frames
}

/// Bootstrap a session and scroll through `options.steps`, logging every
/// settled step to `out`.
pub fn replay<W: Write>(
    records: &[Record],
    config: NarrativeConfig,
    options: &ReplayOptions,
    out: &mut JsonlWriter<W>,
) -> Result<ReplayReport, HarnessError> {
    let scene = RetainedScene::new(options.size);
    let mut session = Session::initialize(scene, records, config);
    let mut frames = play(session.scene_mut(), options.frame, options.max_frames);

    out.log(&Event::Start {
        case: "narrative",
        records: session.markers().len(),
        width: options.size.width,
        height: options.size.height,
        steps: &options.steps,
    })?;

    let mut steps = Vec::with_capacity(options.steps.len());
    for &index in &options.steps {
        session.on_step(index);
        let played = play(session.scene_mut(), options.frame, options.max_frames);
        frames += played;
        let checksum = scene_checksum(session.scene());
        debug!(index, frames = played, %checksum, "replayed step");
        out.log(&Event::Step {
            index,
            frames: played,
            checksum: &checksum,
            elements: options.snapshots.then(|| snapshot(session.scene())),
        })?;
        steps.push(StepRecord {
            index,
            frames: played,
            checksum,
        });
    }

    info!(steps = steps.len(), frames, "replay complete");
    Ok(ReplayReport { steps, frames })
}

/// Draw the summary chart and log its checksum. Returns the checksum.
pub fn summarize<W: Write>(
    records: &[Record],
    config: &SummaryConfig,
    snapshots: bool,
    out: &mut JsonlWriter<W>,
) -> Result<String, HarnessError> {
    let mut scene = RetainedScene::new(config.size);
    let chart = draw_summary(&mut scene, records, config);
    let checksum = scene_checksum(&scene);
    out.log(&Event::Summary {
        panels: chart.panels.len(),
        checksum: &checksum,
        elements: snapshots.then(|| snapshot(&scene)),
    })?;
    Ok(checksum)
}
