#![forbid(unsafe_code)]

//! Step handler invariants: idempotence, order independence, the two-subject
//! walk-through and degenerate inputs.
//!
//! Run: `cargo test -p scrollviz-mediation --test narrative_steps`

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use scrollviz_core::geometry::Size;
use scrollviz_mediation::stats::regression;
use scrollviz_mediation::{
    Arm, Guide, NarrativeConfig, NarrativeStats, PerArm, Predictor, Record, STEP_COUNT, Session,
    StepError, StepRegistry, Visibility, Visit,
};
use scrollviz_scene::{Attr, ElementKind, RetainedScene, Scene};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const CANVAS: Size = Size::new(800.0, 600.0);

fn record(subject: u32, treatment: Arm, visit: u8, dlqi: f64, itch: f64) -> Record {
    Record {
        subject,
        treatment,
        visit,
        dlqi,
        bsa: f64::from(subject % 40),
        easi: f64::from(subject % 30),
        itch,
    }
}

/// Twenty follow-up records with repeated outcomes, plus baseline noise.
fn cohort() -> Vec<Record> {
    let mut records = Vec::new();
    for i in 0..20u32 {
        let arm = if i % 2 == 0 { Arm::Placebo } else { Arm::Treatment };
        let dlqi = f64::from(4 + (i % 5) * 3);
        let itch = f64::from(i % 9) + 0.5;
        records.push(record(i, arm, 1, dlqi, itch));
        records.push(record(i, arm, 0, dlqi + 2.0, itch + 1.0));
    }
    records
}

fn session() -> Session<RetainedScene> {
    let mut s = Session::initialize(RetainedScene::new(CANVAS), &cohort(), NarrativeConfig::default());
    s.scene_mut().settle();
    s
}

/// What a reader can see: every element's opacity, classes and placement.
/// Geometry of a transparent line is not visible and is left out.
#[derive(Debug, PartialEq)]
struct Shown {
    name: String,
    opacity: f64,
    classes: Vec<&'static str>,
    attrs: Option<Vec<f64>>,
}

fn shown(scene: &RetainedScene) -> Vec<Shown> {
    assert!(scene.is_settled(), "snapshot taken mid-transition");
    scene
        .elements()
        .map(|v| {
            let opacity = v.attr(Attr::Opacity);
            let mut classes = v.classes.to_vec();
            classes.sort_unstable();
            let hidden_line = v.kind == ElementKind::Line && opacity == 0.0;
            Shown {
                name: v.name.to_string(),
                opacity,
                classes,
                attrs: (!hidden_line).then(|| Attr::ALL.iter().map(|&a| v.attr(a)).collect()),
            }
        })
        .collect()
}

fn settled_at(step: usize) -> Vec<Shown> {
    let mut s = session();
    s.step(step).expect("known step");
    s.scene_mut().settle();
    shown(s.scene())
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ===========================================================================
// Idempotence
// ===========================================================================

#[test]
fn every_step_is_idempotent() {
    for step in 0..STEP_COUNT {
        let mut s = session();
        s.step(step).expect("known step");
        s.scene_mut().settle();
        let once = shown(s.scene());

        s.step(step).expect("known step");
        for guide in Guide::ALL {
            let view = s.scene().view(s.guide(guide)).expect("guide element");
            assert!(!view.is_animating(), "step {step} re-animated {guide:?}");
        }
        s.scene_mut().settle();
        assert_eq!(shown(s.scene()), once, "step {step}");
    }
}

#[test]
fn bootstrap_state_matches_step_zero() {
    let s = session();
    assert_eq!(s.current_step(), Some(0));
    assert_eq!(shown(s.scene()), settled_at(0));
}

// ===========================================================================
// Order independence
// ===========================================================================

#[test]
fn any_step_pair_settles_to_the_second_step() {
    let direct: Vec<Vec<Shown>> = (0..STEP_COUNT).map(settled_at).collect();
    for a in 0..STEP_COUNT {
        for b in 0..STEP_COUNT {
            let mut s = session();
            s.step(a).expect("known step");
            s.scene_mut().settle();
            s.step(b).expect("known step");
            s.scene_mut().settle();
            assert_eq!(shown(s.scene()), direct[b], "{a} then {b}");
        }
    }
}

#[test]
fn step_pair_mid_transition_settles_to_the_second_step() {
    let direct: Vec<Vec<Shown>> = (0..STEP_COUNT).map(settled_at).collect();
    for gap_ms in [0, 100, 800, 1600] {
        for a in 0..STEP_COUNT {
            for b in 0..STEP_COUNT {
                let mut s = session();
                s.step(a).expect("known step");
                s.scene_mut().advance(Duration::from_millis(gap_ms));
                s.step(b).expect("known step");
                s.scene_mut().settle();
                assert_eq!(shown(s.scene()), direct[b], "{a} then {b} after {gap_ms}ms");
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn scroll_sequence_settles_to_last_step(
        steps in proptest::collection::vec(0..STEP_COUNT, 1..8),
        gaps in proptest::collection::vec(0u64..2_500, 8),
    ) {
        let mut s = session();
        for (step, gap) in steps.iter().zip(&gaps) {
            s.step(*step).expect("known step");
            s.scene_mut().advance(Duration::from_millis(*gap));
        }
        s.scene_mut().settle();
        let last = *steps.last().expect("non-empty");
        prop_assert_eq!(shown(s.scene()), settled_at(last));
    }
}

// ===========================================================================
// Step content
// ===========================================================================

#[test]
fn mean_lines_soften_through_their_group() {
    let mut s = session();
    s.step(5).expect("known step");
    s.scene_mut().settle();
    let means = s.elements().means;
    assert_eq!(s.scene().attr(means, Attr::Opacity), 1.0);

    s.step(6).expect("known step");
    s.scene_mut().settle();
    assert_eq!(s.scene().attr(means, Attr::Opacity), 0.5);
    let line = s.guide(Guide::PboItchMean);
    assert_eq!(s.scene().attr(line, Attr::Opacity), 1.0);
    assert_eq!(s.scene().effective_opacity(line), 0.5);
}

#[test]
fn markers_colour_by_arm_from_step_two() {
    let mut s = session();
    let first = s.markers()[0].handle();
    assert!(!s.scene().has_class(first, "pbo-datum"));
    s.step(2).expect("known step");
    for marker in s.markers() {
        let arm = marker.record().treatment;
        assert!(s.scene().has_class(marker.handle(), arm.marker_class()));
        assert!(s.scene().has_class(marker.handle(), "datum"));
    }
    s.step(1).expect("known step");
    assert!(!s.scene().has_class(first, "pbo-datum"));
    assert!(!s.scene().has_class(first, "rx-datum"));
}

#[test]
fn cohort_is_filtered_to_the_configured_visit() {
    let s = session();
    assert_eq!(s.markers().len(), 20);
    assert!(s.markers().iter().all(|m| m.record().visit == 1));

    let config = NarrativeConfig {
        visit: Visit::Baseline,
        ..NarrativeConfig::default()
    };
    let s = Session::initialize(RetainedScene::new(CANVAS), &cohort(), config);
    assert!(s.markers().iter().all(|m| m.record().visit == 0));
    assert_eq!(s.stats().outcome.placebo, 16.005);
}

#[test]
fn markers_are_named_by_subject() {
    let mut records = cohort();
    records.reverse();
    let s = Session::initialize(RetainedScene::new(CANVAS), &records, NarrativeConfig::default());
    for marker in s.markers() {
        let view = s.scene().view(marker.handle()).expect("marker element");
        assert_eq!(view.name, marker.record().marker_name());
    }

    let seventeen = s
        .scene()
        .find(Some(s.elements().data), "circle.datum-17")
        .expect("subject 17");
    let marker = s
        .markers()
        .iter()
        .find(|m| m.handle() == seventeen)
        .expect("tracked marker");
    assert_eq!(marker.record().subject, 17);
}

#[test]
fn split_packs_are_spaced_one_diameter_apart() {
    let s = session();
    let anchor = s.scales().x.map(3.0);
    let mut xs: Vec<f64> = s
        .markers()
        .iter()
        .filter(|m| m.record().treatment == Arm::Placebo && m.record().dlqi == 4.0)
        .map(|m| m.split_x())
        .collect();
    xs.sort_by(f64::total_cmp);
    assert_eq!(xs.len(), 2);
    assert!(close(xs[1] - xs[0], 10.0));
    assert!(close((xs[0] + xs[1]) / 2.0, anchor));
}

// ===========================================================================
// Two-subject walk-through
// ===========================================================================

fn two_subjects() -> Session<RetainedScene> {
    let records = [
        record(1, Arm::Placebo, 1, 16.0, 6.0),
        record(2, Arm::Treatment, 1, 11.0, 5.0),
    ];
    let stats = NarrativeStats::new(
        PerArm::new(16.0, 11.0),
        PerArm::new(6.0, 5.0),
        regression(Visit::FollowUp, Predictor::Itch),
    );
    let mut s = Session::with_stats(RetainedScene::new(CANVAS), &records, NarrativeConfig::default(), stats);
    s.scene_mut().settle();
    s
}

#[test]
fn two_subjects_start_pooled_with_axes_hidden() {
    let s = two_subjects();
    let scene = s.scene();
    let e = s.elements();
    assert_eq!(scene.attr(e.x_axis, Attr::Opacity), 0.0);
    assert_eq!(scene.attr(e.y_axis, Attr::Opacity), 0.0);
    assert_eq!(scene.attr(e.y_axis, Attr::TranslateX), 80.0 - 200.0);

    let [a, b] = [&s.markers()[0], &s.markers()[1]];
    let anchor = s.scales().x.map(5.0);
    assert_eq!(scene.attr(a.handle(), Attr::Cx), a.pooled_x());
    assert!(close(a.pooled_x(), anchor));
    assert!(close(b.pooled_x(), anchor));
    assert!(close(scene.attr(a.handle(), Attr::Cy), s.scales().y.map(16.0)));
    assert!(close(scene.attr(b.handle(), Attr::Cy), s.scales().y.map(11.0)));
}

#[test]
fn two_subjects_step_three_shows_outcome_bracket() {
    let mut s = two_subjects();
    s.on_step(3);
    s.scene_mut().settle();
    let scene = s.scene();
    let y = s.scales().y;
    let x = s.scales().x;

    let [a, b] = [&s.markers()[0], &s.markers()[1]];
    assert!(close(scene.attr(a.handle(), Attr::Cy), y.map(16.0)));
    assert!(close(scene.attr(b.handle(), Attr::Cy), y.map(11.0)));
    assert!(close(scene.attr(a.handle(), Attr::Cx), x.map(3.0)));
    assert!(close(scene.attr(b.handle(), Attr::Cx), x.map(7.0)));

    let bracket = s.guide(Guide::OutcomeDifference);
    assert_eq!(Visibility::of(scene, bracket), Visibility::Visible);
    assert!(close(scene.attr(bracket, Attr::X1), x.map(1.5)));
    assert!(close(scene.attr(bracket, Attr::Y1), y.map(16.0)));
    assert!(close(scene.attr(bracket, Attr::Y2), y.map(11.0)));
    assert_eq!(scene.attr(s.elements().y_axis, Attr::Opacity), 1.0);
    assert_eq!(scene.attr(s.elements().x_axis, Attr::Opacity), 0.0);
}

#[test]
fn two_subjects_step_eight_shows_mediator_at_itch_midpoint() {
    let mut s = two_subjects();
    s.on_step(8);
    s.scene_mut().settle();
    let scene = s.scene();
    let x = s.scales().x;

    let mediator = s.guide(Guide::Mediator);
    assert_eq!(Visibility::of(scene, mediator), Visibility::Visible);
    assert!(close(scene.attr(mediator, Attr::X1), x.map(5.5)));
    assert!(close(scene.attr(mediator, Attr::X2), x.map(5.5)));

    let bracket = s.guide(Guide::OutcomeDifference);
    assert_eq!(Visibility::of(scene, bracket), Visibility::Visible);
    assert_eq!(scene.attr(s.elements().annotation, Attr::Opacity), 1.0);
    for marker in s.markers() {
        assert_eq!(scene.attr(marker.handle(), Attr::Opacity), 0.5);
    }
}

#[test]
fn annotation_waits_two_durations() {
    let mut s = two_subjects();
    s.on_step(8);
    let annotation = s.elements().annotation;
    s.scene_mut().advance(Duration::from_millis(1_400));
    assert_eq!(s.scene().attr(annotation, Attr::Opacity), 0.0);
    s.scene_mut().advance(Duration::from_millis(900));
    assert_eq!(s.scene().attr(annotation, Attr::Opacity), 1.0);
}

// ===========================================================================
// Unknown steps
// ===========================================================================

/// Warnings and dispatched step indices seen by a subscriber.
#[derive(Clone, Default)]
struct StepLog {
    warnings: Arc<AtomicUsize>,
    dispatched: Arc<Mutex<Vec<u64>>>,
}

impl StepLog {
    fn warnings(&self) -> usize {
        self.warnings.load(Ordering::SeqCst)
    }

    fn dispatched(&self) -> Vec<u64> {
        self.dispatched.lock().expect("step log").clone()
    }
}

struct IndexField(Option<u64>);

impl tracing::field::Visit for IndexField {
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        if field.name() == "index" {
            self.0 = Some(value);
        }
    }

    fn record_debug(&mut self, _field: &tracing::field::Field, _value: &dyn std::fmt::Debug) {}
}

impl<S: tracing::Subscriber> Layer<S> for StepLog {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        match *event.metadata().level() {
            tracing::Level::WARN => {
                self.warnings.fetch_add(1, Ordering::SeqCst);
            }
            tracing::Level::DEBUG => {
                let mut index = IndexField(None);
                event.record(&mut index);
                if let Some(index) = index.0 {
                    self.dispatched.lock().expect("step log").push(index);
                }
            }
            _ => {}
        }
    }
}

#[test]
fn unknown_step_is_reported_and_ignored() {
    let mut s = session();
    s.step(4).expect("known step");
    s.scene_mut().settle();
    let before = shown(s.scene());

    assert_eq!(s.step(9), Err(StepError::Unknown { index: 9, count: 9 }));
    assert_eq!(
        StepError::Unknown { index: 9, count: 9 }.to_string(),
        "unknown step 9 (narrative has 9 steps)"
    );

    let log = StepLog::default();
    let subscriber = tracing_subscriber::registry().with(log.clone());
    tracing::subscriber::with_default(subscriber, || s.on_step(usize::MAX));
    assert_eq!(log.warnings(), 1);
    assert!(log.dispatched().is_empty());

    assert!(s.scene().is_settled());
    assert_eq!(s.current_step(), Some(4));
    assert_eq!(shown(s.scene()), before);
}

#[test]
fn callback_dispatches_known_steps_and_reports_unknown_ones() {
    let s = session();
    assert_eq!(s.step_count(), 9);
    let log = StepLog::default();
    let subscriber = tracing_subscriber::registry().with(log.clone());
    tracing::subscriber::with_default(subscriber, || {
        let mut callback = s.into_callback();
        for step in [3, 9, 8, 0] {
            callback(step);
        }
    });
    assert_eq!(log.dispatched(), vec![3, 8, 0]);
    assert_eq!(log.warnings(), 1);
}

#[test]
fn narrative_registry_has_every_step() {
    let registry = StepRegistry::<RetainedScene>::narrative();
    assert_eq!(registry.len(), STEP_COUNT);
    assert!(registry.get(STEP_COUNT - 1).is_some());
    assert!(registry.get(STEP_COUNT).is_none());
    assert!(StepRegistry::<RetainedScene>::new().is_empty());
}

// ===========================================================================
// Degenerate input
// ===========================================================================

fn all_finite(scene: &RetainedScene) -> bool {
    scene
        .elements()
        .all(|v| Attr::ALL.iter().all(|&a| v.attr(a).is_finite()))
}

#[test]
fn unmeasured_canvas_collapses_without_failing() {
    let mut s = Session::initialize(RetainedScene::new(Size::ZERO), &cohort(), NarrativeConfig::default());
    assert_eq!(s.plot(), Size::ZERO);
    for step in 0..STEP_COUNT {
        s.on_step(step);
        s.scene_mut().settle();
        assert!(all_finite(s.scene()), "step {step}");
    }
    for marker in s.markers() {
        assert_eq!(s.scene().attr(marker.handle(), Attr::Cx), 0.0);
    }
}

#[test]
fn empty_dataset_still_runs_every_step() {
    let mut s = Session::initialize(RetainedScene::new(CANVAS), &[], NarrativeConfig::default());
    assert!(s.markers().is_empty());
    assert_eq!(s.scales().x.domain(), [0.0, 0.0]);
    for step in (0..STEP_COUNT).rev() {
        s.on_step(step);
        s.scene_mut().settle();
        assert!(all_finite(s.scene()), "step {step}");
    }
}

#[test]
fn bootstrapping_again_replaces_previous_elements() {
    let s = session();
    let count = s.scene().len();
    let mut scene = s.into_scene();
    scene.resize(Size::new(1024.0, 768.0));
    let s = Session::initialize(scene, &cohort(), NarrativeConfig::default());
    assert_eq!(s.scene().len(), count);
    assert_eq!(s.canvas(), Size::new(1024.0, 768.0));
    assert_eq!(s.plot(), Size::new(904.0, 648.0));
}
