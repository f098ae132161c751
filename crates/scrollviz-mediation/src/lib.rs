#![forbid(unsafe_code)]

//! A scroll-driven explanation of a mediation analysis.
//!
//! The chart tells its story in nine steps. Markers for each study subject
//! start pooled in one column, split by treatment arm, collapse onto arm
//! means, then spread out against itch severity while mean lines, brackets
//! and regression lines appear to show how much of the treatment effect on
//! quality of life runs through itch.
//!
//! # Flow
//!
//! 1. [`Session::initialize`] measures the scene, filters records to one
//!    visit, builds [`scale::Scales`] and both marker packs, and creates every
//!    element in its step-0 state.
//! 2. A scroll detector calls [`Session::on_step`] with the step index that
//!    entered view. Each step sets the whole chart to an absolute target
//!    ([`steps::NARRATIVE`]), so the result depends only on the latest step.
//! 3. The host advances the scene clock to play the scheduled transitions.
//!
//! [`summary::draw_summary`] draws the static companion chart.

pub mod config;
pub mod controller;
pub mod data;
pub mod guides;
pub mod layout;
pub mod scale;
pub mod session;
pub mod stats;
pub mod steps;
pub mod summary;

pub use config::{NarrativeConfig, SummaryConfig};
pub use controller::{Controller, Guide, Visibility};
pub use data::{Arm, Predictor, Record, Visit};
pub use scale::{LinearScale, Scales};
pub use session::{Marker, Session, StepError};
pub use stats::{NarrativeStats, PerArm, RegressionCoefficients};
pub use steps::{STEP_COUNT, StepRegistry};
pub use summary::{SummaryChart, draw_summary};
