#![forbid(unsafe_code)]

//! Replay harness for the scroll narrative.
//!
//! Loads a JSON dataset, bootstraps a [`scrollviz_mediation::Session`] on a
//! [`scrollviz_scene::RetainedScene`], scrolls through a step sequence on a
//! deterministic clock and writes one JSONL line per settled step with a
//! checksum of the scene. Checksums can be compared with a golden file.

pub mod args;
pub mod error;
pub mod golden;
pub mod load;
pub mod replay;

pub use args::{Args, Command, USAGE};
pub use error::HarnessError;
pub use golden::{Event, GoldenFile, GoldenOutcome, JsonlWriter, scene_checksum, snapshot};
pub use load::{load_config, load_records, parse_config, parse_records};
pub use replay::{ReplayOptions, ReplayReport, StepRecord, play, replay, summarize};
