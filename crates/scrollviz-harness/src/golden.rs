#![forbid(unsafe_code)]

//! Golden output for scene replays.
//!
//! Every replayed step yields a checksum of the settled scene. Checksums and
//! optional per-element snapshots are written as JSONL with a stable schema:
//!
//! ```json
//! {"event":"start","case":"narrative","records":40,"width":1024.0,"height":768.0,"steps":[0,1,2]}
//! {"event":"step","index":0,"frames":0,"checksum":"hash:3b1f0c9a5e7d2a41"}
//! {"event":"complete","outcome":"pass","checksums":["hash:..."],"frames":141}
//! ```
//!
//! A [`GoldenFile`] holds one checksum per line; `#` lines are comments.
//! Set `BLESS=1` to rewrite it from the current run.

use std::collections::BTreeMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rustc_hash::FxHasher;
use scrollviz_scene::{Attr, RetainedScene};
use serde::Serialize;

use crate::error::HarnessError;

/// Prefix of every checksum string.
pub const CHECKSUM_PREFIX: &str = "hash:";

// ============================================================================
// Snapshots
// ============================================================================

/// One element as written to golden output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementRow<'a> {
    pub id: u32,
    pub name: &'a str,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ticks: Vec<&'a str>,
    /// Attributes that differ from their initial value.
    pub attrs: BTreeMap<&'static str, f64>,
}

/// Rows for every element of `scene`, in creation order.
pub fn snapshot(scene: &RetainedScene) -> Vec<ElementRow<'_>> {
    scene
        .elements()
        .map(|v| {
            let mut classes = v.classes.to_vec();
            classes.sort_unstable();
            ElementRow {
                id: v.handle.index(),
                name: v.name,
                kind: v.kind.as_str(),
                parent: v.parent.map(|p| p.index()),
                classes,
                text: v.text,
                ticks: v
                    .axis
                    .map(|a| a.ticks.iter().map(|t| t.label.as_str()).collect())
                    .unwrap_or_default(),
                attrs: Attr::ALL
                    .iter()
                    .filter(|a| v.attr(**a) != a.initial())
                    .map(|a| (a.as_str(), v.attr(*a)))
                    .collect(),
            }
        })
        .collect()
}

// ============================================================================
// Checksums
// ============================================================================

/// Deterministic checksum of everything a host would render.
///
/// `FxHasher` is unseeded and its algorithm is pinned by the crate version,
/// so committed golden files survive toolchain upgrades.
pub fn scene_checksum(scene: &RetainedScene) -> String {
    let mut hasher = FxHasher::default();
    scene.len().hash(&mut hasher);
    for row in snapshot(scene) {
        row.name.hash(&mut hasher);
        row.kind.hash(&mut hasher);
        row.parent.hash(&mut hasher);
        row.classes.hash(&mut hasher);
        row.text.hash(&mut hasher);
        row.ticks.hash(&mut hasher);
        for (attr, value) in &row.attrs {
            attr.hash(&mut hasher);
            // -0.0 and 0.0 render the same.
            let value = if *value == 0.0 { 0.0 } else { *value };
            value.to_bits().hash(&mut hasher);
        }
    }
    format!("{CHECKSUM_PREFIX}{:016x}", hasher.finish())
}

// ============================================================================
// JSONL events
// ============================================================================

/// Verdict of a run against its golden file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoldenOutcome {
    Pass,
    Fail,
    /// No golden file to compare against.
    Skip,
}

impl GoldenOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skip",
        }
    }
}

/// One line of golden output.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event<'a> {
    Start {
        case: &'a str,
        records: usize,
        width: f64,
        height: f64,
        steps: &'a [usize],
    },
    Step {
        index: usize,
        /// Frames advanced before the scene settled.
        frames: usize,
        checksum: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        elements: Option<Vec<ElementRow<'a>>>,
    },
    Summary {
        panels: usize,
        checksum: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        elements: Option<Vec<ElementRow<'a>>>,
    },
    Complete {
        outcome: GoldenOutcome,
        checksums: &'a [String],
        frames: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        mismatch: Option<usize>,
    },
}

/// Writes one JSON object per line.
#[derive(Debug)]
pub struct JsonlWriter<W: Write> {
    writer: W,
    lines: usize,
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    pub fn log(&mut self, event: &Event<'_>) -> Result<(), HarnessError> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Lines written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn flush(&mut self) -> Result<(), HarnessError> {
        Ok(self.writer.flush()?)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

// ============================================================================
// Golden files
// ============================================================================

/// Checksum file for one replay case.
#[derive(Debug, Clone)]
pub struct GoldenFile {
    path: PathBuf,
}

impl GoldenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blessed checksums. Nothing has been blessed while the file is absent.
    pub fn expected(&self) -> Result<Vec<String>, HarnessError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => parse_golden(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Replace the file with this run's checksums.
    pub fn bless(&self, case: &str, checksums: &[String]) -> Result<(), HarnessError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut text = format!("# {case}: {} checksums, regenerate with BLESS=1\n", checksums.len());
        for checksum in checksums {
            text.push_str(checksum);
            text.push('\n');
        }
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Checksum lines of a golden file, in order.
pub fn parse_golden(text: &str) -> Result<Vec<String>, HarnessError> {
    text.lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| {
            if line.starts_with(CHECKSUM_PREFIX) {
                Ok(line.to_string())
            } else {
                Err(HarnessError::golden(n, line))
            }
        })
        .collect()
}

/// Whether `BLESS` asks for golden files to be rewritten.
pub fn bless_requested() -> bool {
    matches!(std::env::var("BLESS").as_deref(), Ok("1" | "true" | "yes"))
}

/// Compare a run with its golden checksums. Returns the first mismatching
/// index on failure, or `None` when only the lengths differ.
pub fn verify_checksums(actual: &[String], expected: &[String]) -> (GoldenOutcome, Option<usize>) {
    if expected.is_empty() {
        return (GoldenOutcome::Skip, None);
    }
    if let Some(i) = actual.iter().zip(expected).position(|(a, e)| a != e) {
        return (GoldenOutcome::Fail, Some(i));
    }
    if actual.len() != expected.len() {
        return (GoldenOutcome::Fail, None);
    }
    (GoldenOutcome::Pass, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollviz_core::geometry::Size;
    use scrollviz_scene::{ElementKind, Scene};

    fn scene() -> RetainedScene {
        let mut scene = RetainedScene::new(Size::new(100.0, 100.0));
        let g = scene.select(None, ElementKind::Group, "g.data");
        let c = scene.select(Some(g), ElementKind::Circle, "circle.datum-0");
        scene.set_class(c, "datum", true);
        scene.set_attr(c, Attr::Cx, 12.0);
        scene
    }

    #[test]
    fn snapshot_lists_changed_attrs_only() {
        let s = scene();
        let rows = snapshot(&s);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].parent, Some(rows[0].id));
        assert_eq!(rows[1].classes, vec!["datum"]);
        assert_eq!(rows[1].attrs.len(), 1);
        assert_eq!(rows[1].attrs.get("cx"), Some(&12.0));
    }

    #[test]
    fn checksum_is_stable_and_sensitive() {
        let a = scene_checksum(&scene());
        assert_eq!(a, scene_checksum(&scene()));
        assert!(a.starts_with(CHECKSUM_PREFIX));
        assert_eq!(a.len(), CHECKSUM_PREFIX.len() + 16);

        let mut moved = scene();
        let h = moved.find(None, "g.data").and_then(|g| moved.find(Some(g), "circle.datum-0"));
        moved.set_attr(h.expect("marker"), Attr::Cx, 13.0);
        assert_ne!(a, scene_checksum(&moved));
    }

    #[test]
    fn empty_scene_checksum_is_unseeded() {
        let empty = RetainedScene::new(Size::new(10.0, 10.0));
        assert_eq!(scene_checksum(&empty), "hash:0000000000000000");
    }

    #[test]
    fn golden_text_skips_comments_and_rejects_junk() {
        let parsed = parse_golden("# case: 2 checksums\n\nhash:01\n  hash:02  \n").expect("valid file");
        assert_eq!(parsed, vec!["hash:01".to_string(), "hash:02".to_string()]);

        let err = parse_golden("hash:01\n<<<<<<< HEAD\n").expect_err("merge marker");
        assert!(matches!(err, HarnessError::Golden { line: 2, .. }));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn verify_reports_first_mismatch() {
        let s = |v: &[&str]| v.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        assert_eq!(verify_checksums(&s(&["a"]), &[]), (GoldenOutcome::Skip, None));
        assert_eq!(verify_checksums(&s(&["a", "b"]), &s(&["a", "b"])), (GoldenOutcome::Pass, None));
        assert_eq!(verify_checksums(&s(&["a", "x"]), &s(&["a", "b"])), (GoldenOutcome::Fail, Some(1)));
        assert_eq!(verify_checksums(&s(&["a"]), &s(&["a", "b"])), (GoldenOutcome::Fail, None));
    }

    #[test]
    fn events_are_tagged_lines() {
        let mut out = JsonlWriter::new(Vec::new());
        out.log(&Event::Step {
            index: 3,
            frames: 7,
            checksum: "hash:0",
            elements: None,
        })
        .expect("write to vec");
        assert_eq!(out.lines(), 1);
        let text = String::from_utf8(out.into_inner()).expect("utf8");
        assert_eq!(text, "{\"event\":\"step\",\"index\":3,\"frames\":7,\"checksum\":\"hash:0\"}\n");
    }
}
