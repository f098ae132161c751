#![forbid(unsafe_code)]

//! Command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use scrollviz_core::geometry::Size;
use scrollviz_mediation::STEP_COUNT;

use crate::error::HarnessError;
use crate::replay::ReplayOptions;

pub const USAGE: &str = "\
Usage: scrollviz-replay --data <records.json> [options]

Options:
  --data <path>       JSON array of records (required)
  --config <path>     JSON narrative config; missing fields keep defaults
  --steps <list>      comma-separated step indices, or `all` (default: all)
  --size <WxH>        canvas size in pixels (default: 1024x768)
  --frame-ms <ms>     clock advance per frame; 0 settles at once (default: 16)
  --out <path>        write JSONL here instead of stdout
  --summary           also draw the summary chart
  --snapshots         include every element with each step
  --golden <path>     compare checksums with this file (BLESS=1 rewrites it)
  -h, --help          print this help";

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub data: PathBuf,
    pub config: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub golden: Option<PathBuf>,
    pub summary: bool,
    pub replay: ReplayOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Run(Args),
}

impl Command {
    /// Parse arguments, not including the program name.
    pub fn parse<I>(args: I) -> Result<Self, HarnessError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut data = None;
        let mut config = None;
        let mut out = None;
        let mut golden = None;
        let mut summary = false;
        let mut replay = ReplayOptions::default();

        while let Some(arg) = args.next() {
            let mut value = || {
                args.next()
                    .ok_or_else(|| HarnessError::args(format!("{arg} needs a value")))
            };
            match arg.as_str() {
                "-h" | "--help" => return Ok(Self::Help),
                "--data" => data = Some(PathBuf::from(value()?)),
                "--config" => config = Some(PathBuf::from(value()?)),
                "--out" => out = Some(PathBuf::from(value()?)),
                "--golden" => golden = Some(PathBuf::from(value()?)),
                "--steps" => replay.steps = parse_steps(&value()?)?,
                "--size" => replay.size = parse_size(&value()?)?,
                "--frame-ms" => {
                    let raw = value()?;
                    let ms = raw
                        .parse()
                        .map_err(|_| HarnessError::args(format!("--frame-ms: not a number: {raw}")))?;
                    replay.frame = Duration::from_millis(ms);
                }
                "--summary" => summary = true,
                "--snapshots" => replay.snapshots = true,
                other => return Err(HarnessError::args(format!("unknown argument: {other}"))),
            }
        }

        let data = data.ok_or_else(|| HarnessError::args("--data is required"))?;
        Ok(Self::Run(Args {
            data,
            config,
            out,
            golden,
            summary,
            replay,
        }))
    }
}

/// `all`, or a comma-separated list of step indices.
pub fn parse_steps(raw: &str) -> Result<Vec<usize>, HarnessError> {
    if raw == "all" {
        return Ok((0..STEP_COUNT).collect());
    }
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| HarnessError::args(format!("--steps: not a step index: {s}")))
        })
        .collect()
}

/// `WIDTHxHEIGHT` in pixels.
pub fn parse_size(raw: &str) -> Result<Size, HarnessError> {
    let bad = || HarnessError::args(format!("--size: expected WxH, got {raw}"));
    let (w, h) = raw.split_once(['x', 'X']).ok_or_else(bad)?;
    let width: f64 = w.trim().parse().map_err(|_| bad())?;
    let height: f64 = h.trim().parse().map_err(|_| bad())?;
    if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
        return Err(bad());
    }
    Ok(Size::new(width, height))
}
