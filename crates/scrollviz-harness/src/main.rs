#![forbid(unsafe_code)]

//! `scrollviz-replay`: scroll through the narrative and print golden JSONL.
//!
//! ```sh
//! cargo run -p scrollviz-harness -- --data records.json --steps all --out replay.jsonl
//! RUST_LOG=debug cargo run -p scrollviz-harness -- --data records.json --frame-ms 0
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use scrollviz_harness::golden::{bless_requested, verify_checksums};
use scrollviz_harness::{
    Args, Command, Event, GoldenFile, GoldenOutcome, HarnessError, JsonlWriter, USAGE, load_config, load_records,
    replay, summarize,
};
use scrollviz_mediation::{NarrativeConfig, SummaryConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    let args = match Command::parse(std::env::args().skip(1)) {
        Ok(Command::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Ok(Command::Run(args)) => args,
        Err(err) => {
            eprintln!("error: {err}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    match run(&args) {
        Ok(GoldenOutcome::Fail) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "replay failed");
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(args: &Args) -> Result<GoldenOutcome, HarnessError> {
    let records = load_records(&args.data)?;
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => NarrativeConfig::default(),
    };

    let sink: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    let mut out = JsonlWriter::new(sink);

    let report = replay(&records, config, &args.replay, &mut out)?;
    let mut checksums = report.checksums();
    if args.summary {
        checksums.push(summarize(&records, &SummaryConfig::default(), args.replay.snapshots, &mut out)?);
    }

    let (outcome, mismatch) = match args.golden.as_deref().map(GoldenFile::new) {
        Some(golden) if bless_requested() => {
            golden.bless("narrative", &checksums)?;
            info!(path = %golden.path().display(), "golden checksums written");
            (GoldenOutcome::Pass, None)
        }
        Some(golden) => verify_checksums(&checksums, &golden.expected()?),
        None => (GoldenOutcome::Skip, None),
    };

    out.log(&Event::Complete {
        outcome,
        checksums: &checksums,
        frames: report.frames,
        mismatch,
    })?;
    out.flush()?;
    info!(outcome = outcome.as_str(), lines = out.lines(), "done");
    Ok(outcome)
}
