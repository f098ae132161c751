#![forbid(unsafe_code)]

//! Harness error type.

use std::fmt;
use std::io;

/// Anything that stops a replay.
#[derive(Debug)]
pub enum HarnessError {
    /// Reading input or writing output failed.
    Io(io::Error),
    /// A dataset or config file is not valid JSON for its type.
    Json(serde_json::Error),
    /// Bad command line.
    Args(String),
    /// A golden file line that is neither a comment nor a checksum.
    Golden { line: usize, text: String },
}

impl HarnessError {
    pub(crate) fn args(message: impl Into<String>) -> Self {
        Self::Args(message.into())
    }

    pub(crate) fn golden(line: usize, text: &str) -> Self {
        Self::Golden {
            line,
            text: text.to_string(),
        }
    }
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "invalid JSON: {e}"),
            Self::Args(msg) => write!(f, "{msg}"),
            Self::Golden { line, text } => write!(f, "golden file line {line} is not a checksum: {text:?}"),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Args(_) | Self::Golden { .. } => None,
        }
    }
}

impl From<io::Error> for HarnessError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
