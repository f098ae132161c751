#![forbid(unsafe_code)]

//! Study records and the vocabulary used to slice them.

use std::fmt;

/// Treatment arm of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub enum Arm {
    Placebo,
    Treatment,
}

impl Arm {
    /// Both arms, placebo first.
    pub const ALL: [Arm; 2] = [Arm::Placebo, Arm::Treatment];

    /// Numeric code used in source data (0 = placebo, 1 = treatment).
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            Self::Placebo => 0,
            Self::Treatment => 1,
        }
    }

    /// Treatment indicator used as a regression covariate.
    #[inline]
    pub const fn indicator(self) -> f64 {
        match self {
            Self::Placebo => 0.0,
            Self::Treatment => 1.0,
        }
    }

    /// Short prefix used in element names and style classes.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Placebo => "pbo",
            Self::Treatment => "rx",
        }
    }

    /// Marker class applied when markers are coloured by arm.
    pub const fn marker_class(self) -> &'static str {
        match self {
            Self::Placebo => "pbo-datum",
            Self::Treatment => "rx-datum",
        }
    }

    /// Line class applied to per-arm guide lines.
    pub const fn line_class(self) -> &'static str {
        match self {
            Self::Placebo => "pbo-line",
            Self::Treatment => "rx-line",
        }
    }
}

impl TryFrom<u8> for Arm {
    type Error = InvalidArm;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Placebo),
            1 => Ok(Self::Treatment),
            other => Err(InvalidArm(other)),
        }
    }
}

impl From<Arm> for u8 {
    fn from(arm: Arm) -> Self {
        arm.code()
    }
}

/// A treatment code other than 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidArm(pub u8);

impl fmt::Display for InvalidArm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid treatment code {} (expected 0 or 1)", self.0)
    }
}

impl std::error::Error for InvalidArm {}

/// Study visit with precomputed statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub enum Visit {
    Baseline,
    FollowUp,
}

impl Visit {
    /// Both visits in chronological order.
    pub const ALL: [Visit; 2] = [Visit::Baseline, Visit::FollowUp];

    /// Visit index as recorded in source data.
    #[inline]
    pub const fn index(self) -> u8 {
        match self {
            Self::Baseline => 0,
            Self::FollowUp => 1,
        }
    }

    /// Whether `record` was observed at this visit.
    #[inline]
    pub fn matches(self, record: &Record) -> bool {
        record.visit == self.index()
    }
}

impl TryFrom<u8> for Visit {
    type Error = InvalidVisit;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Self::Baseline),
            1 => Ok(Self::FollowUp),
            other => Err(InvalidVisit(other)),
        }
    }
}

impl From<Visit> for u8 {
    fn from(visit: Visit) -> Self {
        visit.index()
    }
}

/// A visit index without precomputed statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidVisit(pub u8);

impl fmt::Display for InvalidVisit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no statistics for visit {}", self.0)
    }
}

impl std::error::Error for InvalidVisit {}

/// One subject observation.
///
/// `dlqi` is the outcome score; `bsa`, `easi` and `itch` are the explanatory
/// measures. `visit` stays a raw index because source data may carry visits
/// the narrative never shows.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    pub subject: u32,
    pub treatment: Arm,
    pub visit: u8,
    pub dlqi: f64,
    pub bsa: f64,
    pub easi: f64,
    pub itch: f64,
}

impl Record {
    /// Scene name of this subject's marker. Subjects are unique within a
    /// visit, so the name follows the record wherever it sits in the input.
    pub fn marker_name(&self) -> String {
        format!("circle.datum-{}", self.subject)
    }
}

/// Explanatory measure plotted against the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predictor {
    /// Body-surface area.
    Bsa,
    /// Severity index (EASI).
    Redness,
    Itch,
}

impl Predictor {
    /// Every predictor in panel order.
    pub const ALL: [Predictor; 3] = [Predictor::Bsa, Predictor::Redness, Predictor::Itch];

    /// Axis label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bsa => "BSA",
            Self::Redness => "Redness",
            Self::Itch => "Itch",
        }
    }

    /// Upper end of the measure's fixed axis domain.
    pub const fn axis_max(self) -> f64 {
        match self {
            Self::Bsa => 100.0,
            Self::Redness => 60.0,
            Self::Itch => 10.0,
        }
    }

    /// Preferred tick count for the measure's axis.
    pub const fn tick_count(self) -> usize {
        match self {
            Self::Bsa => 6,
            Self::Redness => 7,
            Self::Itch => 6,
        }
    }

    /// The measure's value in `record`.
    #[inline]
    pub fn value(self, record: &Record) -> f64 {
        match self {
            Self::Bsa => record.bsa,
            Self::Redness => record.easi,
            Self::Itch => record.itch,
        }
    }
}
