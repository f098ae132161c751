#![forbid(unsafe_code)]

//! Precomputed summary statistics and regression coefficients.
//!
//! Nothing here is estimated at runtime: the tables are the published
//! results the narrative illustrates.

use crate::data::{Arm, Predictor, Visit};

/// Mean of each clinical measure for one arm at one visit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStatistic {
    pub treatment: Arm,
    pub visit: Visit,
    pub dlqi: f64,
    pub bsa: f64,
    pub easi: f64,
    pub itch: f64,
}

impl SummaryStatistic {
    /// Mean of `predictor`.
    #[inline]
    pub fn mean(&self, predictor: Predictor) -> f64 {
        match predictor {
            Predictor::Bsa => self.bsa,
            Predictor::Redness => self.easi,
            Predictor::Itch => self.itch,
        }
    }
}

/// Per-arm means by visit.
pub const SUMMARY_STATISTICS: [SummaryStatistic; 4] = [
    SummaryStatistic {
        treatment: Arm::Placebo,
        visit: Visit::Baseline,
        dlqi: 16.005,
        bsa: 37.7986,
        easi: 24.12815,
        itch: 7.35945,
    },
    SummaryStatistic {
        treatment: Arm::Placebo,
        visit: Visit::FollowUp,
        dlqi: 16.245,
        bsa: 27.4341,
        easi: 17.3549,
        itch: 6.5363,
    },
    SummaryStatistic {
        treatment: Arm::Treatment,
        visit: Visit::Baseline,
        dlqi: 11.115,
        bsa: 35.39355,
        easi: 21.47455,
        itch: 5.64805,
    },
    SummaryStatistic {
        treatment: Arm::Treatment,
        visit: Visit::FollowUp,
        dlqi: 10.81,
        bsa: 24.56045,
        easi: 12.6407,
        itch: 4.7133,
    },
];

/// Row of [`SUMMARY_STATISTICS`] for exactly this arm and visit.
pub fn summary_statistic(arm: Arm, visit: Visit) -> Option<&'static SummaryStatistic> {
    SUMMARY_STATISTICS
        .iter()
        .find(|s| s.treatment == arm && s.visit == visit)
}

/// Coefficients of `outcome ~ intercept + treatment·arm + slope·x`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegressionCoefficients {
    pub intercept: f64,
    pub treatment: f64,
    pub slope: f64,
}

impl RegressionCoefficients {
    pub const fn new(intercept: f64, treatment: f64, slope: f64) -> Self {
        Self {
            intercept,
            treatment,
            slope,
        }
    }

    /// Predicted outcome for `arm` at predictor value `x`.
    #[inline]
    pub fn predict(&self, arm: Arm, x: f64) -> f64 {
        self.intercept + self.treatment * arm.indicator() + self.slope * x
    }
}

/// Coefficients indexed by `[visit][predictor]`.
const REGRESSION_TABLE: [[RegressionCoefficients; 3]; 2] = [
    [
        RegressionCoefficients::new(16.0292312, -4.8915418, -0.0006411),
        RegressionCoefficients::new(16.90054, -4.98849, -0.03712),
        RegressionCoefficients::new(2.3492, -1.7144, 1.8556),
    ],
    [
        RegressionCoefficients::new(16.2347477, -5.4339261, 0.0003737),
        RegressionCoefficients::new(16.213779, -5.426519, 0.001799),
        RegressionCoefficients::new(4.60514, -2.1886, 1.7808),
    ],
];

/// Model fitted at `visit` with `predictor` as the explanatory variable.
pub fn regression(visit: Visit, predictor: Predictor) -> RegressionCoefficients {
    let column = match predictor {
        Predictor::Bsa => 0,
        Predictor::Redness => 1,
        Predictor::Itch => 2,
    };
    REGRESSION_TABLE[usize::from(visit.index())][column]
}

/// A value for each arm.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerArm<T> {
    pub placebo: T,
    pub treatment: T,
}

impl<T: Copy> PerArm<T> {
    pub const fn new(placebo: T, treatment: T) -> Self {
        Self { placebo, treatment }
    }

    /// Value for `arm`.
    #[inline]
    pub fn get(&self, arm: Arm) -> T {
        match arm {
            Arm::Placebo => self.placebo,
            Arm::Treatment => self.treatment,
        }
    }
}

impl PerArm<f64> {
    /// Midpoint of the two arm values.
    #[inline]
    pub fn midpoint(&self) -> f64 {
        (self.placebo + self.treatment) / 2.0
    }
}

/// The handful of numbers the scrolling narrative draws.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NarrativeStats {
    /// Mean outcome per arm.
    pub outcome: PerArm<f64>,
    /// Mean itch per arm.
    pub itch: PerArm<f64>,
    /// Outcome regressed on treatment and itch.
    pub model: RegressionCoefficients,
}

impl NarrativeStats {
    pub const fn new(outcome: PerArm<f64>, itch: PerArm<f64>, model: RegressionCoefficients) -> Self {
        Self {
            outcome,
            itch,
            model,
        }
    }

    /// Statistics for `visit` from the precomputed tables.
    pub fn for_visit(visit: Visit) -> Option<Self> {
        let pbo = summary_statistic(Arm::Placebo, visit)?;
        let rx = summary_statistic(Arm::Treatment, visit)?;
        Some(Self::new(
            PerArm::new(pbo.dlqi, rx.dlqi),
            PerArm::new(pbo.itch, rx.itch),
            regression(visit, Predictor::Itch),
        ))
    }

    /// Midpoint of the two arm outcome means.
    pub fn outcome_midpoint(&self) -> f64 {
        self.outcome.midpoint()
    }

    /// Midpoint of the two arm itch means.
    pub fn itch_midpoint(&self) -> f64 {
        self.itch.midpoint()
    }

    /// Model prediction for `arm` at itch value `itch`.
    pub fn predicted(&self, arm: Arm, itch: f64) -> f64 {
        self.model.predict(arm, itch)
    }
}
