//! Evidence metric catalog
//!
//! Display metadata for every metric an evidence record can carry, in the
//! order stat panels and comparisons list them.

use serde::{Deserialize, Serialize};

/// A numeric metric carried by [`EvidenceStats`](crate::models::EvidenceStats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Ppg,
    WinRate,
    GoalsFor,
    GoalsAgainst,
    GoalDifference,
    XgFor,
    XgAgainst,
    Possession,
    PassCompletion,
    ShotsFor,
    ShotsAgainst,
}

impl Metric {
    /// Field name used in the published documents.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Ppg => "ppg",
            Self::WinRate => "winRate",
            Self::GoalsFor => "goalsFor",
            Self::GoalsAgainst => "goalsAgainst",
            Self::GoalDifference => "goalDifference",
            Self::XgFor => "xGFor",
            Self::XgAgainst => "xGAgainst",
            Self::Possession => "possession",
            Self::PassCompletion => "passCompletion",
            Self::ShotsFor => "shotsFor",
            Self::ShotsAgainst => "shotsAgainst",
        }
    }

    pub fn from_key(key: &str) -> Option<Metric> {
        STAT_CATALOG.iter().map(|s| s.metric).find(|m| m.key() == key)
    }

    pub fn spec(&self) -> &'static StatSpec {
        // STAT_CATALOG lists every variant exactly once
        STAT_CATALOG
            .iter()
            .find(|s| s.metric == *self)
            .unwrap_or(&STAT_CATALOG[0])
    }
}

/// How a metric is labelled, scaled and judged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatSpec {
    pub metric: Metric,
    pub label: &'static str,
    /// Value at which a bar is drawn full width
    pub max: f64,
    pub decimals: usize,
    pub suffix: &'static str,
    /// Lower is better
    pub inverted: bool,
    /// Positive values are shown with a leading `+`
    pub signed: bool,
}

const fn stat(
    metric: Metric,
    label: &'static str,
    max: f64,
    decimals: usize,
    suffix: &'static str,
    inverted: bool,
    signed: bool,
) -> StatSpec {
    StatSpec { metric, label, max, decimals, suffix, inverted, signed }
}

pub const STAT_CATALOG: [StatSpec; 11] = [
    stat(Metric::Ppg, "Points Per Game", 3.0, 2, "", false, false),
    stat(Metric::WinRate, "Win Rate", 100.0, 0, "%", false, false),
    stat(Metric::GoalsFor, "Goals For", 120.0, 0, "", false, false),
    stat(Metric::GoalsAgainst, "Goals Against", 120.0, 0, "", true, false),
    stat(Metric::GoalDifference, "Goal Difference", 80.0, 0, "", false, true),
    stat(Metric::XgFor, "xG For", 120.0, 1, "", false, false),
    stat(Metric::XgAgainst, "xG Against", 120.0, 1, "", true, false),
    stat(Metric::Possession, "Possession", 100.0, 0, "%", false, false),
    stat(Metric::PassCompletion, "Pass Completion", 100.0, 0, "%", false, false),
    stat(Metric::ShotsFor, "Shots For", 800.0, 0, "", false, false),
    stat(Metric::ShotsAgainst, "Shots Against", 800.0, 0, "", true, false),
];

/// Bar fill percentage for a value, clamped to 100.
pub fn bar_percent(metric: Metric, value: f64) -> f64 {
    let spec = metric.spec();
    let bar_value = if spec.signed { value.abs() } else { value };
    ((bar_value / spec.max) * 100.0).min(100.0)
}

/// Format a value with the metric's precision and suffix.
pub fn format_value(metric: Metric, value: f64) -> String {
    let spec = metric.spec();
    let sign = if spec.signed && value > 0.0 { "+" } else { "" };
    format!("{}{:.*}{}", sign, spec.decimals, value, spec.suffix)
}
