//! Side-by-side comparison of two tactic versions.

use std::cmp::Ordering;

use crate::models::{EvidenceStats, Phase, TeamInstructions};
use crate::stats::{format_value, Metric, STAT_CATALOG};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Both,
    OnlyA,
    OnlyB,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionEntry {
    pub instruction: String,
    pub presence: Presence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseDiff {
    pub phase: Phase,
    pub entries: Vec<InstructionEntry>,
}

/// Union of both sides' instructions per phase, tagged by who has them.
///
/// A's instructions come first, then B's that A lacks. Repeats collapse.
pub fn instruction_diff(
    a: Option<&TeamInstructions>,
    b: Option<&TeamInstructions>,
) -> Vec<PhaseDiff> {
    Phase::ALL
        .iter()
        .map(|&phase| {
            let side_a = a.map(|i| i.phase(phase)).unwrap_or(&[]);
            let side_b = b.map(|i| i.phase(phase)).unwrap_or(&[]);

            let mut entries: Vec<InstructionEntry> = Vec::new();
            for instruction in side_a.iter().chain(side_b) {
                if entries.iter().any(|e| e.instruction == *instruction) {
                    continue;
                }
                let presence = match (side_a.contains(instruction), side_b.contains(instruction)) {
                    (true, true) => Presence::Both,
                    (true, false) => Presence::OnlyA,
                    _ => Presence::OnlyB,
                };
                entries.push(InstructionEntry { instruction: instruction.clone(), presence });
            }

            PhaseDiff { phase, entries }
        })
        .collect()
}

/// Outcome for side A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Better,
    Worse,
    Even,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub metric: Metric,
    pub a: Option<f64>,
    pub b: Option<f64>,
    /// `a - b` when both sides report the metric
    pub delta: Option<f64>,
    pub verdict: Option<Verdict>,
}

impl StatRow {
    pub fn label(&self) -> &'static str {
        self.metric.spec().label
    }

    /// `+1.20`, `-3`, `0`, or `--` without a delta.
    pub fn delta_text(&self) -> String {
        let Some(delta) = self.delta else {
            return "--".to_string();
        };
        let decimals = self.metric.spec().decimals;
        match delta.partial_cmp(&0.0) {
            Some(Ordering::Greater) => format!("+{:.*}", decimals, delta),
            Some(Ordering::Less) => format!("-{:.*}", decimals, delta.abs()),
            _ => "0".to_string(),
        }
    }

    pub fn a_text(&self) -> String {
        self.a.map(|v| format_value(self.metric, v)).unwrap_or_else(|| "--".to_string())
    }

    pub fn b_text(&self) -> String {
        self.b.map(|v| format_value(self.metric, v)).unwrap_or_else(|| "--".to_string())
    }
}

/// One row per catalog metric that at least one side reports.
pub fn stat_deltas(a: Option<&EvidenceStats>, b: Option<&EvidenceStats>) -> Vec<StatRow> {
    STAT_CATALOG
        .iter()
        .filter_map(|spec| {
            let value_a = a.and_then(|s| s.get(spec.metric));
            let value_b = b.and_then(|s| s.get(spec.metric));
            if value_a.is_none() && value_b.is_none() {
                return None;
            }

            let delta = value_a.zip(value_b).map(|(x, y)| x - y);
            let verdict = delta.map(|d| {
                let d = if spec.inverted { -d } else { d };
                if d > 0.0 {
                    Verdict::Better
                } else if d < 0.0 {
                    Verdict::Worse
                } else {
                    Verdict::Even
                }
            });

            Some(StatRow { metric: spec.metric, a: value_a, b: value_b, delta, verdict })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instructions(value: serde_json::Value) -> TeamInstructions {
        serde_json::from_value(value).unwrap()
    }

    fn stats(value: serde_json::Value) -> EvidenceStats {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_instruction_diff() {
        let a = instructions(json!({
            "inPossession": ["Shorter Passing", "Play Out Of Defence", "Shorter Passing"],
            "outOfPossession": ["Higher Line"]
        }));
        let b = instructions(json!({
            "inPossession": ["Work Ball Into Box", "Shorter Passing"],
            "transition": ["Counter"]
        }));

        let diff = instruction_diff(Some(&a), Some(&b));
        assert_eq!(diff.len(), 3);

        let ip: Vec<(&str, Presence)> = diff[0]
            .entries
            .iter()
            .map(|e| (e.instruction.as_str(), e.presence))
            .collect();
        assert_eq!(diff[0].phase, Phase::InPossession);
        assert_eq!(
            ip,
            [
                ("Shorter Passing", Presence::Both),
                ("Play Out Of Defence", Presence::OnlyA),
                ("Work Ball Into Box", Presence::OnlyB),
            ]
        );

        assert_eq!(diff[1].entries[0].presence, Presence::OnlyA);
        assert_eq!(diff[2].entries[0].presence, Presence::OnlyB);
    }

    #[test]
    fn test_instruction_diff_missing_side() {
        let b = instructions(json!({ "transition": ["Regroup"] }));

        let diff = instruction_diff(None, Some(&b));
        assert!(diff[0].entries.is_empty());
        assert_eq!(diff[2].entries[0].presence, Presence::OnlyB);
    }

    #[test]
    fn test_stat_deltas_verdicts() {
        let a = stats(json!({ "ppg": 2.2, "goalsAgainst": 30, "winRate": 60 }));
        let b = stats(json!({ "ppg": 1.9, "goalsAgainst": 41, "winRate": 60, "possession": 58 }));

        let rows = stat_deltas(Some(&a), Some(&b));
        let metrics: Vec<Metric> = rows.iter().map(|r| r.metric).collect();
        assert_eq!(
            metrics,
            [Metric::Ppg, Metric::WinRate, Metric::GoalsAgainst, Metric::Possession]
        );

        assert_eq!(rows[0].verdict, Some(Verdict::Better));
        assert_eq!(rows[0].delta_text(), "+0.30");
        assert_eq!(rows[1].verdict, Some(Verdict::Even));
        assert_eq!(rows[1].delta_text(), "0");
        // fewer goals conceded is better
        assert_eq!(rows[2].verdict, Some(Verdict::Better));
        assert_eq!(rows[2].delta_text(), "-11");
        assert_eq!(rows[3].verdict, None);
        assert_eq!(rows[3].delta_text(), "--");
        assert_eq!(rows[3].a_text(), "--");
        assert_eq!(rows[3].b_text(), "58%");
    }

    #[test]
    fn test_stat_deltas_without_stats() {
        assert!(stat_deltas(None, None).is_empty());
    }
}
