//! Preference-driven tactic recommendations.

use crate::models::Tactic;
use crate::search::{filter_tactics, sort_tactics, SortKey, TacticCriteria};

/// Answers to the recommendation questions. Empty means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub formation: String,
    pub style: String,
    pub intensity: String,
    pub budget: String,
}

impl Preferences {
    pub fn criteria(&self) -> TacticCriteria {
        TacticCriteria {
            formation: self.formation.clone(),
            style_tags: if self.style.is_empty() { Vec::new() } else { vec![self.style.clone()] },
            intensity: self.intensity.clone(),
            budget_tier: self.budget.clone(),
            ..TacticCriteria::default()
        }
    }

    /// Chosen values joined with ` / `, e.g. `4-3-3 / possession`.
    pub fn summary(&self) -> String {
        [&self.formation, &self.style, &self.intensity, &self.budget]
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Matching tactics, best points-per-game first.
pub fn recommend<'a>(
    tactics: &'a [Tactic],
    prefs: &Preferences,
    current_patch: &str,
) -> Vec<&'a Tactic> {
    let matches = filter_tactics(tactics, &prefs.criteria());
    sort_tactics(&matches, &SortKey::Ppg, current_patch)
}

pub fn count_matches(tactics: &[Tactic], prefs: &Preferences) -> usize {
    let criteria = prefs.criteria();
    tactics.iter().filter(|t| criteria.matches(t)).count()
}
