use serde::{Deserialize, Serialize};

/// A game patch and the tactical changes it shipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    pub version: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub change_tags: Vec<String>,
    #[serde(default)]
    pub tactical_changes: Vec<TacticalChange>,
    #[serde(default)]
    pub known_issues: Vec<String>,
    #[serde(default)]
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacticalChange {
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub description: String,
    /// Severity label (`low`, `medium`, `high`)
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub affects_styles: Vec<String>,
    #[serde(default)]
    pub affected_tactics: Vec<String>,
}

impl Patch {
    /// Slugs named by the patch notes, first-seen order, no repeats.
    pub fn mentioned_tactics(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = Vec::new();
        for slug in self.tactical_changes.iter().flat_map(|c| c.affected_tactics.iter()) {
            if !slugs.contains(&slug.as_str()) {
                slugs.push(slug);
            }
        }
        slugs
    }
}
