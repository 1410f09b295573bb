//! Tactic, Version and Evidence records as published in `tactics.json`.

use serde::{Deserialize, Serialize};

use crate::stats::Metric;

/// A named, versioned tactical preset.
///
/// Replaced wholesale on every catalog load; never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tactic {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_url: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub formation_family: String,
    #[serde(default)]
    pub primary_style: String,
    #[serde(default)]
    pub style_tags: Vec<String>,
    #[serde(default)]
    pub intensity: Option<String>,
    #[serde(default)]
    pub mentality: Option<String>,
    #[serde(default)]
    pub budget_tier: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub updated_date: String,
    #[serde(default)]
    pub squad_requirements: Vec<String>,
    #[serde(default)]
    pub related_tactics: Vec<String>,
    #[serde(default)]
    pub glossary_terms: Vec<String>,
    #[serde(default)]
    pub best_against: Vec<String>,
    #[serde(default)]
    pub known_counters: Vec<String>,
    #[serde(default)]
    pub versions: Vec<Version>,
}

impl Tactic {
    /// Exact lookup of the version published for `patch_version`.
    pub fn version(&self, patch_version: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.patch_version == patch_version)
    }

    pub fn has_version(&self, patch_version: &str) -> bool {
        self.version(patch_version).is_some()
    }

    /// Version for `current_patch`, else the first version, else none.
    pub fn current_version(&self, current_patch: &str) -> Option<&Version> {
        self.version(current_patch).or_else(|| self.versions.first())
    }

    pub fn has_any_style(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| self.style_tags.contains(tag))
    }

    /// Card blurb: short description when present.
    pub fn summary(&self) -> &str {
        self.short_description
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.description)
    }

    /// Lowercased text searched by free-text queries.
    pub(crate) fn search_haystack(&self) -> String {
        let mut parts: Vec<&str> = vec![
            self.name.as_str(),
            self.author.as_str(),
            self.description.as_str(),
            self.short_description.as_deref().unwrap_or(""),
            self.formation_family.as_str(),
            self.primary_style.as_str(),
        ];
        parts.extend(self.style_tags.iter().map(String::as_str));
        parts.retain(|p| !p.is_empty());
        parts.join(" ").to_lowercase()
    }

    /// Patch versions that appear more than once in this tactic.
    pub fn duplicate_patch_versions(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();
        for version in &self.versions {
            if !seen.insert(version.patch_version.as_str())
                && !duplicates.contains(&version.patch_version.as_str())
            {
                duplicates.push(version.patch_version.as_str());
            }
        }
        duplicates
    }
}

/// Verification state of a tactic on one patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchStatus {
    Verified,
    Outdated,
    Untested,
    #[serde(other)]
    Unknown,
}

impl PatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Verified => "Verified",
            Self::Outdated => "Outdated",
            Self::Untested | Self::Unknown => "Untested",
        }
    }

    pub fn parse(value: &str) -> Option<PatchStatus> {
        match value {
            "verified" => Some(Self::Verified),
            "outdated" => Some(Self::Outdated),
            "untested" => Some(Self::Untested),
            _ => None,
        }
    }
}

/// Patch-specific configuration and track record of a tactic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub patch_version: String,
    /// Absent when the document publishes no status
    #[serde(default)]
    pub patch_status: Option<PatchStatus>,
    #[serde(default)]
    pub formation: PhaseFormations,
    #[serde(default)]
    pub team_instructions: TeamInstructions,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
}

impl Version {
    /// Display label; versions without a status read as untested.
    pub fn status_label(&self) -> &'static str {
        self.patch_status.map_or(PatchStatus::Untested.label(), |s| s.label())
    }

    /// Most rigorous evidence on record.
    ///
    /// Tries each tier of [`EvidenceType::PRIORITY`] in turn; when nothing
    /// matches a tier, the first record is returned.
    pub fn best_evidence(&self) -> Option<&Evidence> {
        EvidenceType::PRIORITY
            .iter()
            .find_map(|kind| self.evidence.iter().find(|e| e.kind == *kind))
            .or_else(|| self.evidence.first())
    }

    /// First evidence record in published order.
    pub fn top_evidence(&self) -> Option<&Evidence> {
        self.evidence.first()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseFormations {
    #[serde(default)]
    pub in_possession: Option<FormationDescriptor>,
    #[serde(default)]
    pub out_of_possession: Option<FormationDescriptor>,
}

/// A named shape plus role/duty assignments for its slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormationDescriptor {
    pub shape: String,
    #[serde(default)]
    pub positions: Vec<SlotAssignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAssignment {
    pub slot_id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub duty: String,
}

/// Match phase used for instructions and formations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    InPossession,
    OutOfPossession,
    Transition,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::InPossession, Phase::OutOfPossession, Phase::Transition];

    pub fn label(&self) -> &'static str {
        match self {
            Self::InPossession => "In Possession",
            Self::OutOfPossession => "Out of Possession",
            Self::Transition => "Transition",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInstructions {
    #[serde(default)]
    pub in_possession: Vec<String>,
    #[serde(default)]
    pub out_of_possession: Vec<String>,
    #[serde(default)]
    pub transition: Vec<String>,
}

impl TeamInstructions {
    pub fn phase(&self, phase: Phase) -> &[String] {
        match phase {
            Phase::InPossession => &self.in_possession,
            Phase::OutOfPossession => &self.out_of_possession,
            Phase::Transition => &self.transition,
        }
    }
}

/// Rigor class of an evidence record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvidenceType {
    StandardizedTest,
    CommunitySave,
    CuratedReview,
    CreatorClaim,
    #[default]
    #[serde(other)]
    Other,
}

impl EvidenceType {
    /// Most rigorous first.
    pub const PRIORITY: [EvidenceType; 4] = [
        EvidenceType::StandardizedTest,
        EvidenceType::CommunitySave,
        EvidenceType::CuratedReview,
        EvidenceType::CreatorClaim,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::StandardizedTest => "standardized test",
            Self::CommunitySave => "community save",
            Self::CuratedReview => "curated review",
            Self::CreatorClaim => "creator claim",
            Self::Other => "other",
        }
    }
}

/// One performance claim for a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    #[serde(default, rename = "type")]
    pub kind: EvidenceType,
    #[serde(default)]
    pub match_count: Option<u32>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub stats: EvidenceStats,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceStats {
    #[serde(default)]
    pub ppg: Option<f64>,
    #[serde(default)]
    pub win_rate: Option<f64>,
    #[serde(default)]
    pub goals_for: Option<f64>,
    #[serde(default)]
    pub goals_against: Option<f64>,
    #[serde(default)]
    pub goal_difference: Option<f64>,
    #[serde(default, rename = "xGFor")]
    pub xg_for: Option<f64>,
    #[serde(default, rename = "xGAgainst")]
    pub xg_against: Option<f64>,
    #[serde(default)]
    pub possession: Option<f64>,
    #[serde(default)]
    pub pass_completion: Option<f64>,
    #[serde(default)]
    pub shots_for: Option<f64>,
    #[serde(default)]
    pub shots_against: Option<f64>,
}

impl EvidenceStats {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Ppg => self.ppg,
            Metric::WinRate => self.win_rate,
            Metric::GoalsFor => self.goals_for,
            Metric::GoalsAgainst => self.goals_against,
            Metric::GoalDifference => self.goal_difference,
            Metric::XgFor => self.xg_for,
            Metric::XgAgainst => self.xg_against,
            Metric::Possession => self.possession,
            Metric::PassCompletion => self.pass_completion,
            Metric::ShotsFor => self.shots_for,
            Metric::ShotsAgainst => self.shots_against,
        }
    }
}
