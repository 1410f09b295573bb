// Catalog data model
// Mirrors the four published documents: meta, tactics, glossary, patches

pub mod glossary;
pub mod meta;
pub mod patch;
pub mod tactic;

pub use glossary::GlossaryTerm;
pub use meta::{Enums, FormationTemplate, PositionSlot, SiteConfig, SiteMeta};
pub use patch::{Patch, TacticalChange};
pub use tactic::{
    Evidence, EvidenceStats, EvidenceType, FormationDescriptor, PatchStatus, Phase,
    PhaseFormations, SlotAssignment, Tactic, TeamInstructions, Version,
};

use serde::{Deserialize, Serialize};

/// Wrapper of `tactics.json`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TacticsDocument {
    #[serde(default)]
    pub tactics: Vec<Tactic>,
}

/// Wrapper of `glossary.json`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GlossaryDocument {
    #[serde(default)]
    pub terms: Vec<GlossaryTerm>,
}

/// Wrapper of `patches.json`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatchesDocument {
    #[serde(default)]
    pub patches: Vec<Patch>,
}

/// The full catalog, as adopted by the store or persisted by the cache.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub meta: SiteMeta,
    pub tactics: Vec<Tactic>,
    pub glossary: Vec<GlossaryTerm>,
    pub patches: Vec<Patch>,
}

impl Dataset {
    pub fn from_documents(
        meta: SiteMeta,
        tactics: TacticsDocument,
        glossary: GlossaryDocument,
        patches: PatchesDocument,
    ) -> Self {
        Self { meta, tactics: tactics.tactics, glossary: glossary.terms, patches: patches.patches }
    }
}
