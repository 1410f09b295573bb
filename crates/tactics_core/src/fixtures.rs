//! Shared test data: a small published catalog.

use crate::models::{Dataset, GlossaryDocument, PatchesDocument, SiteMeta, TacticsDocument};
use crate::retriever::{
    join_location, MemoryTransport, GLOSSARY_DOCUMENT, META_DOCUMENT, PATCHES_DOCUMENT,
    TACTICS_DOCUMENT,
};

pub const META: &str = include_str!("../tests/fixtures/meta.json");
pub const TACTICS: &str = include_str!("../tests/fixtures/tactics.json");
pub const GLOSSARY: &str = include_str!("../tests/fixtures/glossary.json");
pub const PATCHES: &str = include_str!("../tests/fixtures/patches.json");

pub const LOCAL_BASE: &str = "./data";

pub fn dataset() -> Dataset {
    let meta: SiteMeta = serde_json::from_str(META).unwrap();
    let tactics: TacticsDocument = serde_json::from_str(TACTICS).unwrap();
    let glossary: GlossaryDocument = serde_json::from_str(GLOSSARY).unwrap();
    let patches: PatchesDocument = serde_json::from_str(PATCHES).unwrap();
    Dataset::from_documents(meta, tactics, glossary, patches)
}

/// Serve all four documents under `base`.
pub fn publish(transport: &MemoryTransport, base: &str) {
    for (name, body) in [
        (META_DOCUMENT, META),
        (TACTICS_DOCUMENT, TACTICS),
        (GLOSSARY_DOCUMENT, GLOSSARY),
        (PATCHES_DOCUMENT, PATCHES),
    ] {
        transport.insert(join_location(base, name), body);
    }
}
