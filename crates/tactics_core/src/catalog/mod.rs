//! Catalog store
//!
//! Owns the loaded dataset and its indices. Loading consults the local cache
//! first, checking it against the remote data version, and otherwise fetches
//! all four documents together.

pub mod index;

pub use index::CatalogIndex;

use chrono::Utc;

use crate::cache::{Freshness, LocalCache, Snapshot};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result, RetrievalError};
use crate::models::{
    Dataset, Evidence, FormationTemplate, GlossaryDocument, GlossaryTerm, Patch, PatchesDocument,
    SiteMeta, Tactic, TacticsDocument, Version,
};
use crate::retriever::{
    DocumentRetriever, GLOSSARY_DOCUMENT, META_DOCUMENT, PATCHES_DOCUMENT, TACTICS_DOCUMENT,
};

type Clock = Box<dyn Fn() -> u64 + Send + Sync>;

fn system_clock() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

pub struct CatalogStore {
    retriever: DocumentRetriever,
    cache: LocalCache,
    dataset: Dataset,
    index: CatalogIndex,
    loaded: bool,
    clock: Clock,
}

impl CatalogStore {
    pub fn new(retriever: DocumentRetriever, cache: LocalCache) -> Self {
        Self {
            retriever,
            cache,
            dataset: Dataset::default(),
            index: CatalogIndex::default(),
            loaded: false,
            clock: Box::new(system_clock),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> std::result::Result<Self, RetrievalError> {
        let retriever = DocumentRetriever::from_config(config)?;
        Ok(Self::new(retriever, LocalCache::from_config(config)))
    }

    /// Replace the wall clock (unix milliseconds) used for cache ages.
    pub fn with_clock(mut self, clock: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn retriever(&self) -> &DocumentRetriever {
        &self.retriever
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// Populate the store from cache or the remote documents.
    ///
    /// On failure nothing is adopted and the previous dataset stays in place.
    pub async fn load_all(&mut self) -> Result<()> {
        let now = (self.clock)();
        let mut fresh_meta: Option<SiteMeta> = None;

        if let Some(candidate) = self.cache.candidate(now) {
            let freshness = match self.retriever.retrieve::<SiteMeta>(META_DOCUMENT).await {
                Ok(meta) => {
                    let freshness = Freshness::Current(meta.data_version().to_string());
                    fresh_meta = Some(meta);
                    freshness
                }
                Err(e) => {
                    log::warn!("Version check failed: {}", e);
                    Freshness::Unavailable
                }
            };

            if let Some(snapshot) = self.cache.accept(candidate, &freshness) {
                self.adopt(snapshot.into_dataset());
                return Ok(());
            }
        }

        let dataset = self.fetch_all(fresh_meta).await?;
        self.cache.store(&Snapshot::from_dataset(&dataset, now));
        log::info!(
            "Loaded {} tactics, {} glossary terms, {} patches (data version {})",
            dataset.tactics.len(),
            dataset.glossary.len(),
            dataset.patches.len(),
            dataset.meta.data_version()
        );
        self.adopt(dataset);
        Ok(())
    }

    async fn fetch_all(&self, meta: Option<SiteMeta>) -> Result<Dataset> {
        let retriever = &self.retriever;
        let meta_fut = async move {
            match meta {
                Some(meta) => Ok(meta),
                None => retriever.retrieve::<SiteMeta>(META_DOCUMENT).await,
            }
        };

        let (meta, tactics, glossary, patches) = tokio::try_join!(
            meta_fut,
            retriever.retrieve::<TacticsDocument>(TACTICS_DOCUMENT),
            retriever.retrieve::<GlossaryDocument>(GLOSSARY_DOCUMENT),
            retriever.retrieve::<PatchesDocument>(PATCHES_DOCUMENT),
        )
        .map_err(CatalogError::from)?;

        Ok(Dataset::from_documents(meta, tactics, glossary, patches))
    }

    fn adopt(&mut self, dataset: Dataset) {
        if let Some(base) = dataset.meta.site_config.base_data_url.as_deref() {
            self.retriever.adopt_published_base(base);
        }
        self.index = CatalogIndex::build(&dataset);
        self.dataset = dataset;
        self.loaded = true;
    }

    /// Drop the loaded dataset. The persisted cache is left alone.
    pub fn reset(&mut self) {
        self.dataset = Dataset::default();
        self.index = CatalogIndex::default();
        self.loaded = false;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    pub fn tactics(&self) -> &[Tactic] {
        &self.dataset.tactics
    }

    pub fn tactic(&self, slug: &str) -> Option<&Tactic> {
        self.index.tactic_position(slug).and_then(|pos| self.dataset.tactics.get(pos))
    }

    pub fn glossary(&self) -> &[GlossaryTerm] {
        &self.dataset.glossary
    }

    pub fn glossary_term(&self, slug: &str) -> Option<&GlossaryTerm> {
        self.index.term_position(slug).and_then(|pos| self.dataset.glossary.get(pos))
    }

    pub fn patches(&self) -> &[Patch] {
        &self.dataset.patches
    }

    pub fn patch(&self, version: &str) -> Option<&Patch> {
        self.dataset.patches.iter().find(|p| p.version == version)
    }

    pub fn meta(&self) -> &SiteMeta {
        &self.dataset.meta
    }

    pub fn current_patch(&self) -> &str {
        self.dataset.meta.current_patch()
    }

    pub fn tactic_current_version<'a>(&self, tactic: &'a Tactic) -> Option<&'a Version> {
        tactic.current_version(self.current_patch())
    }

    pub fn tactic_version<'a>(&self, tactic: &'a Tactic, patch: &str) -> Option<&'a Version> {
        tactic.version(patch)
    }

    pub fn best_evidence<'a>(&self, version: &'a Version) -> Option<&'a Evidence> {
        version.best_evidence()
    }

    /// Tactics with a version for `patch`, dataset order.
    pub fn tactics_affected_by_patch(&self, patch: &str) -> Vec<&Tactic> {
        self.resolve_slugs(self.index.slugs_for_patch(patch))
    }

    /// Versioned tactics plus those named in the patch notes.
    pub fn tactics_affected_by_patch_notes(&self, patch: &str) -> Vec<&Tactic> {
        let mut slugs: Vec<&str> =
            self.index.slugs_for_patch(patch).iter().map(String::as_str).collect();
        if let Some(notes) = self.patch(patch) {
            for slug in notes.mentioned_tactics() {
                if !slugs.contains(&slug) {
                    slugs.push(slug);
                }
            }
        }
        slugs.into_iter().filter_map(|slug| self.tactic(slug)).collect()
    }

    pub fn formation_template(&self, shape: &str) -> Option<&FormationTemplate> {
        self.dataset.meta.formation_template(shape)
    }

    pub fn all_formations(&self) -> Vec<&str> {
        self.dataset.meta.formations.keys().map(String::as_str).collect()
    }

    pub fn all_style_tags(&self) -> &[String] {
        &self.dataset.meta.enums.style_tags
    }

    pub fn all_intensity_levels(&self) -> &[String] {
        &self.dataset.meta.enums.intensity_levels
    }

    pub fn all_patch_versions(&self) -> &[String] {
        &self.dataset.meta.enums.patch_versions
    }

    pub fn all_mentalities(&self) -> &[String] {
        &self.dataset.meta.enums.mentalities
    }

    pub fn all_budget_tiers(&self) -> &[String] {
        &self.dataset.meta.enums.budget_tiers
    }

    pub fn glossary_categories(&self) -> &[String] {
        &self.dataset.meta.enums.glossary_categories
    }

    pub fn duty_color(&self, duty: &str) -> &str {
        self.dataset.meta.duty_color(duty)
    }

    pub fn tactics_with_style(&self, tag: &str) -> Vec<&Tactic> {
        self.resolve_slugs(self.index.slugs_with_style(tag))
    }

    pub fn tactics_in_formation(&self, family: &str) -> Vec<&Tactic> {
        self.resolve_slugs(self.index.slugs_in_formation(family))
    }

    pub fn glossary_in_category(&self, category: &str) -> Vec<&GlossaryTerm> {
        self.index
            .terms_in_category(category)
            .iter()
            .filter_map(|slug| self.glossary_term(slug))
            .collect()
    }

    fn resolve_slugs(&self, slugs: &[String]) -> Vec<&Tactic> {
        slugs.iter().filter_map(|slug| self.tactic(slug)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStorage;
    use crate::fixtures;
    use crate::retriever::MemoryTransport;
    use std::sync::Arc;

    async fn loaded_store() -> CatalogStore {
        let transport = Arc::new(MemoryTransport::new());
        fixtures::publish(&transport, fixtures::LOCAL_BASE);
        let retriever = DocumentRetriever::new(transport, fixtures::LOCAL_BASE, fixtures::LOCAL_BASE)
            .local_only(true);
        let mut store =
            CatalogStore::new(retriever, LocalCache::new(Arc::new(MemoryStorage::new())));
        store.load_all().await.unwrap();
        store
    }

    fn slugs(tactics: Vec<&Tactic>) -> Vec<&str> {
        tactics.into_iter().map(|t| t.slug.as_str()).collect()
    }

    #[tokio::test]
    async fn test_lookups() {
        let store = loaded_store().await;

        assert!(store.is_loaded());
        assert_eq!(store.current_patch(), "26.1.0");
        assert_eq!(store.tactic("possession-433").unwrap().author, "Zealand");
        assert!(store.tactic("missing-slug").is_none());
        assert_eq!(store.glossary_term("xg").unwrap().term, "xG");
        assert_eq!(store.tactics().len(), 4);
        assert_eq!(store.patches().len(), 2);
    }

    #[tokio::test]
    async fn test_version_accessors() {
        let store = loaded_store().await;
        let tactic = store.tactic("aggressive-4231").unwrap();

        let current = store.tactic_current_version(tactic).unwrap();
        assert_eq!(current.patch_version, "26.1.0");
        assert_eq!(store.tactic_version(tactic, "26.0.2").unwrap().patch_version, "26.0.2");
        assert!(store.tactic_version(tactic, "25.4.0").is_none());

        let best = store.best_evidence(current).unwrap();
        assert_eq!(best.kind, crate::models::EvidenceType::CommunitySave);

        let possession = store.tactic("possession-433").unwrap();
        assert_eq!(store.tactic_current_version(possession).unwrap().patch_version, "26.0.2");

        let zonal = store.tactic("zonal-343").unwrap();
        assert!(store.tactic_current_version(zonal).is_none());
    }

    #[tokio::test]
    async fn test_affected_by_patch() {
        let store = loaded_store().await;

        assert_eq!(
            slugs(store.tactics_affected_by_patch("26.0.2")),
            ["aggressive-4231", "possession-433", "counter-442"]
        );
        assert_eq!(
            slugs(store.tactics_affected_by_patch("26.1.0")),
            ["aggressive-4231", "counter-442"]
        );
        assert!(store.tactics_affected_by_patch("99.0.0").is_empty());
    }

    #[tokio::test]
    async fn test_affected_by_patch_notes() {
        let store = loaded_store().await;

        assert_eq!(
            slugs(store.tactics_affected_by_patch_notes("26.1.0")),
            ["aggressive-4231", "counter-442", "zonal-343"]
        );
    }

    #[tokio::test]
    async fn test_reference_data() {
        let store = loaded_store().await;

        assert_eq!(store.all_formations(), ["4-2-3-1 Wide", "3-4-3"]);
        assert_eq!(store.all_style_tags().len(), 5);
        assert_eq!(store.glossary_categories(), ["Roles", "Duties", "Instructions", "Analytics"]);
        assert_eq!(store.duty_color("Attack"), "#e74c3c");
        assert_eq!(store.duty_color("Automatic"), "#ffffff");
        assert_eq!(store.formation_template("3-4-3").unwrap().position_slots.len(), 3);
        assert!(store.formation_template("5-3-2").is_none());
    }

    #[tokio::test]
    async fn test_index_views() {
        let store = loaded_store().await;

        assert_eq!(slugs(store.tactics_with_style("direct")), ["aggressive-4231", "zonal-343"]);
        assert_eq!(slugs(store.tactics_in_formation("4-4-2")), ["counter-442"]);
        let roles: Vec<&str> =
            store.glossary_in_category("Roles").iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(roles, ["advanced-forward"]);
    }

    #[tokio::test]
    async fn test_reset() {
        let mut store = loaded_store().await;

        store.reset();

        assert!(!store.is_loaded());
        assert!(store.tactics().is_empty());
        assert!(store.tactic("aggressive-4231").is_none());
        assert_eq!(store.current_patch(), "");
    }
}
