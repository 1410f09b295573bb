use std::collections::HashMap;

use crate::models::Dataset;

/// Lookup tables derived from a [`Dataset`].
///
/// Positions refer into the dataset's vectors. Lists keep dataset order.
/// Always rebuilt wholesale; never updated in place.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    pub(crate) tactic_by_slug: HashMap<String, usize>,
    pub(crate) tactics_by_style: HashMap<String, Vec<String>>,
    pub(crate) tactics_by_formation: HashMap<String, Vec<String>>,
    pub(crate) tactics_by_patch: HashMap<String, Vec<String>>,
    pub(crate) term_by_slug: HashMap<String, usize>,
    pub(crate) terms_by_category: HashMap<String, Vec<String>>,
}

impl CatalogIndex {
    pub fn build(dataset: &Dataset) -> Self {
        let mut index = Self::default();

        for (pos, tactic) in dataset.tactics.iter().enumerate() {
            if index.tactic_by_slug.insert(tactic.slug.clone(), pos).is_some() {
                log::warn!("Duplicate tactic slug {}, keeping the later entry", tactic.slug);
            }

            for tag in &tactic.style_tags {
                push_unique(&mut index.tactics_by_style, tag, &tactic.slug);
            }

            if !tactic.formation_family.is_empty() {
                push_unique(&mut index.tactics_by_formation, &tactic.formation_family, &tactic.slug);
            }

            for duplicate in tactic.duplicate_patch_versions() {
                log::warn!(
                    "Tactic {} lists patch {} more than once, using the first",
                    tactic.slug,
                    duplicate
                );
            }
            for version in &tactic.versions {
                push_unique(&mut index.tactics_by_patch, &version.patch_version, &tactic.slug);
            }
        }

        for (pos, term) in dataset.glossary.iter().enumerate() {
            index.term_by_slug.insert(term.slug.clone(), pos);
            push_unique(&mut index.terms_by_category, &term.category, &term.slug);
        }

        log::debug!(
            "Indexed {} tactics, {} glossary terms, {} patch versions",
            index.tactic_by_slug.len(),
            index.term_by_slug.len(),
            index.tactics_by_patch.len()
        );
        index
    }

    pub fn tactic_position(&self, slug: &str) -> Option<usize> {
        self.tactic_by_slug.get(slug).copied()
    }

    pub fn term_position(&self, slug: &str) -> Option<usize> {
        self.term_by_slug.get(slug).copied()
    }

    pub fn slugs_with_style(&self, tag: &str) -> &[String] {
        lookup(&self.tactics_by_style, tag)
    }

    pub fn slugs_in_formation(&self, family: &str) -> &[String] {
        lookup(&self.tactics_by_formation, family)
    }

    pub fn slugs_for_patch(&self, patch_version: &str) -> &[String] {
        lookup(&self.tactics_by_patch, patch_version)
    }

    pub fn terms_in_category(&self, category: &str) -> &[String] {
        lookup(&self.terms_by_category, category)
    }
}

fn push_unique(map: &mut HashMap<String, Vec<String>>, key: &str, slug: &str) {
    let slugs = map.entry(key.to_string()).or_default();
    if !slugs.iter().any(|s| s == slug) {
        slugs.push(slug.to_string());
    }
}

fn lookup<'a>(map: &'a HashMap<String, Vec<String>>, key: &str) -> &'a [String] {
    map.get(key).map(Vec::as_slice).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::models::Tactic;
    use serde_json::json;

    #[test]
    fn test_index_keeps_dataset_order() {
        let index = CatalogIndex::build(&fixtures::dataset());

        assert_eq!(index.slugs_for_patch("26.0.2"), ["aggressive-4231", "possession-433", "counter-442"]);
        assert_eq!(index.slugs_with_style("gegenpress"), ["aggressive-4231", "zonal-343"]);
        assert_eq!(index.terms_in_category("Instructions"), ["gegenpress", "pressing-intensity"]);
        assert!(index.slugs_with_style("tiki-taka").is_empty());
    }

    #[test]
    fn test_duplicate_patch_version_indexed_once() {
        let tactic: Tactic = serde_json::from_value(json!({
            "slug": "dup",
            "name": "Dup",
            "versions": [{ "patchVersion": "26.0.1" }, { "patchVersion": "26.0.1" }]
        }))
        .unwrap();
        let dataset = Dataset { tactics: vec![tactic], ..Dataset::default() };

        let index = CatalogIndex::build(&dataset);
        assert_eq!(index.slugs_for_patch("26.0.1"), ["dup"]);
    }

    #[test]
    fn test_duplicate_slug_last_wins() {
        let first: Tactic =
            serde_json::from_value(json!({ "slug": "same", "name": "First" })).unwrap();
        let second: Tactic =
            serde_json::from_value(json!({ "slug": "same", "name": "Second" })).unwrap();
        let dataset = Dataset { tactics: vec![first, second], ..Dataset::default() };

        let index = CatalogIndex::build(&dataset);
        assert_eq!(index.tactic_position("same"), Some(1));
    }

    #[test]
    fn test_empty_formation_not_indexed() {
        let tactic: Tactic =
            serde_json::from_value(json!({ "slug": "blank", "name": "Blank" })).unwrap();
        let dataset = Dataset { tactics: vec![tactic], ..Dataset::default() };

        let index = CatalogIndex::build(&dataset);
        assert!(index.slugs_in_formation("").is_empty());
    }
}
