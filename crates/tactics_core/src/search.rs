//! In-memory faceted search over tactics and glossary terms.
//!
//! Everything here is pure: inputs are borrowed, never reordered in place.

use chrono::{DateTime, NaiveDate};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::str::FromStr;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{GlossaryTerm, PatchStatus, Tactic};
use crate::stats::Metric;

/// Category value meaning "no category constraint".
pub const ALL_CATEGORIES: &str = "All";

/// Conjunctive tactic filter. Empty strings and `None` impose nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TacticCriteria {
    pub query: String,
    pub formation: String,
    /// Any-of match; empty means no constraint
    pub style_tags: Vec<String>,
    pub intensity: String,
    pub mentality: String,
    pub budget_tier: String,
    pub status: String,
    pub patch_version: Option<String>,
    /// Only evaluated together with `patch_version`
    pub patch_status: Option<PatchStatus>,
}

impl TacticCriteria {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, tactic: &Tactic) -> bool {
        if !self.query.is_empty()
            && !tactic.search_haystack().contains(&self.query.to_lowercase())
        {
            return false;
        }

        if !self.formation.is_empty() && tactic.formation_family != self.formation {
            return false;
        }

        if !self.style_tags.is_empty() && !tactic.has_any_style(&self.style_tags) {
            return false;
        }

        if !facet_matches(&self.intensity, tactic.intensity.as_deref())
            || !facet_matches(&self.mentality, tactic.mentality.as_deref())
            || !facet_matches(&self.budget_tier, tactic.budget_tier.as_deref())
            || !facet_matches(&self.status, tactic.status.as_deref())
        {
            return false;
        }

        if let Some(patch) = self.patch_version.as_deref().filter(|p| !p.is_empty()) {
            let Some(version) = tactic.version(patch) else {
                return false;
            };
            if let Some(status) = self.patch_status {
                if version.patch_status != Some(status) {
                    return false;
                }
            }
        }

        true
    }
}

fn facet_matches(wanted: &str, actual: Option<&str>) -> bool {
    wanted.is_empty() || actual == Some(wanted)
}

/// Tactics satisfying every criterion, in input order.
pub fn filter_tactics<'a, I>(tactics: I, criteria: &TacticCriteria) -> Vec<&'a Tactic>
where
    I: IntoIterator<Item = &'a Tactic>,
{
    tactics.into_iter().filter(|t| criteria.matches(t)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    NameAsc,
    NameDesc,
    Newest,
    Oldest,
    Ppg,
    WinRate,
    /// Unrecognized key; leaves the order untouched
    Unknown(String),
}

impl SortKey {
    pub fn as_str(&self) -> &str {
        match self {
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::Ppg => "ppg",
            SortKey::WinRate => "win-rate",
            SortKey::Unknown(key) => key,
        }
    }
}

impl FromStr for SortKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "name-asc" => SortKey::NameAsc,
            "name-desc" => SortKey::NameDesc,
            "newest" => SortKey::Newest,
            "oldest" => SortKey::Oldest,
            "ppg" => SortKey::Ppg,
            "win-rate" => SortKey::WinRate,
            other => SortKey::Unknown(other.to_string()),
        })
    }
}

/// Lowercased base letters: `Ángel` and `angel` share a key.
fn collation_key(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase).collect()
}

/// Base letters first, then case-insensitive with accents, then exact.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| {
            let lower_a = a.chars().flat_map(char::to_lowercase);
            let lower_b = b.chars().flat_map(char::to_lowercase);
            lower_a.cmp(lower_b)
        })
        .then_with(|| a.cmp(b))
}

/// `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_updated_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Headline value of `metric`: first evidence of the current (or first) version.
pub fn top_stat(tactic: &Tactic, current_patch: &str, metric: Metric) -> f64 {
    tactic
        .current_version(current_patch)
        .and_then(|v| v.top_evidence())
        .and_then(|e| e.stats.get(metric))
        .unwrap_or(0.0)
}

/// A sorted copy; ties keep input order.
pub fn sort_tactics<'a>(
    tactics: &[&'a Tactic],
    key: &SortKey,
    current_patch: &str,
) -> Vec<&'a Tactic> {
    let mut sorted = tactics.to_vec();
    match key {
        SortKey::NameAsc => sorted.sort_by(|a, b| locale_cmp(&a.name, &b.name)),
        SortKey::NameDesc => sorted.sort_by(|a, b| locale_cmp(&b.name, &a.name)),
        SortKey::Newest => {
            sorted.sort_by_key(|t| std::cmp::Reverse(parse_updated_date(&t.updated_date)))
        }
        SortKey::Oldest => sorted.sort_by_key(|t| parse_updated_date(&t.updated_date)),
        SortKey::Ppg => sort_by_stat(&mut sorted, current_patch, Metric::Ppg),
        SortKey::WinRate => sort_by_stat(&mut sorted, current_patch, Metric::WinRate),
        SortKey::Unknown(other) => log::debug!("Unknown sort key {}, keeping order", other),
    }
    sorted
}

fn sort_by_stat(tactics: &mut [&Tactic], current_patch: &str, metric: Metric) {
    tactics.sort_by(|a, b| {
        top_stat(b, current_patch, metric).total_cmp(&top_stat(a, current_patch, metric))
    });
}

/// Glossary terms in `category` (or any, for `All`/empty) matching `query`.
pub fn filter_glossary<'a>(
    terms: &'a [GlossaryTerm],
    query: &str,
    category: &str,
) -> Vec<&'a GlossaryTerm> {
    let query = query.to_lowercase();
    terms
        .iter()
        .filter(|t| category.is_empty() || category == ALL_CATEGORIES || t.category == category)
        .filter(|t| query.is_empty() || t.search_haystack().contains(&query))
        .collect()
}

/// Value occurrence counts per facet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCounts {
    pub formations: BTreeMap<String, usize>,
    pub style_tags: BTreeMap<String, usize>,
    pub intensities: BTreeMap<String, usize>,
    pub patches: BTreeMap<String, usize>,
    pub budget_tiers: BTreeMap<String, usize>,
    pub mentalities: BTreeMap<String, usize>,
}

fn bump(map: &mut BTreeMap<String, usize>, value: &str) {
    *map.entry(value.to_string()).or_insert(0) += 1;
}

pub fn filter_counts<'a, I>(tactics: I) -> FilterCounts
where
    I: IntoIterator<Item = &'a Tactic>,
{
    let mut counts = FilterCounts::default();
    for tactic in tactics {
        if !tactic.formation_family.is_empty() {
            bump(&mut counts.formations, &tactic.formation_family);
        }
        for tag in &tactic.style_tags {
            bump(&mut counts.style_tags, tag);
        }
        if let Some(intensity) = tactic.intensity.as_deref().filter(|s| !s.is_empty()) {
            bump(&mut counts.intensities, intensity);
        }
        for version in &tactic.versions {
            bump(&mut counts.patches, &version.patch_version);
        }
        if let Some(tier) = tactic.budget_tier.as_deref().filter(|s| !s.is_empty()) {
            bump(&mut counts.budget_tiers, tier);
        }
        if let Some(mentality) = tactic.mentality.as_deref().filter(|s| !s.is_empty()) {
            bump(&mut counts.mentalities, mentality);
        }
    }
    counts
}

/// Lightweight picker search over name, author, formation and style.
pub fn quick_search<'a>(tactics: &'a [Tactic], query: &str) -> Vec<&'a Tactic> {
    let query = query.to_lowercase();
    tactics
        .iter()
        .filter(|t| {
            query.is_empty()
                || [
                    t.name.as_str(),
                    t.author.as_str(),
                    t.formation_family.as_str(),
                    t.primary_style.as_str(),
                ]
                    .join(" ")
                    .to_lowercase()
                    .contains(&query)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::models::Dataset;

    fn slugs(tactics: &[&Tactic]) -> Vec<String> {
        tactics.iter().map(|t| t.slug.clone()).collect()
    }

    fn sorted(dataset: &Dataset, key: &str) -> Vec<String> {
        let all: Vec<&Tactic> = dataset.tactics.iter().collect();
        let key: SortKey = key.parse().unwrap();
        slugs(&sort_tactics(&all, &key, dataset.meta.current_patch()))
    }

    fn tactic(value: serde_json::Value) -> Tactic {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_criteria_keep_everything() {
        let dataset = fixtures::dataset();
        let criteria = TacticCriteria::default();
        let input: Vec<String> = dataset.tactics.iter().map(|t| t.slug.clone()).collect();

        assert!(criteria.is_empty());
        let matches = filter_tactics(&dataset.tactics, &criteria);
        assert_eq!(matches.len(), dataset.tactics.len());
        assert_eq!(slugs(&matches), input);
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let dataset = fixtures::dataset();
        let criteria = TacticCriteria { query: "KNAP".to_string(), ..Default::default() };

        assert_eq!(
            slugs(&filter_tactics(&dataset.tactics, &criteria)),
            ["aggressive-4231", "zonal-343"]
        );

        let criteria = TacticCriteria { query: "front-foot".to_string(), ..Default::default() };
        assert_eq!(slugs(&filter_tactics(&dataset.tactics, &criteria)), ["aggressive-4231"]);
    }

    #[test]
    fn test_style_tags_match_any() {
        let dataset = fixtures::dataset();
        let criteria = TacticCriteria {
            style_tags: vec!["gegenpress".to_string(), "counter".to_string()],
            ..Default::default()
        };

        assert_eq!(
            slugs(&filter_tactics(&dataset.tactics, &criteria)),
            ["aggressive-4231", "counter-442", "zonal-343"]
        );
    }

    #[test]
    fn test_facets_combine_with_and() {
        let dataset = fixtures::dataset();
        let criteria = TacticCriteria {
            budget_tier: "mid".to_string(),
            intensity: "extreme".to_string(),
            ..Default::default()
        };
        assert_eq!(slugs(&filter_tactics(&dataset.tactics, &criteria)), ["zonal-343"]);

        let criteria = TacticCriteria {
            formation: "4-4-2".to_string(),
            status: "active".to_string(),
            ..Default::default()
        };
        assert!(filter_tactics(&dataset.tactics, &criteria).is_empty());
    }

    #[test]
    fn test_missing_facet_value_never_matches() {
        let dataset = fixtures::dataset();
        let criteria = TacticCriteria { status: "active".to_string(), ..Default::default() };

        assert_eq!(
            slugs(&filter_tactics(&dataset.tactics, &criteria)),
            ["aggressive-4231", "possession-433"]
        );
    }

    #[test]
    fn test_patch_version_and_status() {
        let dataset = fixtures::dataset();
        let mut criteria =
            TacticCriteria { patch_version: Some("26.1.0".to_string()), ..Default::default() };
        assert_eq!(
            slugs(&filter_tactics(&dataset.tactics, &criteria)),
            ["aggressive-4231", "counter-442"]
        );

        criteria.patch_status = Some(PatchStatus::Verified);
        assert_eq!(slugs(&filter_tactics(&dataset.tactics, &criteria)), ["aggressive-4231"]);

        // status alone is not evaluated
        let criteria =
            TacticCriteria { patch_status: Some(PatchStatus::Outdated), ..Default::default() };
        assert_eq!(filter_tactics(&dataset.tactics, &criteria).len(), 4);
    }

    #[test]
    fn test_untested_filter_skips_versions_without_status() {
        let tactics = vec![
            tactic(serde_json::json!({
                "slug": "unlabelled",
                "versions": [{ "patchVersion": "26.1.0" }]
            })),
            tactic(serde_json::json!({
                "slug": "untested",
                "versions": [{ "patchVersion": "26.1.0", "patchStatus": "untested" }]
            })),
        ];
        let criteria = TacticCriteria {
            patch_version: Some("26.1.0".to_string()),
            patch_status: Some(PatchStatus::Untested),
            ..Default::default()
        };

        assert_eq!(slugs(&filter_tactics(&tactics, &criteria)), ["untested"]);
    }

    #[test]
    fn test_name_sorts() {
        let dataset = fixtures::dataset();

        assert_eq!(
            sorted(&dataset, "name-asc"),
            ["aggressive-4231", "counter-442", "possession-433", "zonal-343"]
        );
        assert_eq!(
            sorted(&dataset, "name-desc"),
            ["zonal-343", "possession-433", "counter-442", "aggressive-4231"]
        );
    }

    #[test]
    fn test_name_asc_is_idempotent() {
        let dataset = fixtures::dataset();
        let input: Vec<&Tactic> = dataset.tactics.iter().rev().collect();

        let once = sort_tactics(&input, &SortKey::NameAsc, "26.1.0");
        let twice = sort_tactics(&once, &SortKey::NameAsc, "26.1.0");

        assert_eq!(slugs(&twice), slugs(&once));
    }

    #[test]
    fn test_name_sort_ignores_accents() {
        let tactics = vec![
            tactic(serde_json::json!({ "slug": "zonal", "name": "Zonal 3-4-3" })),
            tactic(serde_json::json!({ "slug": "angel", "name": "Ángel 4-4-2" })),
            tactic(serde_json::json!({ "slug": "anchor", "name": "anchor 4-1-4-1" })),
        ];
        let input: Vec<&Tactic> = tactics.iter().collect();

        let sorted = sort_tactics(&input, &SortKey::NameAsc, "");
        assert_eq!(slugs(&sorted), ["anchor", "angel", "zonal"]);

        assert_eq!(locale_cmp("angel", "Ángel"), Ordering::Less);
        assert_eq!(locale_cmp("Angel", "angel"), Ordering::Less);
    }

    #[test]
    fn test_date_sorts_put_unparseable_last_when_newest() {
        let dataset = fixtures::dataset();

        assert_eq!(
            sorted(&dataset, "newest"),
            ["aggressive-4231", "counter-442", "possession-433", "zonal-343"]
        );
        assert_eq!(
            sorted(&dataset, "oldest"),
            ["zonal-343", "possession-433", "counter-442", "aggressive-4231"]
        );
    }

    #[test]
    fn test_stat_sorts_use_first_evidence() {
        let dataset = fixtures::dataset();

        // creator claim (2.6) is listed first, ahead of the community save
        assert_eq!(
            sorted(&dataset, "ppg"),
            ["aggressive-4231", "possession-433", "counter-442", "zonal-343"]
        );
        assert_eq!(
            sorted(&dataset, "win-rate"),
            ["aggressive-4231", "possession-433", "counter-442", "zonal-343"]
        );
    }

    #[test]
    fn test_unknown_sort_key_keeps_order() {
        let dataset = fixtures::dataset();
        let key: SortKey = "popularity".parse().unwrap();

        assert_eq!(key, SortKey::Unknown("popularity".to_string()));
        assert_eq!(
            sorted(&dataset, "popularity"),
            ["aggressive-4231", "possession-433", "counter-442", "zonal-343"]
        );
    }

    #[test]
    fn test_sort_does_not_touch_input() {
        let dataset = fixtures::dataset();
        let input: Vec<&Tactic> = dataset.tactics.iter().rev().collect();

        let _ = sort_tactics(&input, &SortKey::NameAsc, "26.1.0");

        assert_eq!(input[0].slug, "zonal-343");
    }

    #[test]
    fn test_locale_cmp() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("Alpha", "alpha"), Ordering::Less);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_parse_updated_date() {
        assert_eq!(parse_updated_date("2026-01-15"), NaiveDate::from_ymd_opt(2026, 1, 15));
        assert_eq!(
            parse_updated_date("2026-01-15T10:00:00Z"),
            NaiveDate::from_ymd_opt(2026, 1, 15)
        );
        assert_eq!(parse_updated_date("not-a-date"), None);
        assert_eq!(parse_updated_date(""), None);
    }

    #[test]
    fn test_filter_glossary() {
        let dataset = fixtures::dataset();
        let terms = &dataset.glossary;

        let found: Vec<&str> =
            filter_glossary(terms, "counter-press", "All").iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(found, ["gegenpress"]);

        let found: Vec<&str> =
            filter_glossary(terms, "attack duty", "").iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(found, ["advanced-forward"]);

        assert_eq!(filter_glossary(terms, "", "Instructions").len(), 2);
        assert!(filter_glossary(terms, "xg", "Roles").is_empty());
        assert_eq!(filter_glossary(terms, "", ALL_CATEGORIES).len(), 4);
    }

    #[test]
    fn test_filter_counts() {
        let dataset = fixtures::dataset();
        let counts = filter_counts(&dataset.tactics);

        assert_eq!(counts.patches["26.1.0"], 2);
        assert_eq!(counts.patches["26.0.2"], 3);
        assert_eq!(counts.style_tags["gegenpress"], 2);
        assert_eq!(counts.style_tags["direct"], 2);
        assert_eq!(counts.style_tags["low-block"], 1);
        assert_eq!(counts.budget_tiers["mid"], 2);
        assert_eq!(counts.formations.len(), 4);
        assert_eq!(counts.mentalities["cautious"], 1);
    }

    #[test]
    fn test_quick_search() {
        let dataset = fixtures::dataset();

        assert_eq!(quick_search(&dataset.tactics, "").len(), 4);
        assert_eq!(slugs(&quick_search(&dataset.tactics, "bernard")), ["counter-442"]);
        // descriptions are not searched
        assert!(quick_search(&dataset.tactics, "back three").is_empty());
    }
}
