//! Site configuration and reference data (`meta.json`).

use serde::{Deserialize, Deserializer, Serialize};
use indexmap::IndexMap;

/// Data-version tag assumed when the document does not carry one.
pub const DEFAULT_DATA_VERSION: &str = "1";

/// Default pitch colour for duties without an entry in `dutyColors`.
pub const DEFAULT_DUTY_COLOR: &str = "#ffffff";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMeta {
    #[serde(default)]
    pub site_config: SiteConfig,
    #[serde(default)]
    pub enums: Enums,
    /// Shape name → slot layout, in published order
    #[serde(default)]
    pub formations: IndexMap<String, FormationTemplate>,
    /// Duty name → display colour
    #[serde(default)]
    pub duty_colors: IndexMap<String, String>,
}

impl SiteMeta {
    pub fn current_patch(&self) -> &str {
        &self.site_config.current_patch
    }

    pub fn data_version(&self) -> &str {
        &self.site_config.data_version
    }

    pub fn formation_template(&self, shape: &str) -> Option<&FormationTemplate> {
        self.formations.get(shape)
    }

    pub fn duty_color(&self, duty: &str) -> &str {
        self.duty_colors.get(duty).map(String::as_str).unwrap_or(DEFAULT_DUTY_COLOR)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    #[serde(default)]
    pub current_patch: String,
    /// Published as a string or a number; kept as its string form.
    /// Null, empty and zero fall back to [`DEFAULT_DATA_VERSION`].
    #[serde(default = "default_data_version", deserialize_with = "data_version_from_any")]
    pub data_version: String,
    /// Preferred remote base for data documents
    #[serde(default)]
    pub base_data_url: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            current_patch: String::new(),
            data_version: default_data_version(),
            base_data_url: None,
            last_updated: None,
        }
    }
}

fn default_data_version() -> String {
    DEFAULT_DATA_VERSION.to_string()
}

fn data_version_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(text)) if !text.is_empty() => text,
        Some(Raw::Int(n)) if n != 0 => n.to_string(),
        Some(Raw::Float(f)) if f != 0.0 => f.to_string(),
        _ => default_data_version(),
    })
}

/// Allowed values for every facet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enums {
    #[serde(default)]
    pub formation_families: Vec<String>,
    #[serde(default)]
    pub style_tags: Vec<String>,
    #[serde(default)]
    pub intensity_levels: Vec<String>,
    #[serde(default)]
    pub mentalities: Vec<String>,
    #[serde(default)]
    pub budget_tiers: Vec<String>,
    #[serde(default)]
    pub patch_versions: Vec<String>,
    #[serde(default)]
    pub glossary_categories: Vec<String>,
}

/// Ordered position slots of a formation shape on a 0-100 plane.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormationTemplate {
    #[serde(default)]
    pub position_slots: Vec<PositionSlot>,
}

impl FormationTemplate {
    pub fn slot(&self, id: &str) -> Option<&PositionSlot> {
        self.position_slots.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSlot {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
}
