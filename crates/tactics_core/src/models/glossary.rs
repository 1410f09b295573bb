use serde::{Deserialize, Serialize};

/// A glossary entry from `glossary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryTerm {
    pub slug: String,
    pub term: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub fm_context: Option<String>,
    #[serde(default)]
    pub related_terms: Vec<String>,
    #[serde(default)]
    pub used_in_tactics: Vec<String>,
}

impl GlossaryTerm {
    pub(crate) fn search_haystack(&self) -> String {
        let mut parts: Vec<&str> = vec![self.term.as_str()];
        parts.extend(self.aliases.iter().map(String::as_str));
        parts.push(self.definition.as_str());
        parts.push(self.fm_context.as_deref().unwrap_or(""));
        parts.retain(|p| !p.is_empty());
        parts.join(" ").to_lowercase()
    }
}
