//! Search index
//!
//! One flat entry per declared class for search UIs, plus a fuzzy lookup
//! over the entries.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};

use crate::schema::{ClassMapping, PropertyDeclaration};

/// Value of the `type` field for class entries
pub const CLASS_ENTRY_TYPE: &str = "Class";

/// A single search index entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Only present when property output is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<PropertyDeclaration>>,
}

impl SearchEntry {
    pub fn class(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            description: String::new(),
            kind: CLASS_ENTRY_TYPE.to_string(),
            properties: None,
        }
    }
}

/// One entry per class, in mapping order
pub fn build_search_index(classes: &ClassMapping) -> Vec<SearchEntry> {
    classes.iter().map(|class| SearchEntry::class(&class.name)).collect()
}

/// Like [`build_search_index`], with each class's parsed properties attached
pub fn build_search_index_with_properties(classes: &ClassMapping) -> Vec<SearchEntry> {
    classes
        .iter()
        .map(|class| SearchEntry {
            properties: Some(class.properties.clone()),
            ..SearchEntry::class(&class.name)
        })
        .collect()
}

/// A fuzzy match against the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub score: i64,
}

/// Search entries by name (fuzzy), best score first, ties in index order
pub fn fuzzy_search(entries: &[SearchEntry], query: &str, limit: usize) -> Vec<SearchResult> {
    let matcher = SkimMatcherV2::default();

    let mut results: Vec<(i64, &SearchEntry)> = entries
        .iter()
        .filter_map(|entry| matcher.fuzzy_match(&entry.name, query).map(|score| (score, entry)))
        .collect();

    // Stable sort keeps index order among equal scores
    results.sort_by(|a, b| b.0.cmp(&a.0));

    results
        .into_iter()
        .take(limit)
        .map(|(score, entry)| SearchResult {
            id: entry.id.clone(),
            score,
        })
        .collect()
}
