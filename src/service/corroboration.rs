//! Third-party scanner corroboration lookup
//!
//! Builds a per-episode index of independent scan results and answers
//! whether a claim's resource/category was also flagged by a scanner.
//! Absence of corroboration data means "no corroboration available",
//! never "disconfirmed".

use crate::model::records::{Category, CorroborationRecord};
use crate::model::Taxonomy;
use crate::service::features::normalize_resource;

/// Per-episode lookup over the supplied corroboration records
#[derive(Debug, Default)]
pub struct CorroborationIndex {
    entries: Vec<IndexEntry>,
}

#[derive(Debug)]
struct IndexEntry {
    resource_key: String,
    category: Category,
    scanner: Option<String>,
}

impl CorroborationIndex {
    /// Build the index once from the episode's scanner output.
    /// Records whose rule tag maps to no canonical category are kept with
    /// `Uncategorized` and will simply never match a categorized claim.
    pub fn new(taxonomy: &Taxonomy, records: &[CorroborationRecord]) -> Self {
        let entries = records
            .iter()
            .map(|record| IndexEntry {
                resource_key: normalize_resource(&record.resource),
                category: taxonomy.canonical_category(&record.rule),
                scanner: record.scanner.clone(),
            })
            .collect();

        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any scanner flagged this resource with the same canonical
    /// category. Resource matching is exact or normalized-substring.
    pub fn corroborates(&self, resource_key: &str, category: Category) -> bool {
        self.find_scanner(resource_key, category).is_some()
    }

    /// The first corroborating scanner's name, for verdict explanations
    pub fn find_scanner(&self, resource_key: &str, category: Category) -> Option<&str> {
        if resource_key.is_empty() || category == Category::Uncategorized {
            return None;
        }

        self.entries
            .iter()
            .find(|entry| {
                entry.category == category
                    && !entry.resource_key.is_empty()
                    && (entry.resource_key == resource_key
                        || entry.resource_key.contains(resource_key)
                        || resource_key.contains(&entry.resource_key))
            })
            .map(|entry| entry.scanner.as_deref().unwrap_or("scanner"))
    }
}
