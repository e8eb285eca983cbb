//! Feature extraction for claims and findings
//!
//! Derives the comparable attribute bundle the pairwise scorer works on.
//! Extraction is deterministic and total: malformed or missing fields
//! degrade to neutral defaults instead of failing, because benchmark
//! records come from LLM producers and are routinely noisy.

use regex::Regex;
use std::collections::BTreeSet;

use crate::model::records::{Category, Claim, Finding, Severity};
use crate::model::Taxonomy;

/// Words carrying no matching signal, dropped from keyword sets.
/// Negations ("no", "not") are deliberately kept: they carry meaning in
/// security titles ("no encryption", "not rotated").
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "has", "have", "had",
    "do", "does", "did", "will", "would", "can", "could", "may", "might", "shall", "should",
    "of", "in", "on", "at", "to", "for", "with", "by", "from", "as", "and", "or", "but", "if",
    "then", "than", "this", "that", "these", "those", "it", "its", "there", "here", "any", "all",
    "such", "via",
];

/// Normalized, comparable attributes for one claim or finding
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBundle {
    pub id: String,
    pub category: Category,
    pub resource_key: String,
    pub keywords: BTreeSet<String>,
    pub severity: Severity,
    /// Normalized attribute phrases named by the record (claims only today)
    pub attribute_terms: BTreeSet<String>,
    /// Lower-cased evidence text, searched for the other side's attributes
    pub evidence_text: String,
    /// Lower-cased title + description, the secondary attribute haystack
    pub aux_text: String,
}

impl FeatureBundle {
    pub fn from_claim(taxonomy: &Taxonomy, claim: &Claim) -> Self {
        let mut attribute_terms = BTreeSet::new();
        let attribute = claim.attribute.trim().to_lowercase();
        if !attribute.is_empty() {
            attribute_terms.insert(attribute);
        }

        Self {
            id: claim.id.clone(),
            category: taxonomy.canonical_category(&claim.category),
            resource_key: normalize_resource(&claim.resource),
            keywords: extract_keywords(&claim.title, &claim.description),
            severity: taxonomy.severity(&claim.severity),
            attribute_terms,
            evidence_text: claim.evidence.trim().to_lowercase(),
            aux_text: format!("{} {}", claim.title, claim.description)
                .trim()
                .to_lowercase(),
        }
    }

    pub fn from_finding(taxonomy: &Taxonomy, finding: &Finding) -> Self {
        Self {
            id: finding.id.clone(),
            category: taxonomy.canonical_category(&finding.category),
            resource_key: normalize_resource(&finding.resource),
            keywords: extract_keywords(&finding.title, &finding.description),
            severity: taxonomy.severity(&finding.severity),
            attribute_terms: BTreeSet::new(),
            evidence_text: finding.evidence.trim().to_lowercase(),
            aux_text: format!("{} {}", finding.title, finding.description)
                .trim()
                .to_lowercase(),
        }
    }
}

/// Normalize a resource identifier into a comparison key: lower-cased,
/// punctuation runs collapsed to a single underscore, structural
/// separators ('.', '/', '-') kept so type segments survive.
pub fn normalize_resource(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return String::new();
    }

    let collapse = Regex::new(r"[^a-z0-9._/-]+").expect("static pattern");
    collapse
        .replace_all(&lowered, "_")
        .trim_matches(|c| c == '_' || c == '.')
        .to_string()
}

/// Stop-word-filtered keyword set from title + description
fn extract_keywords(title: &str, description: &str) -> BTreeSet<String> {
    format!("{} {}", title, description)
        .split_whitespace()
        .map(normalize_word)
        .filter(|w| w.len() >= 2 && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Normalize a token for comparison (lowercase, strip surrounding punctuation)
fn normalize_word(w: &str) -> String {
    w.trim_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase()
}
