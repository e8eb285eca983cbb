//! Pairwise claim/finding similarity scoring
//!
//! Pure weighted-criteria scoring over two feature bundles. No assignment
//! logic lives here; the solver consumes the matrix this module produces.

use serde::Serialize;

use crate::model::records::Category;
use crate::model::{ScoreWeights, Taxonomy};
use crate::service::features::FeatureBundle;

/// Secondary attribute credit when the attribute only appears in
/// title/description rather than the evidence text proper
const AUX_ATTRIBUTE_CREDIT: f64 = 0.75;

/// One scored claim/finding pair, decomposed per term for auditability.
/// Ephemeral: recomputed per episode, never persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PairScore {
    pub total: f64,
    pub category_term: f64,
    pub resource_term: f64,
    pub attribute_term: f64,
    pub keyword_term: f64,
    pub severity_term: f64,
}

/// Score one claim/finding pair in [0,1].
///
/// Symmetric in its two bundles (score(a,b) = score(b,a)) and
/// deterministic, so re-runs over shuffled inputs reproduce the matrix.
pub fn score_pair(
    weights: &ScoreWeights,
    partial_resource_factor: f64,
    taxonomy: &Taxonomy,
    a: &FeatureBundle,
    b: &FeatureBundle,
) -> PairScore {
    let category_term = weights.category * category_credit(taxonomy, a.category, b.category);
    let resource_term =
        weights.resource * resource_credit(partial_resource_factor, &a.resource_key, &b.resource_key);
    let attribute_term =
        weights.attribute * attribute_credit(a, b).max(attribute_credit(b, a));
    let keyword_term = weights.keyword * jaccard(&a.keywords, &b.keywords);
    let severity_term = weights.severity * severity_credit(a.severity.rank(), b.severity.rank());

    let total = (category_term + resource_term + attribute_term + keyword_term + severity_term)
        .clamp(0.0, 1.0);

    PairScore {
        total,
        category_term,
        resource_term,
        attribute_term,
        keyword_term,
        severity_term,
    }
}

/// Full credit for identical categories, half for related ones.
/// Uncategorized never earns credit, even against itself.
fn category_credit(taxonomy: &Taxonomy, a: Category, b: Category) -> f64 {
    if a == Category::Uncategorized || b == Category::Uncategorized {
        0.0
    } else if a == b {
        1.0
    } else if taxonomy.related(a, b) {
        0.5
    } else {
        0.0
    }
}

/// Full credit on exact normalized key match; partial credit when one key
/// contains the other or both name the same resource type segment.
fn resource_credit(partial_factor: f64, a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    if a.contains(b) || b.contains(a) || same_type_segment(a, b) {
        return partial_factor;
    }
    0.0
}

/// "aws_s3_bucket.data" and "aws_s3_bucket.logs" name the same resource type
fn same_type_segment(a: &str, b: &str) -> bool {
    match (a.split_once('.'), b.split_once('.')) {
        (Some((ta, _)), Some((tb, _))) => ta == tb,
        _ => false,
    }
}

/// Directional attribute credit: does any of `a`'s named attributes appear
/// verbatim in `b`'s evidence (full credit) or title/description
/// (secondary credit)? The scorer takes the max over both directions, so
/// the term stays symmetric in the bundles.
fn attribute_credit(a: &FeatureBundle, b: &FeatureBundle) -> f64 {
    let mut best: f64 = 0.0;
    for term in &a.attribute_terms {
        if !b.evidence_text.is_empty() && b.evidence_text.contains(term) {
            return 1.0;
        }
        if !b.aux_text.is_empty() && b.aux_text.contains(term) {
            best = best.max(AUX_ATTRIBUTE_CREDIT);
        }
    }
    best
}

/// Jaccard similarity of the two keyword sets (intersection over union)
fn jaccard(a: &std::collections::BTreeSet<String>, b: &std::collections::BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Full credit on equal severity rank, half credit on adjacent ranks
fn severity_credit(a: u8, b: u8) -> f64 {
    match a.abs_diff(b) {
        0 => 1.0,
        1 => 0.5,
        _ => 0.0,
    }
}
