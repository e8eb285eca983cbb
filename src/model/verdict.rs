use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final classification of one assignment pair or unmatched record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// True positive also flagged by an independent scanner
    Corroborated,
    Exact,
    Partial,
    /// Claim the defender never matched
    Missed,
    /// Finding that matched no claim
    FalseAlarm,
}

impl MatchTier {
    /// Exact, partial and corroborated all count as true positives;
    /// only the discrete label differs.
    pub fn is_true_positive(self) -> bool {
        matches!(
            self,
            MatchTier::Corroborated | MatchTier::Exact | MatchTier::Partial
        )
    }
}

// Final classification of one claim/finding decision
// - claim_id / finding_id: at least one is set; both for matched pairs
// - score: the pairwise rule score (0.0 for records that never paired)
// - confidence: rule score, or rater confidence when escalation resolved the pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub claim_id: Option<String>,
    pub finding_id: Option<String>,
    pub tier: MatchTier,
    pub score: f64,
    pub confidence: f64,
    pub explanation: String,
}

/// Raw tallies for one episode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeCounts {
    pub claims: usize,
    pub findings: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub exact: usize,
    pub partial: usize,
    pub corroborated: usize,
    /// Ambiguous pairs sent through semantic escalation
    pub escalated: usize,
}

/// Detection-quality rates derived from the counts.
/// Every zero-denominator ratio is defined as 0.0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeRates {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub evasion_rate: f64,
    pub corroboration_rate: f64,
}

/// Cohen's kappa for one rater pair across the episode's ambiguous pairs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairwiseKappa {
    pub rater_a: String,
    pub rater_b: String,
    pub kappa: f64,
    /// Number of ambiguous pairs both raters judged
    pub judged_pairs: usize,
}

// Episode-level inter-rater reliability. Interpretation bands (documented,
// not enforced): <0.20 poor, 0.21-0.40 fair, 0.41-0.60 moderate,
// 0.61-0.80 substantial, 0.81-1.00 almost perfect. kappa > 0.70 is the
// recommended publication threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityStats {
    pub raters: Vec<String>,
    pub pairwise_kappa: Vec<PairwiseKappa>,
    pub mean_kappa: f64,
    /// Fraction of ambiguous pairs where all raters agreed unanimously
    pub unanimous_agreement_rate: f64,
    pub judged_pairs: usize,
}

/// Terminal aggregate handed to the caller, one per episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub counts: EpisodeCounts,
    pub rates: EpisodeRates,
    /// Present only when multi-rater escalation ran
    pub reliability: Option<ReliabilityStats>,
    /// Per-pair audit trail; every claim and finding appears exactly once
    pub verdicts: Vec<Verdict>,
    pub generated_at: DateTime<Utc>,
}
