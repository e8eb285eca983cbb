//! Score-band tier classification
//!
//! Maps an assigned pair's score onto the configured bands and applies
//! corroboration promotion. Scores below the floor never reach this
//! module; the assignment solver already filtered them.

use crate::model::verdict::MatchTier;
use crate::model::TierBands;

/// Band a score falls into before escalation resolves ambiguity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Exact,
    Partial,
    /// [floor, partial_threshold): needs semantic escalation
    Ambiguous,
}

/// Classify an assigned pair's score into its band
pub fn classify_band(bands: &TierBands, score: f64) -> ScoreBand {
    debug_assert!(score >= bands.min_score_floor);

    if score >= bands.exact_threshold {
        ScoreBand::Exact
    } else if score >= bands.partial_threshold {
        ScoreBand::Partial
    } else {
        ScoreBand::Ambiguous
    }
}

/// Apply corroboration promotion to a matched tier. Corroboration
/// strictly dominates exact/partial and never demotes.
pub fn promote(tier: MatchTier, corroborated: bool) -> MatchTier {
    match tier {
        MatchTier::Exact | MatchTier::Partial if corroborated => MatchTier::Corroborated,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands() -> TierBands {
        TierBands::default()
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(classify_band(&bands(), 0.70), ScoreBand::Exact);
        assert_eq!(classify_band(&bands(), 0.95), ScoreBand::Exact);
        assert_eq!(classify_band(&bands(), 0.69), ScoreBand::Partial);
        assert_eq!(classify_band(&bands(), 0.40), ScoreBand::Partial);
        assert_eq!(classify_band(&bands(), 0.39), ScoreBand::Ambiguous);
        assert_eq!(classify_band(&bands(), 0.30), ScoreBand::Ambiguous);
    }

    #[test]
    fn test_corroboration_promotes_exact_and_partial() {
        assert_eq!(promote(MatchTier::Exact, true), MatchTier::Corroborated);
        assert_eq!(promote(MatchTier::Partial, true), MatchTier::Corroborated);
    }

    #[test]
    fn test_corroboration_never_demotes() {
        assert_eq!(promote(MatchTier::Exact, false), MatchTier::Exact);
        assert_eq!(promote(MatchTier::Partial, false), MatchTier::Partial);
        assert_eq!(promote(MatchTier::Corroborated, true), MatchTier::Corroborated);
        // Unmatched outcomes are untouched by corroboration
        assert_eq!(promote(MatchTier::Missed, true), MatchTier::Missed);
        assert_eq!(promote(MatchTier::FalseAlarm, true), MatchTier::FalseAlarm);
    }
}
