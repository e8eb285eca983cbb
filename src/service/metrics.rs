//! Detection-quality metrics
//!
//! Converts the final verdict set into counts and rates. Every ratio with
//! a zero denominator is defined as 0.0 so degenerate episodes (zero
//! claims, zero findings, or both) report trivial values instead of
//! crashing.

use crate::model::verdict::{EpisodeCounts, EpisodeRates, MatchTier, Verdict};

/// Tally verdicts into episode counts
pub fn count_verdicts(
    total_claims: usize,
    total_findings: usize,
    escalated: usize,
    verdicts: &[Verdict],
) -> EpisodeCounts {
    let mut counts = EpisodeCounts {
        claims: total_claims,
        findings: total_findings,
        escalated,
        ..EpisodeCounts::default()
    };

    for verdict in verdicts {
        match verdict.tier {
            MatchTier::Corroborated => {
                counts.corroborated += 1;
                counts.true_positives += 1;
            }
            MatchTier::Exact => {
                counts.exact += 1;
                counts.true_positives += 1;
            }
            MatchTier::Partial => {
                counts.partial += 1;
                counts.true_positives += 1;
            }
            MatchTier::Missed => counts.false_negatives += 1,
            MatchTier::FalseAlarm => counts.false_positives += 1,
        }
    }

    counts
}

/// Derive rates from the counts
pub fn compute_rates(counts: &EpisodeCounts) -> EpisodeRates {
    let tp = counts.true_positives as f64;
    let fp = counts.false_positives as f64;
    let fn_ = counts.false_negatives as f64;

    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = ratio(2.0 * precision * recall, precision + recall);
    let evasion_rate = ratio(fn_, tp + fn_);
    let corroboration_rate = ratio(counts.corroborated as f64, tp);

    EpisodeRates {
        precision,
        recall,
        f1,
        evasion_rate,
        corroboration_rate,
    }
}

/// Zero-denominator-safe division
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
