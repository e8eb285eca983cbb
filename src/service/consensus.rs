//! Multi-rater consensus and inter-rater reliability
//!
//! Reduces N independent rater judgments for one pair to a majority
//! verdict, and computes episode-level Cohen's kappa once all ambiguous
//! pairs have been judged. Reliability is an episode statistic: it cannot
//! be computed from a single pair.

use std::collections::BTreeSet;

use crate::model::judgment::RaterJudgment;
use crate::model::verdict::{PairwiseKappa, ReliabilityStats};

/// Majority verdict for one pair
#[derive(Debug, Clone)]
pub struct ConsensusVerdict {
    pub matched: bool,
    /// Mean confidence of the majority side
    pub confidence: f64,
    pub votes_for_match: usize,
    pub votes_total: usize,
}

/// Reduce the judgments for one pair to a majority verdict: match iff
/// strictly more than half of the raters say match. Returns `None` when
/// no judgments are available (the caller falls back to the conservative
/// non-escalated default).
pub fn majority_vote(judgments: &[RaterJudgment]) -> Option<ConsensusVerdict> {
    if judgments.is_empty() {
        return None;
    }

    let votes_total = judgments.len();
    let votes_for_match = judgments.iter().filter(|j| j.matched).count();
    let matched = votes_for_match * 2 > votes_total;

    let majority: Vec<&RaterJudgment> = judgments
        .iter()
        .filter(|j| j.matched == matched)
        .collect();
    let confidence = if majority.is_empty() {
        0.0
    } else {
        majority.iter().map(|j| j.confidence).sum::<f64>() / majority.len() as f64
    };

    Some(ConsensusVerdict {
        matched,
        confidence,
        votes_for_match,
        votes_total,
    })
}

/// Compute episode-level reliability from the judgments of every
/// escalated pair. Returns `None` when fewer than two raters produced
/// judgments (single-rater mode has no inter-rater reliability).
pub fn compute_reliability(pair_judgments: &[Vec<RaterJudgment>]) -> Option<ReliabilityStats> {
    let raters: BTreeSet<String> = pair_judgments
        .iter()
        .flatten()
        .map(|j| j.rater.clone())
        .collect();
    if raters.len() < 2 {
        return None;
    }
    let raters: Vec<String> = raters.into_iter().collect();

    // Pairwise kappa over the pairs both raters actually judged
    let mut pairwise_kappa = Vec::new();
    for (i, rater_a) in raters.iter().enumerate() {
        for rater_b in raters.iter().skip(i + 1) {
            let shared: Vec<(bool, bool)> = pair_judgments
                .iter()
                .filter_map(|judgments| {
                    let a = judgments.iter().find(|j| &j.rater == rater_a)?;
                    let b = judgments.iter().find(|j| &j.rater == rater_b)?;
                    Some((a.matched, b.matched))
                })
                .collect();

            if shared.is_empty() {
                continue;
            }

            pairwise_kappa.push(PairwiseKappa {
                rater_a: rater_a.clone(),
                rater_b: rater_b.clone(),
                kappa: cohens_kappa(&shared),
                judged_pairs: shared.len(),
            });
        }
    }

    if pairwise_kappa.is_empty() {
        return None;
    }

    let mean_kappa =
        pairwise_kappa.iter().map(|p| p.kappa).sum::<f64>() / pairwise_kappa.len() as f64;

    // A pair counts as unanimous when every rater that judged it agrees
    let judged: Vec<&Vec<RaterJudgment>> = pair_judgments
        .iter()
        .filter(|judgments| judgments.len() >= 2)
        .collect();
    let unanimous = judged
        .iter()
        .filter(|judgments| {
            judgments.iter().all(|j| j.matched) || judgments.iter().all(|j| !j.matched)
        })
        .count();
    let unanimous_agreement_rate = if judged.is_empty() {
        0.0
    } else {
        unanimous as f64 / judged.len() as f64
    };

    Some(ReliabilityStats {
        raters,
        pairwise_kappa,
        mean_kappa,
        unanimous_agreement_rate,
        judged_pairs: pair_judgments.len(),
    })
}

/// Cohen's kappa for one rater pair: (p_o - p_e) / (1 - p_e), where p_o is
/// the observed agreement fraction and p_e the agreement expected by
/// chance given each rater's marginal match rate.
///
/// Degenerate case: when p_e = 1 both raters are constant, so chance
/// explains everything; kappa is 1.0 on perfect agreement and 0.0
/// otherwise.
fn cohens_kappa(pairs: &[(bool, bool)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let observed = pairs.iter().filter(|(a, b)| a == b).count() as f64 / n;
    let a_match = pairs.iter().filter(|(a, _)| *a).count() as f64 / n;
    let b_match = pairs.iter().filter(|(_, b)| *b).count() as f64 / n;
    let expected = a_match * b_match + (1.0 - a_match) * (1.0 - b_match);

    if (1.0 - expected).abs() < f64::EPSILON {
        return if observed >= 1.0 { 1.0 } else { 0.0 };
    }

    (observed - expected) / (1.0 - expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn judgment(rater: &str, matched: bool, confidence: f64) -> RaterJudgment {
        RaterJudgment {
            rater: rater.to_string(),
            matched,
            confidence,
            rationale: String::new(),
        }
    }

    #[test]
    fn test_majority_vote_requires_strict_majority() {
        let verdict = majority_vote(&[
            judgment("a", true, 0.9),
            judgment("b", true, 0.7),
            judgment("c", false, 0.6),
        ])
        .expect("judgments present");

        assert!(verdict.matched);
        assert_eq!(verdict.votes_for_match, 2);
        assert!((verdict.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_even_split_is_no_match() {
        let verdict = majority_vote(&[judgment("a", true, 0.9), judgment("b", false, 0.9)])
            .expect("judgments present");

        assert!(!verdict.matched);
    }

    #[test]
    fn test_empty_judgments_yield_no_verdict() {
        assert!(majority_vote(&[]).is_none());
    }

    #[test]
    fn test_kappa_is_exactly_one_on_perfect_agreement() {
        // Mixed marginals, total agreement on every pair
        let pair_judgments = vec![
            vec![judgment("a", true, 0.9), judgment("b", true, 0.8)],
            vec![judgment("a", false, 0.9), judgment("b", false, 0.8)],
            vec![judgment("a", true, 0.9), judgment("b", true, 0.8)],
            vec![judgment("a", false, 0.9), judgment("b", false, 0.8)],
        ];

        let stats = compute_reliability(&pair_judgments).expect("two raters");

        assert_eq!(stats.pairwise_kappa.len(), 1);
        assert!((stats.pairwise_kappa[0].kappa - 1.0).abs() < 1e-12);
        assert!((stats.mean_kappa - 1.0).abs() < 1e-12);
        assert!((stats.unanimous_agreement_rate - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_kappa_is_zero_at_chance_agreement() {
        // Each rater matches half the time; agreement rate equals the
        // expected-by-chance rate of 0.5, so kappa collapses to zero.
        let pair_judgments = vec![
            vec![judgment("a", true, 0.9), judgment("b", true, 0.8)],
            vec![judgment("a", true, 0.9), judgment("b", false, 0.8)],
            vec![judgment("a", false, 0.9), judgment("b", true, 0.8)],
            vec![judgment("a", false, 0.9), judgment("b", false, 0.8)],
        ];

        let stats = compute_reliability(&pair_judgments).expect("two raters");

        assert!(stats.pairwise_kappa[0].kappa.abs() < 1e-12);
        assert!((stats.unanimous_agreement_rate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_constant_raters_in_full_agreement() {
        let pair_judgments = vec![
            vec![judgment("a", true, 0.9), judgment("b", true, 0.8)],
            vec![judgment("a", true, 0.9), judgment("b", true, 0.8)],
        ];

        let stats = compute_reliability(&pair_judgments).expect("two raters");

        // p_e = 1: degenerate case resolves to 1.0 on perfect agreement
        assert!((stats.pairwise_kappa[0].kappa - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_rater_has_no_reliability() {
        let pair_judgments = vec![vec![judgment("a", true, 0.9)]];

        assert!(compute_reliability(&pair_judgments).is_none());
    }

    #[test]
    fn test_three_raters_produce_three_pairwise_kappas() {
        let pair_judgments = vec![
            vec![
                judgment("a", true, 0.9),
                judgment("b", true, 0.8),
                judgment("c", false, 0.7),
            ],
            vec![
                judgment("a", false, 0.9),
                judgment("b", false, 0.8),
                judgment("c", false, 0.7),
            ],
        ];

        let stats = compute_reliability(&pair_judgments).expect("three raters");

        assert_eq!(stats.raters.len(), 3);
        assert_eq!(stats.pairwise_kappa.len(), 3);
    }
}
