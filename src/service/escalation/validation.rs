//! Validation logic for LLM-produced match judgments
//!
//! Raters are external and untrusted: their output is sanity-checked and
//! normalized before it can influence a tier.

use crate::model::judgment::{ExtractedJudgment, ExtractedVerdict, RaterJudgment};

/// Result of judgment validation
#[derive(Debug)]
pub struct JudgmentValidationResult {
    /// Warnings that indicate quality issues; never fatal
    pub warnings: Vec<String>,
}

/// Normalize an extracted judgment into a usable `RaterJudgment`.
///
/// Checks:
/// 1. Confidence outside [0,1] is clamped (warning)
/// 2. Empty rationale (warning)
/// 3. A "match" verdict with near-zero confidence is suspicious (warning)
pub fn validate_judgment(
    rater: &str,
    extracted: ExtractedJudgment,
) -> (RaterJudgment, JudgmentValidationResult) {
    let mut result = JudgmentValidationResult {
        warnings: Vec::new(),
    };

    let mut confidence = extracted.confidence;
    if !(0.0..=1.0).contains(&confidence) || !confidence.is_finite() {
        result.warnings.push(format!(
            "confidence {} outside [0,1], clamping",
            extracted.confidence
        ));
        confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    if extracted.rationale.trim().is_empty() {
        result.warnings.push("empty rationale".to_string());
    }

    let matched = extracted.verdict == ExtractedVerdict::Match;
    if matched && confidence < 0.2 {
        result.warnings.push(format!(
            "match verdict with very low confidence {:.2}",
            confidence
        ));
    }

    (
        RaterJudgment {
            rater: rater.to_string(),
            matched,
            confidence,
            rationale: extracted.rationale,
        },
        result,
    )
}
