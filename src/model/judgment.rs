//! LLM-extractable models for semantic match judgment

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Structured verdict an LLM rater must return for one claim/finding pair
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedJudgment {
    pub verdict: ExtractedVerdict,
    /// Rater's confidence in the verdict, in [0,1]
    pub confidence: f64,
    pub rationale: String,
}

/// Binary match verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExtractedVerdict {
    Match,
    NoMatch,
}

/// One semantic rater's opinion on one ambiguous pair, after validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaterJudgment {
    /// Name of the rater that produced the judgment
    pub rater: String,
    pub matched: bool,
    pub confidence: f64,
    pub rationale: String,
}
