//! Semantic escalation of ambiguous pairs
//!
//! Pairs whose rule score lands in the ambiguous band are put before one
//! or more independent semantic raters. Rater calls for one pair fan out
//! concurrently; different pairs run concurrently under a caller-supplied
//! cap so external rate limits are respected. A timed-out or failed rater
//! degrades only its own judgment; a pair with no usable judgments falls
//! back to the conservative non-escalated default. Escalation resolves
//! tiers of already-assigned pairs and never creates or removes pairs.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::model::judgment::RaterJudgment;
use crate::model::records::{Claim, Finding};
use crate::model::EscalationConfig;
use crate::service::consensus::majority_vote;

pub mod error;
pub mod prompts;
pub mod rater;
pub mod validation;

pub use error::EscalationError;
pub use rater::{LlmRater, ScriptedRater, SemanticRater};

/// Outcome of escalating one ambiguous pair
#[derive(Debug, Clone)]
pub struct PairResolution {
    /// `None` when no rater produced a usable judgment; the caller applies
    /// the conservative default (ambiguous -> missed)
    pub matched: Option<bool>,
    pub confidence: f64,
    /// Explanation fragment recorded in the pair's verdict
    pub detail: String,
    /// All usable judgments, kept for episode-level reliability
    pub judgments: Vec<RaterJudgment>,
}

/// Service that drives rater calls for the ambiguous pairs of one episode
pub struct EscalationService {
    raters: Vec<Arc<dyn SemanticRater>>,
    timeout: Duration,
    max_concurrent_pairs: usize,
}

impl EscalationService {
    pub fn new(raters: Vec<Arc<dyn SemanticRater>>, config: &EscalationConfig) -> Self {
        tracing::info!(
            raters = raters.len(),
            timeout_secs = config.timeout_secs,
            max_concurrent_pairs = config.max_concurrent_pairs,
            "Escalation service initialized"
        );

        Self {
            raters,
            timeout: Duration::from_secs(config.timeout_secs),
            max_concurrent_pairs: config.max_concurrent_pairs.max(1),
        }
    }

    pub fn rater_count(&self) -> usize {
        self.raters.len()
    }

    /// Escalate every ambiguous pair. Results come back in input order.
    pub async fn escalate_pairs(
        &self,
        pairs: &[(&Claim, &Finding)],
    ) -> Vec<PairResolution> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_pairs));

        let futures: Vec<_> = pairs
            .iter()
            .map(|(claim, finding)| {
                let semaphore = Arc::clone(&semaphore);
                async move {
                    // Closed only if the semaphore is dropped, which cannot
                    // happen while this future is alive
                    let _permit = semaphore.acquire().await.expect("semaphore open");
                    self.escalate_single(claim, finding).await
                }
            })
            .collect();

        join_all(futures).await
    }

    /// Fan out all raters for one pair and reduce to a resolution
    async fn escalate_single(&self, claim: &Claim, finding: &Finding) -> PairResolution {
        let calls = self.raters.iter().map(|rater| {
            let rater = Arc::clone(rater);
            async move {
                match tokio::time::timeout(self.timeout, rater.judge(claim, finding)).await {
                    Ok(Ok(judgment)) => Some(judgment),
                    Ok(Err(e)) => {
                        tracing::warn!(
                            claim = %claim.id,
                            finding = %finding.id,
                            rater = rater.name(),
                            error = %e,
                            "Rater call failed, continuing without its judgment"
                        );
                        None
                    }
                    Err(_) => {
                        tracing::warn!(
                            claim = %claim.id,
                            finding = %finding.id,
                            rater = rater.name(),
                            timeout_secs = self.timeout.as_secs(),
                            "Rater call timed out, continuing without its judgment"
                        );
                        None
                    }
                }
            }
        });

        let judgments: Vec<RaterJudgment> =
            join_all(calls).await.into_iter().flatten().collect();

        match majority_vote(&judgments) {
            Some(verdict) => {
                let label = if verdict.matched { "match" } else { "no-match" };
                let detail = if verdict.votes_total > 1 {
                    format!(
                        "escalated: {} ({}/{} raters voted match)",
                        label, verdict.votes_for_match, verdict.votes_total
                    )
                } else {
                    format!("escalated: {}", label)
                };

                PairResolution {
                    matched: Some(verdict.matched),
                    confidence: verdict.confidence,
                    detail,
                    judgments,
                }
            }
            None => PairResolution {
                matched: None,
                confidence: 0.0,
                detail: "escalation failed: no usable rater judgments".to_string(),
                judgments,
            },
        }
    }
}
