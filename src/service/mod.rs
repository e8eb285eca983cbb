//! Adjudication engine
//!
//! Reconciles an attacker's claimed-defect manifest against a defender's
//! reported findings: feature extraction, pairwise scoring, globally
//! optimal assignment, tier classification with scanner corroboration,
//! semantic escalation of ambiguous pairs, and episode metrics.

use chrono::Utc;
use std::sync::Arc;

use crate::model::judgment::RaterJudgment;
use crate::model::records::{Claim, CorroborationRecord, Finding};
use crate::model::verdict::{EpisodeResult, MatchTier, Verdict};
use crate::model::{ConfigError, EngineConfig};
use crate::service::assignment::AssignedPair;
use crate::service::corroboration::CorroborationIndex;
use crate::service::escalation::{EscalationService, SemanticRater};
use crate::service::features::FeatureBundle;
use crate::service::tiering::{classify_band, promote, ScoreBand};

pub mod assignment;
pub mod consensus;
pub mod corroboration;
pub mod escalation;
pub mod features;
pub mod llm;
pub mod metrics;
pub mod scoring;
pub mod tiering;

pub use escalation::{LlmRater, ScriptedRater};
pub use llm::LlmClient;

/// The adjudication engine for one benchmark configuration.
///
/// Construction validates the configuration and fails fast on operator
/// errors. The service holds no per-episode state: one instance can
/// adjudicate any number of episodes, concurrently if desired.
pub struct AdjudicationService {
    config: EngineConfig,
    escalation: Option<EscalationService>,
}

impl AdjudicationService {
    /// Create an engine without semantic raters. Escalation must be
    /// disabled in the configuration; ambiguous pairs then resolve to the
    /// conservative default (missed).
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_raters(config, Vec::new())
    }

    /// Create an engine with the given semantic raters
    pub fn with_raters(
        config: EngineConfig,
        raters: Vec<Arc<dyn SemanticRater>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let escalation = if config.escalation.enabled {
            if raters.is_empty() {
                return Err(ConfigError::EscalationWithoutRaters);
            }
            Some(EscalationService::new(raters, &config.escalation))
        } else {
            if !raters.is_empty() {
                tracing::warn!(
                    raters = raters.len(),
                    "Raters supplied but escalation is disabled; they will not be used"
                );
            }
            None
        };

        tracing::info!(
            escalation = escalation.is_some(),
            floor = config.bands.min_score_floor,
            exact_threshold = config.bands.exact_threshold,
            "Adjudication service initialized"
        );

        Ok(Self { config, escalation })
    }

    /// Adjudicate one episode.
    ///
    /// Always returns a complete result: malformed records degrade during
    /// feature extraction, rater failures degrade single pairs, and
    /// degenerate inputs (zero claims and/or findings) produce defined
    /// trivial metrics. Every claim and finding ends up in exactly one
    /// verdict.
    pub async fn adjudicate(
        &self,
        claims: &[Claim],
        findings: &[Finding],
        corroborations: &[CorroborationRecord],
    ) -> EpisodeResult {
        tracing::info!(
            claims = claims.len(),
            findings = findings.len(),
            corroborations = corroborations.len(),
            "Adjudicating episode"
        );

        // Sort by id so tie-breaking and output order are independent of
        // the caller's input ordering.
        let mut claims: Vec<&Claim> = claims.iter().collect();
        claims.sort_by(|a, b| a.id.cmp(&b.id));
        let mut findings: Vec<&Finding> = findings.iter().collect();
        findings.sort_by(|a, b| a.id.cmp(&b.id));

        let taxonomy = &self.config.taxonomy;
        let claim_features: Vec<FeatureBundle> = claims
            .iter()
            .map(|c| FeatureBundle::from_claim(taxonomy, c))
            .collect();
        let finding_features: Vec<FeatureBundle> = findings
            .iter()
            .map(|f| FeatureBundle::from_finding(taxonomy, f))
            .collect();

        let matrix: Vec<Vec<f64>> = claim_features
            .iter()
            .map(|cf| {
                finding_features
                    .iter()
                    .map(|ff| {
                        scoring::score_pair(
                            &self.config.weights,
                            self.config.partial_resource_factor(),
                            taxonomy,
                            cf,
                            ff,
                        )
                        .total
                    })
                    .collect()
            })
            .collect();

        let assigned = assignment::solve(&matrix, self.config.bands.min_score_floor);
        let corroboration = CorroborationIndex::new(taxonomy, corroborations);

        let mut verdicts: Vec<Verdict> = Vec::new();
        let mut resolved_claims = vec![false; claims.len()];
        let mut resolved_findings = vec![false; findings.len()];
        let mut ambiguous: Vec<AssignedPair> = Vec::new();

        for pair in assigned {
            match classify_band(&self.config.bands, pair.score) {
                ScoreBand::Exact => {
                    verdicts.push(self.pair_verdict(
                        claims[pair.claim_idx],
                        findings[pair.finding_idx],
                        &claim_features[pair.claim_idx],
                        &corroboration,
                        MatchTier::Exact,
                        pair.score,
                        pair.score,
                        None,
                    ));
                    resolved_claims[pair.claim_idx] = true;
                    resolved_findings[pair.finding_idx] = true;
                }
                ScoreBand::Partial => {
                    verdicts.push(self.pair_verdict(
                        claims[pair.claim_idx],
                        findings[pair.finding_idx],
                        &claim_features[pair.claim_idx],
                        &corroboration,
                        MatchTier::Partial,
                        pair.score,
                        pair.score,
                        None,
                    ));
                    resolved_claims[pair.claim_idx] = true;
                    resolved_findings[pair.finding_idx] = true;
                }
                ScoreBand::Ambiguous => ambiguous.push(pair),
            }
        }

        // Escalate the ambiguous band, or conservatively reject it
        let mut escalated = 0;
        let mut pair_judgments: Vec<Vec<RaterJudgment>> = Vec::new();

        if let Some(escalation) = &self.escalation
            && !ambiguous.is_empty()
        {
            escalated = ambiguous.len();
            let inputs: Vec<(&Claim, &Finding)> = ambiguous
                .iter()
                .map(|pair| (claims[pair.claim_idx], findings[pair.finding_idx]))
                .collect();

            let resolutions = escalation.escalate_pairs(&inputs).await;

            for (pair, resolution) in ambiguous.iter().zip(resolutions) {
                pair_judgments.push(resolution.judgments.clone());

                if resolution.matched == Some(true) {
                    verdicts.push(self.pair_verdict(
                        claims[pair.claim_idx],
                        findings[pair.finding_idx],
                        &claim_features[pair.claim_idx],
                        &corroboration,
                        MatchTier::Partial,
                        pair.score,
                        resolution.confidence,
                        Some(&resolution.detail),
                    ));
                    resolved_claims[pair.claim_idx] = true;
                    resolved_findings[pair.finding_idx] = true;
                } else {
                    // no-match verdict or escalation failure: the claim
                    // is missed and the finding is a false alarm
                    self.push_rejected_pair(
                        &mut verdicts,
                        claims[pair.claim_idx],
                        findings[pair.finding_idx],
                        pair.score,
                        &resolution.detail,
                    );
                    resolved_claims[pair.claim_idx] = true;
                    resolved_findings[pair.finding_idx] = true;
                }
            }
        } else {
            for pair in &ambiguous {
                self.push_rejected_pair(
                    &mut verdicts,
                    claims[pair.claim_idx],
                    findings[pair.finding_idx],
                    pair.score,
                    "ambiguous score, escalation disabled",
                );
                resolved_claims[pair.claim_idx] = true;
                resolved_findings[pair.finding_idx] = true;
            }
        }

        // Conservation: everything still unresolved is missed / false alarm
        for (idx, claim) in claims.iter().enumerate() {
            if !resolved_claims[idx] {
                verdicts.push(Verdict {
                    claim_id: Some(claim.id.clone()),
                    finding_id: None,
                    tier: MatchTier::Missed,
                    score: 0.0,
                    confidence: 0.0,
                    explanation: format!(
                        "Missed: '{}' on {} was not detected",
                        claim.title, claim.resource
                    ),
                });
            }
        }
        for (idx, finding) in findings.iter().enumerate() {
            if !resolved_findings[idx] {
                verdicts.push(Verdict {
                    claim_id: None,
                    finding_id: Some(finding.id.clone()),
                    tier: MatchTier::FalseAlarm,
                    score: 0.0,
                    confidence: 0.0,
                    explanation: format!(
                        "False alarm: '{}' on {} matched no claimed defect",
                        finding.title, finding.resource
                    ),
                });
            }
        }

        verdicts.sort_by(|a, b| {
            (a.claim_id.is_none(), &a.claim_id, &a.finding_id)
                .cmp(&(b.claim_id.is_none(), &b.claim_id, &b.finding_id))
        });

        let counts = metrics::count_verdicts(claims.len(), findings.len(), escalated, &verdicts);
        let rates = metrics::compute_rates(&counts);
        let reliability = consensus::compute_reliability(&pair_judgments);

        tracing::info!(
            true_positives = counts.true_positives,
            false_positives = counts.false_positives,
            false_negatives = counts.false_negatives,
            escalated = counts.escalated,
            precision = rates.precision,
            recall = rates.recall,
            f1 = rates.f1,
            "Episode adjudicated"
        );

        EpisodeResult {
            counts,
            rates,
            reliability,
            verdicts,
            generated_at: Utc::now(),
        }
    }

    /// Build the verdict for a matched pair, applying corroboration
    /// promotion and composing the explanation.
    #[allow(clippy::too_many_arguments)]
    fn pair_verdict(
        &self,
        claim: &Claim,
        finding: &Finding,
        claim_features: &FeatureBundle,
        corroboration: &CorroborationIndex,
        tier: MatchTier,
        score: f64,
        confidence: f64,
        escalation_detail: Option<&str>,
    ) -> Verdict {
        let scanner = corroboration.find_scanner(&claim_features.resource_key, claim_features.category);
        let final_tier = promote(tier, scanner.is_some());

        let mut explanation = match tier {
            MatchTier::Exact => format!(
                "Exact match: '{}' on {} was detected as '{}' on {}",
                claim.title, claim.resource, finding.title, finding.resource
            ),
            _ => format!(
                "Partial match: '{}' on {} was partially detected as '{}' on {}",
                claim.title, claim.resource, finding.title, finding.resource
            ),
        };
        if let Some(detail) = escalation_detail {
            explanation.push_str("; ");
            explanation.push_str(detail);
        }
        if final_tier == MatchTier::Corroborated {
            explanation.push_str("; corroborated by ");
            explanation.push_str(scanner.unwrap_or("scanner"));
        }

        Verdict {
            claim_id: Some(claim.id.clone()),
            finding_id: Some(finding.id.clone()),
            tier: final_tier,
            score,
            confidence,
            explanation,
        }
    }

    /// Emit the two verdicts for an ambiguous pair that resolved to
    /// no-match: the claim is missed, the finding is a false alarm.
    fn push_rejected_pair(
        &self,
        verdicts: &mut Vec<Verdict>,
        claim: &Claim,
        finding: &Finding,
        score: f64,
        detail: &str,
    ) {
        verdicts.push(Verdict {
            claim_id: Some(claim.id.clone()),
            finding_id: None,
            tier: MatchTier::Missed,
            score,
            confidence: 0.0,
            explanation: format!(
                "Missed: '{}' on {} was not detected ({})",
                claim.title, claim.resource, detail
            ),
        });
        verdicts.push(Verdict {
            claim_id: None,
            finding_id: Some(finding.id.clone()),
            tier: MatchTier::FalseAlarm,
            score,
            confidence: 0.0,
            explanation: format!(
                "False alarm: '{}' on {} matched no claimed defect ({})",
                finding.title, finding.resource, detail
            ),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::verdict::MatchTier;

    fn claim(
        id: &str,
        category: &str,
        resource: &str,
        severity: &str,
        title: &str,
        attribute: &str,
    ) -> Claim {
        Claim {
            id: id.to_string(),
            category: category.to_string(),
            resource: resource.to_string(),
            severity: severity.to_string(),
            title: title.to_string(),
            description: String::new(),
            attribute: attribute.to_string(),
            evidence: String::new(),
        }
    }

    fn finding(
        id: &str,
        category: &str,
        resource: &str,
        severity: &str,
        title: &str,
        evidence: &str,
    ) -> Finding {
        Finding {
            id: id.to_string(),
            category: category.to_string(),
            resource: resource.to_string(),
            severity: severity.to_string(),
            title: title.to_string(),
            description: String::new(),
            evidence: evidence.to_string(),
            confidence: 0.9,
        }
    }

    fn engine() -> AdjudicationService {
        AdjudicationService::new(EngineConfig::default()).expect("default config valid")
    }

    fn scenario_a_claims() -> Vec<Claim> {
        vec![
            claim(
                "V1",
                "encryption",
                "aws_s3_bucket.bucket_a",
                "high",
                "Bucket not encrypted at rest",
                "server_side_encryption",
            ),
            claim(
                "V2",
                "access_control",
                "aws_s3_bucket.bucket_a",
                "high",
                "Bucket publicly readable",
                "acl",
            ),
            claim(
                "V3",
                "iam",
                "aws_iam_role.bucket_b_admin",
                "medium",
                "Role grants wildcard permissions",
                "policy",
            ),
        ]
    }

    fn scenario_a_findings() -> Vec<Finding> {
        vec![
            finding(
                "F1",
                "encryption",
                "aws_s3_bucket.bucket_a",
                "high",
                "No SSE on bucket",
                "bucket is missing server_side_encryption configuration",
            ),
            finding(
                "F2",
                "access_control",
                "aws_s3_bucket.bucket_a",
                "high",
                "Public bucket",
                "acl is set to public-read",
            ),
        ]
    }

    #[tokio::test]
    async fn test_scenario_a_two_exact_one_missed() {
        let result = engine()
            .adjudicate(&scenario_a_claims(), &scenario_a_findings(), &[])
            .await;

        assert_eq!(result.counts.true_positives, 2);
        assert_eq!(result.counts.false_positives, 0);
        assert_eq!(result.counts.false_negatives, 1);
        assert_eq!(result.counts.exact, 2);

        assert!((result.rates.precision - 1.0).abs() < 1e-9);
        assert!((result.rates.recall - 2.0 / 3.0).abs() < 1e-6);
        assert!((result.rates.f1 - 0.8).abs() < 1e-6);
        assert!((result.rates.evasion_rate - 1.0 / 3.0).abs() < 1e-6);

        let v1 = result
            .verdicts
            .iter()
            .find(|v| v.claim_id.as_deref() == Some("V1"))
            .expect("verdict for V1");
        assert_eq!(v1.finding_id.as_deref(), Some("F1"));
        assert_eq!(v1.tier, MatchTier::Exact);
        assert!(v1.score >= 0.7);

        let v3 = result
            .verdicts
            .iter()
            .find(|v| v.claim_id.as_deref() == Some("V3"))
            .expect("verdict for V3");
        assert_eq!(v3.tier, MatchTier::Missed);
    }

    #[tokio::test]
    async fn test_scenario_b_ambiguous_escalates_to_partial() {
        let mut config = EngineConfig::default();
        config.escalation.enabled = true;

        let engine = AdjudicationService::with_raters(
            config,
            vec![Arc::new(ScriptedRater::new("stub", true, 0.9))],
        )
        .expect("valid config");

        let claims = vec![claim(
            "V1",
            "secrets",
            "aws_secretsmanager_secret.app",
            "",
            "No automatic secret rotation",
            "",
        )];
        let findings = vec![finding(
            "F1",
            "secrets",
            "",
            "",
            "No Secret Rotation Configured",
            "",
        )];

        let result = engine.adjudicate(&claims, &findings, &[]).await;

        let pair = result
            .verdicts
            .iter()
            .find(|v| v.claim_id.as_deref() == Some("V1"))
            .expect("verdict for V1");

        // Rule score lands in the ambiguous band, then the stub resolves it
        assert!(
            pair.score >= 0.30 && pair.score < 0.40,
            "expected ambiguous-band score, got {}",
            pair.score
        );
        assert_eq!(pair.tier, MatchTier::Partial);
        assert!((pair.confidence - 0.9).abs() < 1e-9);
        assert!(pair.explanation.contains("escalated: match"));

        assert_eq!(result.counts.true_positives, 1);
        assert_eq!(result.counts.escalated, 1);
    }

    #[tokio::test]
    async fn test_scenario_b_without_escalation_is_conservative() {
        let claims = vec![claim(
            "V1",
            "secrets",
            "aws_secretsmanager_secret.app",
            "",
            "No automatic secret rotation",
            "",
        )];
        let findings = vec![finding(
            "F1",
            "secrets",
            "",
            "",
            "No Secret Rotation Configured",
            "",
        )];

        let result = engine().adjudicate(&claims, &findings, &[]).await;

        assert_eq!(result.counts.true_positives, 0);
        assert_eq!(result.counts.false_negatives, 1);
        assert_eq!(result.counts.false_positives, 1);
        assert_eq!(result.counts.escalated, 0);

        let missed = result
            .verdicts
            .iter()
            .find(|v| v.claim_id.as_deref() == Some("V1"))
            .expect("verdict for V1");
        assert_eq!(missed.tier, MatchTier::Missed);
        assert!(missed.explanation.contains("escalation disabled"));
    }

    #[tokio::test]
    async fn test_scenario_c_corroboration_promotes_and_rates() {
        let claims = vec![claim(
            "V1",
            "encryption",
            "aws_db_instance.db1",
            "high",
            "Database not encrypted",
            "storage_encrypted",
        )];
        let findings = vec![finding(
            "F1",
            "encryption",
            "aws_db_instance.db1",
            "high",
            "Unencrypted RDS instance",
            "storage_encrypted is false",
        )];
        let corroborations = vec![CorroborationRecord {
            resource: "db1".to_string(),
            rule: "encryption".to_string(),
            scanner: Some("checkov".to_string()),
        }];

        let result = engine().adjudicate(&claims, &findings, &corroborations).await;

        let pair = &result.verdicts[0];
        assert_eq!(pair.tier, MatchTier::Corroborated);
        assert!(pair.score >= 0.7);
        assert!(pair.explanation.contains("corroborated by checkov"));

        assert_eq!(result.counts.corroborated, 1);
        assert!((result.rates.corroboration_rate - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_conservation_no_record_dropped_or_doubled() {
        let result = engine()
            .adjudicate(&scenario_a_claims(), &scenario_a_findings(), &[])
            .await;

        let claim_mentions: Vec<&str> = result
            .verdicts
            .iter()
            .filter_map(|v| v.claim_id.as_deref())
            .collect();
        let finding_mentions: Vec<&str> = result
            .verdicts
            .iter()
            .filter_map(|v| v.finding_id.as_deref())
            .collect();

        assert_eq!(claim_mentions.len(), 3);
        assert_eq!(finding_mentions.len(), 2);

        let mut unique_claims = claim_mentions.clone();
        unique_claims.sort();
        unique_claims.dedup();
        assert_eq!(unique_claims.len(), 3);

        let mut unique_findings = finding_mentions.clone();
        unique_findings.sort();
        unique_findings.dedup();
        assert_eq!(unique_findings.len(), 2);
    }

    #[tokio::test]
    async fn test_shuffled_inputs_produce_identical_verdicts() {
        let engine = engine();

        let claims = scenario_a_claims();
        let findings = scenario_a_findings();
        let mut shuffled_claims = claims.clone();
        shuffled_claims.reverse();
        let mut shuffled_findings = findings.clone();
        shuffled_findings.reverse();

        let first = engine.adjudicate(&claims, &findings, &[]).await;
        let second = engine
            .adjudicate(&shuffled_claims, &shuffled_findings, &[])
            .await;

        let summarize = |result: &EpisodeResult| -> Vec<(Option<String>, Option<String>, MatchTier)> {
            result
                .verdicts
                .iter()
                .map(|v| (v.claim_id.clone(), v.finding_id.clone(), v.tier))
                .collect()
        };

        assert_eq!(summarize(&first), summarize(&second));
    }

    #[tokio::test]
    async fn test_zero_claims_three_findings() {
        let findings = vec![
            finding("F1", "network", "aws_sg.web", "high", "Open ingress", ""),
            finding("F2", "logging", "aws_s3_bucket.logs", "low", "No access logs", ""),
            finding("F3", "encryption", "aws_db_instance.db", "high", "No encryption", ""),
        ];

        let result = engine().adjudicate(&[], &findings, &[]).await;

        assert_eq!(result.counts.false_positives, 3);
        assert!(result.rates.precision.abs() < 1e-9);
        assert!(result.rates.recall.abs() < 1e-9);
        assert_eq!(result.verdicts.len(), 3);
        assert!(result
            .verdicts
            .iter()
            .all(|v| v.tier == MatchTier::FalseAlarm));
    }

    #[tokio::test]
    async fn test_empty_episode() {
        let result = engine().adjudicate(&[], &[], &[]).await;

        assert!(result.verdicts.is_empty());
        assert!(result.rates.precision.abs() < 1e-9);
        assert!(result.rates.recall.abs() < 1e-9);
        assert!(result.reliability.is_none());
    }

    #[tokio::test]
    async fn test_multi_rater_consensus_and_reliability() {
        let mut config = EngineConfig::default();
        config.escalation.enabled = true;

        let engine = AdjudicationService::with_raters(
            config,
            vec![
                Arc::new(ScriptedRater::new("rater-a", true, 0.9)),
                Arc::new(ScriptedRater::new("rater-b", true, 0.7)),
                Arc::new(ScriptedRater::new("rater-c", false, 0.8)),
            ],
        )
        .expect("valid config");

        let claims = vec![claim(
            "V1",
            "secrets",
            "aws_secretsmanager_secret.app",
            "",
            "No automatic secret rotation",
            "",
        )];
        let findings = vec![finding(
            "F1",
            "secrets",
            "",
            "",
            "No Secret Rotation Configured",
            "",
        )];

        let result = engine.adjudicate(&claims, &findings, &[]).await;

        assert_eq!(result.counts.true_positives, 1);

        let reliability = result.reliability.expect("multi-rater stats");
        assert_eq!(reliability.raters.len(), 3);
        assert_eq!(reliability.pairwise_kappa.len(), 3);
        assert_eq!(reliability.judged_pairs, 1);
        // One pair, raters split 2/1: not unanimous
        assert!(reliability.unanimous_agreement_rate.abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_escalation_enabled_without_raters_fails_fast() {
        let mut config = EngineConfig::default();
        config.escalation.enabled = true;

        assert!(matches!(
            AdjudicationService::new(config),
            Err(ConfigError::EscalationWithoutRaters)
        ));
    }
}
