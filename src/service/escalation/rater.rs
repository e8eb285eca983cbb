//! Semantic rater capability interface and implementations
//!
//! A rater is anything that can judge whether one claim and one finding
//! describe the same underlying defect. The engine only depends on this
//! trait, so matching and tiering stay fully testable without any live
//! external dependency.

use async_trait::async_trait;
use rig::client::CompletionClient;

use crate::model::judgment::{ExtractedJudgment, RaterJudgment};
use crate::model::records::{Claim, Finding};
use crate::service::escalation::error::EscalationError;
use crate::service::escalation::prompts::{JUDGMENT_SYSTEM_PROMPT, build_judgment_prompt};
use crate::service::escalation::validation::validate_judgment;
use crate::service::llm::LlmClient;

/// A callable that judges one (claim, finding) pair
#[async_trait]
pub trait SemanticRater: Send + Sync {
    /// Stable name, used in judgments and reliability statistics
    fn name(&self) -> &str;

    async fn judge(
        &self,
        claim: &Claim,
        finding: &Finding,
    ) -> Result<RaterJudgment, EscalationError>;
}

/// LLM-backed rater using the rig extractor API
pub struct LlmRater {
    llm_client: LlmClient,
    model: String,
    name: String,
}

impl LlmRater {
    /// Create a rater for the given model id. The model id doubles as the
    /// rater name, so a multi-provider panel reads naturally in the stats.
    pub fn new(llm_client: LlmClient, model: impl Into<String>) -> Self {
        let model = model.into();
        let name = format!("llm:{}", model);

        tracing::info!(model = %model, "Semantic rater initialized");

        Self {
            llm_client,
            model,
            name,
        }
    }
}

#[async_trait]
impl SemanticRater for LlmRater {
    fn name(&self) -> &str {
        &self.name
    }

    async fn judge(
        &self,
        claim: &Claim,
        finding: &Finding,
    ) -> Result<RaterJudgment, EscalationError> {
        let prompt = build_judgment_prompt(claim, finding);
        let prompt_length = prompt.len();

        tracing::debug!(
            claim = %claim.id,
            finding = %finding.id,
            model = %self.model,
            prompt_length = prompt_length,
            "Initiating OpenAI API call for match judgment"
        );

        let start_time = std::time::Instant::now();

        // Use temperature=0.0 for deterministic, reproducible judgments
        let extractor = self
            .llm_client
            .openai_client()
            .extractor::<ExtractedJudgment>(&self.model)
            .preamble(JUDGMENT_SYSTEM_PROMPT)
            .additional_params(serde_json::json!({
                "temperature": 0.0
            }))
            .build();

        let extracted = match extractor.extract(&prompt).await {
            Ok(result) => {
                let elapsed = start_time.elapsed();
                tracing::info!(
                    claim = %claim.id,
                    finding = %finding.id,
                    model = %self.model,
                    elapsed_ms = elapsed.as_millis(),
                    prompt_length = prompt_length,
                    "OpenAI API call for match judgment completed successfully"
                );
                result
            }
            Err(e) => {
                let elapsed = start_time.elapsed();
                tracing::error!(
                    claim = %claim.id,
                    finding = %finding.id,
                    model = %self.model,
                    elapsed_ms = elapsed.as_millis(),
                    prompt_length = prompt_length,
                    error = %e,
                    "OpenAI API call for match judgment failed"
                );
                return Err(EscalationError::RaterFailed {
                    rater: self.name.clone(),
                    message: e.to_string(),
                });
            }
        };

        let (judgment, validation) = validate_judgment(&self.name, extracted);
        if !validation.warnings.is_empty() {
            tracing::warn!(
                claim = %claim.id,
                finding = %finding.id,
                rater = %self.name,
                warnings = ?validation.warnings,
                "Match judgment produced quality warnings"
            );
        }

        Ok(judgment)
    }
}

/// Rule-only stub rater returning a fixed verdict. Used in tests and in
/// offline runs where no external judge is available.
pub struct ScriptedRater {
    name: String,
    matched: bool,
    confidence: f64,
}

impl ScriptedRater {
    pub fn new(name: impl Into<String>, matched: bool, confidence: f64) -> Self {
        Self {
            name: name.into(),
            matched,
            confidence,
        }
    }
}

#[async_trait]
impl SemanticRater for ScriptedRater {
    fn name(&self) -> &str {
        &self.name
    }

    async fn judge(
        &self,
        _claim: &Claim,
        _finding: &Finding,
    ) -> Result<RaterJudgment, EscalationError> {
        Ok(RaterJudgment {
            rater: self.name.clone(),
            matched: self.matched,
            confidence: self.confidence,
            rationale: "scripted verdict".to_string(),
        })
    }
}
