//! Adjudication engine for adversarial IaC detection benchmarks
//!
//! One process (the attacker) produces an infrastructure artifact plus a
//! private manifest of defects it claims to have embedded; another (the
//! defender) independently inspects the artifact and reports findings.
//! This crate reconciles the two lists: it scores every claim/finding
//! pair, computes a globally optimal one-to-one assignment, classifies
//! each pair into a confidence tier (optionally corroborated by
//! third-party scanner output), escalates ambiguous pairs to one or more
//! semantic raters, and derives precision/recall/F1/evasion metrics plus
//! inter-rater reliability.
//!
//! The engine is a pure library: it owns no I/O besides the rater calls
//! the caller configures, persists nothing between episodes, and leaves
//! serialization of the [`model::EpisodeResult`] to its consumers.
//!
//! ```no_run
//! use iac_eval_adjudicator::model::EngineConfig;
//! use iac_eval_adjudicator::service::AdjudicationService;
//!
//! # async fn run() {
//! let engine = AdjudicationService::new(EngineConfig::default()).unwrap();
//! let result = engine.adjudicate(&[], &[], &[]).await;
//! assert!(result.verdicts.is_empty());
//! # }
//! ```

pub mod model;
pub mod service;

pub use model::{
    Claim, ConfigError, CorroborationRecord, EngineConfig, EpisodeResult, Finding, MatchTier,
    ReliabilityStats, Verdict,
};
pub use service::escalation::{LlmRater, ScriptedRater, SemanticRater};
pub use service::{AdjudicationService, LlmClient};
