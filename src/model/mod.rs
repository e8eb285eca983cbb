pub mod config;
pub mod judgment;
pub mod records;
pub mod verdict;

pub use config::{ConfigError, EngineConfig, EscalationConfig, ScoreWeights, Taxonomy, TierBands};
pub use judgment::{ExtractedJudgment, ExtractedVerdict, RaterJudgment};
pub use records::{Category, Claim, CorroborationRecord, Finding, Severity};
pub use verdict::{
    EpisodeCounts, EpisodeRates, EpisodeResult, MatchTier, PairwiseKappa, ReliabilityStats,
    Verdict,
};
