use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::model::records::{Category, Severity};

/// Tolerance when checking that score weights sum to 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Configuration errors are programmer/operator mistakes and fail engine
/// construction before any episode is processed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("score weights must sum to 1.0, got {0}")]
    WeightSum(f64),

    #[error("score weight '{name}' must be in [0,1], got {value}")]
    WeightRange { name: &'static str, value: f64 },

    #[error("tier threshold '{name}' must be in [0,1], got {value}")]
    ThresholdRange { name: &'static str, value: f64 },

    #[error("tier bands are inverted: floor {floor} <= partial {partial} <= exact {exact} must hold")]
    InvertedBands { floor: f64, partial: f64, exact: f64 },

    #[error("partial resource factor must be in [0,1], got {0}")]
    PartialResourceFactor(f64),

    #[error("escalation is enabled but no semantic raters were provided")]
    EscalationWithoutRaters,
}

/// Relative weights of the pairwise scoring terms. Must sum to 1.0.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub resource: f64,
    pub category: f64,
    pub attribute: f64,
    pub keyword: f64,
    pub severity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            resource: 0.40,
            category: 0.20,
            attribute: 0.20,
            keyword: 0.10,
            severity: 0.10,
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.resource + self.category + self.attribute + self.keyword + self.severity
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("resource", self.resource),
            ("category", self.category),
            ("attribute", self.attribute),
            ("keyword", self.keyword),
            ("severity", self.severity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::WeightRange { name, value });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum(sum));
        }

        Ok(())
    }
}

/// Score bands that partition [0,1] into tiers.
///
/// Pairs below `min_score_floor` are never proposed by the assignment
/// solver. Scores in [floor, partial) are ambiguous and escalate; scores in
/// [partial, exact) are direct partial matches; scores >= exact are exact.
/// `partial_threshold` is the configurable split between "escalate" and
/// "direct partial".
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TierBands {
    pub min_score_floor: f64,
    pub partial_threshold: f64,
    pub exact_threshold: f64,
}

impl Default for TierBands {
    fn default() -> Self {
        Self {
            min_score_floor: 0.30,
            partial_threshold: 0.40,
            exact_threshold: 0.70,
        }
    }
}

impl TierBands {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("min_score_floor", self.min_score_floor),
            ("partial_threshold", self.partial_threshold),
            ("exact_threshold", self.exact_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdRange { name, value });
            }
        }

        if self.min_score_floor > self.partial_threshold
            || self.partial_threshold > self.exact_threshold
        {
            return Err(ConfigError::InvertedBands {
                floor: self.min_score_floor,
                partial: self.partial_threshold,
                exact: self.exact_threshold,
            });
        }

        Ok(())
    }
}

/// Semantic escalation settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    pub enabled: bool,
    /// Per rater call timeout
    pub timeout_secs: u64,
    /// How many ambiguous pairs may be escalated concurrently
    pub max_concurrent_pairs: usize,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_secs: 60,
            max_concurrent_pairs: 4,
        }
    }
}

/// Immutable category/severity tables, loaded once and passed explicitly
/// into the feature extractor and scorer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Taxonomy {
    /// Raw label -> canonical category
    pub category_synonyms: HashMap<String, Category>,
    /// Category pairs that earn half category credit
    pub related_categories: Vec<(Category, Category)>,
    /// Raw label -> severity
    pub severity_synonyms: HashMap<String, Severity>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        let category_synonyms = [
            ("encryption", Category::Encryption),
            ("data_protection", Category::DataProtection),
            ("access_control", Category::AccessControl),
            ("public_access", Category::AccessControl),
            ("iam", Category::IdentityPolicy),
            ("identity_policy", Category::IdentityPolicy),
            ("network", Category::Network),
            ("networking", Category::Network),
            ("logging", Category::Logging),
            ("audit_logging", Category::Logging),
            ("monitoring", Category::Monitoring),
            ("secrets", Category::Secrets),
            ("secrets_management", Category::Secrets),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let related_categories = vec![
            (Category::Encryption, Category::DataProtection),
            (Category::AccessControl, Category::IdentityPolicy),
            (Category::Network, Category::AccessControl),
            (Category::Logging, Category::Monitoring),
        ];

        let severity_synonyms = [
            ("low", Severity::Low),
            ("info", Severity::Low),
            ("informational", Severity::Low),
            ("medium", Severity::Medium),
            ("moderate", Severity::Medium),
            ("high", Severity::High),
            ("critical", Severity::Critical),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            category_synonyms,
            related_categories,
            severity_synonyms,
        }
    }
}

impl Taxonomy {
    /// Map a raw category label to its canonical category.
    /// Unknown labels fall back to `Uncategorized`.
    pub fn canonical_category(&self, raw: &str) -> Category {
        let key = raw.trim().to_lowercase().replace([' ', '-'], "_");
        self.category_synonyms
            .get(&key)
            .copied()
            .unwrap_or(Category::Uncategorized)
    }

    /// Whether two canonical categories are related (half category credit).
    /// Uncategorized is never related to anything.
    pub fn related(&self, a: Category, b: Category) -> bool {
        if a == Category::Uncategorized || b == Category::Uncategorized {
            return false;
        }
        self.related_categories
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Map a raw severity label to its ordinal severity.
    /// Unknown labels degrade to the neutral default (medium).
    pub fn severity(&self, raw: &str) -> Severity {
        self.severity_synonyms
            .get(raw.trim().to_lowercase().as_str())
            .copied()
            .unwrap_or(Severity::Medium)
    }
}

/// Complete engine configuration, passed in at construction and never
/// stored as global state.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: ScoreWeights,
    pub bands: TierBands,
    pub escalation: EscalationConfig,
    /// Credit multiplier for fuzzy (substring / same type segment) resource matches
    pub partial_resource_factor: Option<f64>,
    pub taxonomy: Taxonomy,
}

impl EngineConfig {
    pub const DEFAULT_PARTIAL_RESOURCE_FACTOR: f64 = 0.6;

    pub fn partial_resource_factor(&self) -> f64 {
        self.partial_resource_factor
            .unwrap_or(Self::DEFAULT_PARTIAL_RESOURCE_FACTOR)
    }

    /// Validate the configuration. Called at engine construction so that
    /// operator errors surface before any episode is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.bands.validate()?;

        let factor = self.partial_resource_factor();
        if !(0.0..=1.0).contains(&factor) {
            return Err(ConfigError::PartialResourceFactor(factor));
        }

        Ok(())
    }

    /// Parse configuration from a YAML document.
    /// Missing keys fall back to defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self, serde_yaml::Error> {
        let contents = contents.trim();
        if contents.is_empty() {
            tracing::debug!("Config document is empty, using defaults");
            return Ok(Self::default());
        }

        serde_yaml::from_str(contents)
    }
}
