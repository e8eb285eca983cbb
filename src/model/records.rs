use serde::{Deserialize, Serialize};
use std::fmt;

// Describes one defect the attacker states it embedded in the artifact
// - category: raw category label as produced (canonicalized by the feature extractor)
// - resource: name of the affected artifact element
// - attribute: the specific attribute the defect lives in, if named
// - evidence: supporting text quoted from the artifact
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attribute: String,
    #[serde(default)]
    pub evidence: String,
}

// One defect the defender reports after inspecting the artifact.
// Same attribute shape as a Claim plus the defender's own confidence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub evidence: String,
    #[serde(default)]
    pub confidence: f64,
}

/// One result row from an independent third-party scanner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorroborationRecord {
    pub resource: String,
    /// Rule identifier or category tag emitted by the scanner
    #[serde(default)]
    pub rule: String,
    #[serde(default)]
    pub scanner: Option<String>,
}

/// Canonical defect taxonomy after synonym mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Encryption,
    DataProtection,
    AccessControl,
    IdentityPolicy,
    Network,
    Logging,
    Monitoring,
    Secrets,
    Uncategorized,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Encryption => "encryption",
            Category::DataProtection => "data_protection",
            Category::AccessControl => "access_control",
            Category::IdentityPolicy => "identity_policy",
            Category::Network => "network",
            Category::Logging => "logging",
            Category::Monitoring => "monitoring",
            Category::Secrets => "secrets",
            Category::Uncategorized => "uncategorized",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Ordinal rank used by the severity scoring term
    pub fn rank(self) -> u8 {
        match self {
            Severity::Low => 0,
            Severity::Medium => 1,
            Severity::High => 2,
            Severity::Critical => 3,
        }
    }
}
