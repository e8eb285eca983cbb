//! Prompts for semantic match judgment

use crate::model::records::{Claim, Finding};

/// System prompt for semantic match judgment
pub const JUDGMENT_SYSTEM_PROMPT: &str = r#"You are an impartial judge in a security detection benchmark. You are given one defect an attacker claims to have embedded in an infrastructure artifact, and one defect a defender reported after inspecting that artifact. Rule-based matching could not decide whether they describe the same underlying issue.

## Critical Rules

1. **Judge the underlying issue, not the wording.**
   - "No automatic secret rotation" and "Secret rotation not configured" describe the same issue.
   - Two different misconfigurations on the same resource are NOT the same issue.

2. **The resource matters.**
   - The same weakness on two different resources is a no-match.
   - Minor naming differences for the same resource (aliases, prefixes) do not break a match.

3. **Severity wording is irrelevant.**
   - Do not reward or punish agreement on severity labels.

## Output Requirements

- verdict: "match" if both texts describe the same underlying defect, "no_match" otherwise
- confidence: your confidence in the verdict, between 0.0 and 1.0
- rationale: one or two direct, factual sentences naming the shared or differing defect
  - BAD: "This finding seems to relate to the claim..."
  - GOOD: "Both describe missing rotation on the same secrets-manager secret."

When uncertain, prefer "no_match" with lower confidence: an unearned match inflates the defender's score."#;

/// Build the judgment prompt for one claim/finding pair
pub fn build_judgment_prompt(claim: &Claim, finding: &Finding) -> String {
    format!(
        r#"Decide whether the following claimed defect and reported finding describe the same underlying issue.

## Claimed defect (attacker ground truth)
- Category: {}
- Resource: {}
- Severity: {}
- Title: {}
- Description: {}
- Vulnerable attribute: {}
- Evidence: {}

## Reported finding (defender)
- Category: {}
- Resource: {}
- Severity: {}
- Title: {}
- Description: {}
- Evidence: {}
- Defender confidence: {:.2}

Return structured JSON with:
- verdict: match | no_match
- confidence: 0.0 to 1.0
- rationale: direct, factual explanation"#,
        claim.category,
        claim.resource,
        claim.severity,
        claim.title,
        claim.description,
        claim.attribute,
        claim.evidence,
        finding.category,
        finding.resource,
        finding.severity,
        finding.title,
        finding.description,
        finding.evidence,
        finding.confidence,
    )
}
