use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Finding severity, ordered so escalation is a plain `max`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Weight used by the risk-score formula.
    pub fn weight(self) -> f64 {
        match self {
            Severity::Critical => 10.0,
            Severity::High => 7.0,
            Severity::Medium => 4.0,
            Severity::Low => 2.0,
        }
    }

    /// Parse a raw severity string. Case-insensitive; anything outside
    /// the finite enum is a schema violation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw reported issue, exactly as produced by the scanning engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFinding {
    pub rule_id: String,
    pub title: String,
    pub severity: String,
    pub score: f64,
    pub endpoint: String,
    pub method: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub evidence: Option<serde_json::Map<String, serde_json::Value>>,
}

/// The raw scan document handed to the normalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawScan {
    #[serde(default)]
    pub scan_id: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    pub findings: Vec<RawFinding>,
}

/// A validated finding. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub title: String,
    pub severity: Severity,
    pub score: f64,
    pub endpoint: String,
    pub method: String,
    pub description: String,
    pub evidence: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Finding {
    /// Validate one raw finding against the schema. `index` is the
    /// finding's position in the scan, reported on failure.
    pub fn validate(index: usize, raw: &RawFinding) -> Result<Self, ValidationError> {
        if raw.rule_id.trim().is_empty() {
            return Err(ValidationError::EmptyRuleId { index });
        }
        if !raw.score.is_finite() || raw.score < 0.0 || raw.score > 10.0 {
            return Err(ValidationError::InvalidScore {
                index,
                value: raw.score,
            });
        }
        let severity = Severity::parse(&raw.severity).ok_or_else(|| {
            ValidationError::UnknownSeverity {
                index,
                value: raw.severity.clone(),
            }
        })?;
        Ok(Finding {
            rule_id: raw.rule_id.clone(),
            title: raw.title.clone(),
            severity,
            score: raw.score,
            endpoint: raw.endpoint.clone(),
            method: raw.method.clone(),
            description: raw.description.clone(),
            evidence: raw.evidence.clone(),
        })
    }
}
