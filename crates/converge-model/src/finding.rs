use serde::{Deserialize, Serialize};

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Notice,
}

/// Category of the rule that produced a finding.
///
/// Categories follow the P21 rule taxonomy: terminology, presence, format,
/// length, encoding, consistency, cross-reference, and metadata checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RuleCategory {
    /// Controlled terminology validation (CT2xxx rules).
    Terminology,
    /// Variable presence checks.
    Presence,
    /// Data format validation (ISO 8601).
    Format,
    /// Name, label, and value length limits.
    Length,
    /// Character encoding portability.
    Encoding,
    /// Cross-variable consistency checks.
    Consistency,
    /// Cross-domain reference validation.
    CrossReference,
    /// Dataset metadata checks (file naming).
    Metadata,
}

impl RuleCategory {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Terminology => "Terminology",
            Self::Presence => "Presence",
            Self::Format => "Format",
            Self::Length => "Length",
            Self::Encoding => "Encoding",
            Self::Consistency => "Consistency",
            Self::CrossReference => "Cross-reference",
            Self::Metadata => "Metadata",
        }
    }
}

/// One reported deviation of a dataset from an expected rule.
///
/// Findings are immutable once produced. The `offending_values` list carries
/// the actual out-of-spec values in structured form so downstream logic never
/// has to re-parse the rendered `message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Rule identifier (e.g., "CT2001").
    pub rule_id: String,
    /// What the rule checks.
    pub description: String,
    pub category: RuleCategory,
    pub severity: Severity,
    /// Domain code the finding was raised against.
    pub domain: String,
    /// Variable name, when the finding concerns a single variable.
    pub variable: Option<String>,
    /// Human-readable message describing the deviation.
    pub message: String,
    /// Number of rows (or values) affected.
    pub affected_count: u64,
    /// The distinct out-of-spec values, when the rule concerns values.
    #[serde(default)]
    pub offending_values: Vec<String>,
    /// Optional hint at the deterministic repair.
    pub fix_suggestion: Option<String>,
    /// Known false positive: still reported, excluded from effective counts.
    #[serde(default)]
    pub known_false_positive: bool,
    /// Cross-reference into an external rule catalog (e.g., FDA rule id).
    pub external_cross_reference: Option<String>,
}
