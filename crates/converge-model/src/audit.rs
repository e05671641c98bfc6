use serde::{Deserialize, Serialize};

/// The closed set of deterministic fixes the remediator can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixType {
    CtCaseNormalize,
    DomainColumn,
    ConstantColumn,
    TruncateName,
    TruncateLabel,
    AsciiSubstitute,
    FileNaming,
}

impl FixType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CtCaseNormalize => "ct_case_normalize",
            Self::DomainColumn => "domain_column",
            Self::ConstantColumn => "constant_column",
            Self::TruncateName => "truncate_name",
            Self::TruncateLabel => "truncate_label",
            Self::AsciiSubstitute => "ascii_substitute",
            Self::FileNaming => "file_naming",
        }
    }
}

/// Append-only audit record of one deterministic remediation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixAction {
    pub rule_id: String,
    pub domain: String,
    pub variable: Option<String>,
    pub fix_type: FixType,
    /// Sample of the values (or metadata) before the fix.
    pub before_value: Option<String>,
    /// Sample of the values (or metadata) after the fix.
    pub after_value: Option<String>,
    /// Number of dataset rows changed; 0 for metadata-only fixes.
    pub affected_count: u64,
    /// RFC 3339 timestamp of when the fix was applied.
    pub timestamp: String,
}

/// Whether a finding can be resolved without human judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationStatus {
    AutoFixable,
    NeedsHuman,
}

/// The classifier's verdict for one finding.
///
/// Never persisted as independent state: recomputing from the same finding
/// and spec always yields the same result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub status: ClassificationStatus,
    pub reason: String,
    pub suggested_fix: Option<FixType>,
}

impl Classification {
    pub fn auto(reason: impl Into<String>, fix: FixType) -> Self {
        Self {
            status: ClassificationStatus::AutoFixable,
            reason: reason.into(),
            suggested_fix: Some(fix),
        }
    }

    pub fn human(reason: impl Into<String>) -> Self {
        Self {
            status: ClassificationStatus::NeedsHuman,
            reason: reason.into(),
            suggested_fix: None,
        }
    }

    pub fn is_auto_fixable(&self) -> bool {
        self.status == ClassificationStatus::AutoFixable
    }
}
