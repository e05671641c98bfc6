use anyhow::Result;

use converge_model::{DomainData, Finding, RuleCategory, Severity, StudySnapshot, TerminologyRegistry};

/// Shared, read-only context for one validation pass.
///
/// `snapshot` is the per-domain state at the start of the pass; cross-domain
/// rules read other domains from here and never from partially-updated state.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub study_id: &'a str,
    pub terminology: &'a TerminologyRegistry,
    pub snapshot: &'a StudySnapshot,
}

/// One pluggable validation rule.
///
/// Evaluators inspect a single domain's dataset/spec pair and report zero or
/// more findings. Failures are returned as `Err` and converted into a
/// synthetic warning at the engine boundary; they never abort a pass.
pub trait RuleEvaluator: Send + Sync {
    fn rule_id(&self) -> &str;
    fn description(&self) -> &str;
    fn category(&self) -> RuleCategory;
    fn severity(&self) -> Severity;

    fn evaluate(
        &self,
        domain: &str,
        data: &DomainData,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Finding>>;

    /// Build a finding carrying this evaluator's rule metadata.
    fn make_finding(
        &self,
        domain: &str,
        variable: Option<String>,
        message: String,
        affected_count: u64,
        offending_values: Vec<String>,
    ) -> Finding {
        Finding {
            rule_id: self.rule_id().to_string(),
            description: self.description().to_string(),
            category: self.category(),
            severity: self.severity(),
            domain: domain.to_string(),
            variable,
            message,
            affected_count,
            offending_values,
            fix_suggestion: None,
            known_false_positive: false,
            external_cross_reference: None,
        }
    }
}
