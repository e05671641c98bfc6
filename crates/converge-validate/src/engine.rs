//! Validation engine: runs every registered evaluator over one or many
//! domains, isolating evaluator failures.
//!
//! An evaluator error is converted at this boundary into a single synthetic
//! warning finding carrying the failing rule id; evaluation of the remaining
//! rules continues unaffected. No evaluator failure propagates past this
//! layer.

use tracing::{debug, warn};

use converge_model::{
    DomainData, Finding, RuleCategory, Severity, StudySnapshot, TerminologyRegistry,
};

use crate::checks;
use crate::evaluator::{RuleContext, RuleEvaluator};

pub struct ValidationEngine {
    evaluators: Vec<Box<dyn RuleEvaluator>>,
}

impl ValidationEngine {
    /// Create an engine with no registered rules.
    pub fn new() -> Self {
        Self {
            evaluators: Vec::new(),
        }
    }

    /// Create an engine with the default rule set registered.
    pub fn with_default_rules() -> Self {
        Self {
            evaluators: checks::default_evaluators(),
        }
    }

    /// Register an additional evaluator; rules run in registration order.
    pub fn register(&mut self, evaluator: Box<dyn RuleEvaluator>) {
        self.evaluators.push(evaluator);
    }

    pub fn evaluators(&self) -> &[Box<dyn RuleEvaluator>] {
        &self.evaluators
    }

    /// Run every registered evaluator against one domain.
    pub fn validate_domain(
        &self,
        domain: &str,
        data: &DomainData,
        ctx: &RuleContext<'_>,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();
        for evaluator in &self.evaluators {
            match evaluator.evaluate(domain, data, ctx) {
                Ok(batch) => findings.extend(batch),
                Err(error) => {
                    warn!(
                        domain = %domain,
                        rule_id = %evaluator.rule_id(),
                        error = %error,
                        "rule evaluation failed; reporting synthetic warning"
                    );
                    findings.push(evaluation_failure_finding(
                        evaluator.as_ref(),
                        domain,
                        &error,
                    ));
                }
            }
        }
        debug!(
            domain = %domain,
            findings = findings.len(),
            "domain validation pass complete"
        );
        findings
    }

    /// Validate every domain in the snapshot, in domain-code order.
    /// Each finding is tagged with the domain it was raised against.
    pub fn validate_all(
        &self,
        snapshot: &StudySnapshot,
        study_id: &str,
        terminology: &TerminologyRegistry,
    ) -> Vec<Finding> {
        let ctx = RuleContext {
            study_id,
            terminology,
            snapshot,
        };
        let mut findings = Vec::new();
        for (domain, data) in snapshot {
            findings.extend(self.validate_domain(domain, data, &ctx));
        }
        findings
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// AND-combination of the supplied filters; absent filters match everything.
pub fn filter_results(
    findings: &[Finding],
    category: Option<RuleCategory>,
    severity: Option<Severity>,
    domain: Option<&str>,
) -> Vec<Finding> {
    findings
        .iter()
        .filter(|finding| {
            category.is_none_or(|wanted| finding.category == wanted)
                && severity.is_none_or(|wanted| finding.severity == wanted)
                && domain.is_none_or(|wanted| finding.domain.eq_ignore_ascii_case(wanted))
        })
        .cloned()
        .collect()
}

fn evaluation_failure_finding(
    evaluator: &dyn RuleEvaluator,
    domain: &str,
    error: &anyhow::Error,
) -> Finding {
    Finding {
        rule_id: evaluator.rule_id().to_string(),
        description: evaluator.description().to_string(),
        category: evaluator.category(),
        severity: Severity::Warning,
        domain: domain.to_string(),
        variable: None,
        message: format!(
            "rule {} could not be evaluated: {error}",
            evaluator.rule_id()
        ),
        affected_count: 0,
        offending_values: Vec::new(),
        fix_suggestion: None,
        known_false_positive: false,
        external_cross_reference: None,
    }
}
