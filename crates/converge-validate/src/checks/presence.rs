use anyhow::Result;

use converge_model::{
    CaseInsensitiveLookup, DomainData, Finding, RuleCategory, Severity, rules,
};

use crate::evaluator::{RuleContext, RuleEvaluator};

/// Required variables (core = Req) must be present as columns.
///
/// DOMAIN is excluded here; its presence and content are covered by the
/// domain-identifier rule.
pub struct RequiredPresence;

impl RuleEvaluator for RequiredPresence {
    fn rule_id(&self) -> &str {
        rules::REQUIRED_PRESENCE
    }

    fn description(&self) -> &str {
        "Required variable not found in dataset"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Presence
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn evaluate(
        &self,
        domain: &str,
        data: &DomainData,
        _ctx: &RuleContext<'_>,
    ) -> Result<Vec<Finding>> {
        let lookup = CaseInsensitiveLookup::new(data.dataset.get_column_names_owned());
        let mut findings = Vec::new();
        for variable in &data.spec.variables {
            if !variable.is_required() || variable.name.eq_ignore_ascii_case("DOMAIN") {
                continue;
            }
            if lookup.contains(&variable.name) {
                continue;
            }
            let message = format!("Required variable not found: {}", variable.name);
            findings.push(self.make_finding(
                domain,
                Some(variable.name.clone()),
                message,
                1,
                Vec::new(),
            ));
        }
        Ok(findings)
    }
}
