//! Controlled terminology checks.
//!
//! A value deviates when its exact string is not a submission value of the
//! resolved codelist. Case variants and synonyms count as deviations too:
//! the dataset must carry the canonical submission value.

use std::collections::BTreeSet;

use anyhow::Result;
use polars::prelude::AnyValue;

use converge_model::{
    CaseInsensitiveLookup, Codelist, DomainData, Finding, RuleCategory, Severity, VariableType,
    any_to_string, rules,
};

use crate::checks::sample;
use crate::evaluator::{RuleContext, RuleEvaluator};

/// Deviations from non-extensible codelists (errors).
pub struct NonExtensibleTerminology;

/// Deviations from extensible codelists (warnings; sponsors may extend).
pub struct ExtensibleTerminology;

impl RuleEvaluator for NonExtensibleTerminology {
    fn rule_id(&self) -> &str {
        rules::CT_NON_EXTENSIBLE
    }

    fn description(&self) -> &str {
        "Value not found in non-extensible codelist"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Terminology
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn evaluate(
        &self,
        domain: &str,
        data: &DomainData,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Finding>> {
        Ok(check_terminology(self, false, domain, data, ctx))
    }
}

impl RuleEvaluator for ExtensibleTerminology {
    fn rule_id(&self) -> &str {
        rules::CT_EXTENSIBLE
    }

    fn description(&self) -> &str {
        "Value not found in extensible codelist"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Terminology
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(
        &self,
        domain: &str,
        data: &DomainData,
        ctx: &RuleContext<'_>,
    ) -> Result<Vec<Finding>> {
        Ok(check_terminology(self, true, domain, data, ctx))
    }
}

fn check_terminology(
    evaluator: &dyn RuleEvaluator,
    extensible: bool,
    domain: &str,
    data: &DomainData,
    ctx: &RuleContext<'_>,
) -> Vec<Finding> {
    let lookup = CaseInsensitiveLookup::new(data.dataset.get_column_names_owned());
    let mut findings = Vec::new();

    for variable in &data.spec.variables {
        if variable.data_type != VariableType::Char {
            continue;
        }
        let Some(codelist) = ctx.terminology.resolve_for_variable(variable) else {
            continue;
        };
        if codelist.extensible != extensible {
            continue;
        }
        let Some(column) = lookup.get(&variable.name) else {
            continue;
        };
        let Ok(series) = data.dataset.column(column) else {
            continue;
        };

        let submission_values: BTreeSet<&str> =
            codelist.submission_values().into_iter().collect();
        let mut offending = BTreeSet::new();
        let mut affected = 0u64;
        for idx in 0..data.dataset.height() {
            let raw = any_to_string(series.get(idx).unwrap_or(AnyValue::Null));
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !submission_values.contains(trimmed) {
                offending.insert(trimmed.to_string());
                affected += 1;
            }
        }

        if offending.is_empty() {
            continue;
        }

        findings.push(terminology_finding(
            evaluator, domain, variable.name.as_str(), codelist, offending, affected,
        ));
    }

    findings
}

fn terminology_finding(
    evaluator: &dyn RuleEvaluator,
    domain: &str,
    variable: &str,
    codelist: &Codelist,
    offending: BTreeSet<String>,
    affected: u64,
) -> Finding {
    let message = format!(
        "Variable value not found in codelist. {} contains {} value(s) not found in {} ({}). values: {}",
        variable,
        offending.len(),
        codelist.name,
        codelist.code,
        sample(&offending, 5)
    );
    let mut finding = evaluator.make_finding(
        domain,
        Some(variable.to_string()),
        message,
        affected,
        offending.into_iter().collect(),
    );
    finding.external_cross_reference = Some(codelist.code.clone());
    finding
}
