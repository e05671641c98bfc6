use std::collections::BTreeSet;

use anyhow::Result;
use polars::prelude::AnyValue;

use converge_model::{
    CaseInsensitiveLookup, DomainData, Finding, RuleCategory, Severity, VariableType,
    any_to_string, rules,
};

use crate::checks::sample;
use crate::evaluator::{RuleContext, RuleEvaluator};

/// Character variables must contain only ASCII for transport portability.
pub struct NonAscii;

impl RuleEvaluator for NonAscii {
    fn rule_id(&self) -> &str {
        rules::NON_ASCII
    }

    fn description(&self) -> &str {
        "Non-ASCII character in character variable"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Encoding
    }

    fn severity(&self) -> Severity {
        Severity::Warning
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
            if variable.data_type != VariableType::Char {
                continue;
            }
            let Some(column) = lookup.get(&variable.name) else {
                continue;
            };
            let Ok(series) = data.dataset.column(column) else {
                continue;
            };
            let mut offending_chars = BTreeSet::new();
            let mut affected = 0u64;
            for idx in 0..data.dataset.height() {
                let value = any_to_string(series.get(idx).unwrap_or(AnyValue::Null));
                if value.is_ascii() {
                    continue;
                }
                affected += 1;
                for ch in value.chars().filter(|ch| !ch.is_ascii()) {
                    offending_chars.insert(ch.to_string());
                }
            }
            if affected == 0 {
                continue;
            }
            let message = format!(
                "Variable {} has {} value(s) with non-ASCII character(s): {}",
                variable.name,
                affected,
                sample(&offending_chars, 5)
            );
            findings.push(self.make_finding(
                domain,
                Some(variable.name.clone()),
                message,
                affected,
                offending_chars.into_iter().collect(),
            ));
        }
        Ok(findings)
    }
}
