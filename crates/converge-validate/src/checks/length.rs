//! Transport length limits: variable names (8), labels (40), values (200 or
//! the spec-defined maximum, whichever is smaller).

use std::collections::BTreeSet;

use anyhow::Result;
use polars::prelude::AnyValue;

use converge_model::{
    CaseInsensitiveLookup, DomainData, Finding, RuleCategory, Severity, VariableType,
    any_to_string, rules,
};

use crate::evaluator::{RuleContext, RuleEvaluator};

/// Variable name exceeds the 8-character limit.
pub struct NameLength;

/// Variable label exceeds the 40-character limit.
pub struct LabelLength;

/// Character value exceeds its defined maximum length.
pub struct ValueLength;

impl RuleEvaluator for NameLength {
    fn rule_id(&self) -> &str {
        rules::NAME_LENGTH
    }

    fn description(&self) -> &str {
        "Variable name exceeds transport length limit"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Length
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
        let mut findings = Vec::new();
        for name in data.dataset.get_column_names() {
            let name = name.to_string();
            if name.chars().count() <= rules::NAME_MAX_LENGTH {
                continue;
            }
            let message = format!(
                "Variable name {} is longer than {} characters",
                name,
                rules::NAME_MAX_LENGTH
            );
            findings.push(self.make_finding(
                domain,
                Some(name.clone()),
                message,
                1,
                vec![name],
            ));
        }
        Ok(findings)
    }
}

impl RuleEvaluator for LabelLength {
    fn rule_id(&self) -> &str {
        rules::LABEL_LENGTH
    }

    fn description(&self) -> &str {
        "Variable label exceeds transport length limit"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Length
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
        let mut findings = Vec::new();
        for variable in &data.spec.variables {
            let Some(label) = variable.label.as_deref() else {
                continue;
            };
            if label.chars().count() <= rules::LABEL_MAX_LENGTH {
                continue;
            }
            let message = format!(
                "Label for {} is longer than {} characters ({} chars)",
                variable.name,
                rules::LABEL_MAX_LENGTH,
                label.chars().count()
            );
            findings.push(self.make_finding(
                domain,
                Some(variable.name.clone()),
                message,
                1,
                vec![label.to_string()],
            ));
        }
        Ok(findings)
    }
}

impl RuleEvaluator for ValueLength {
    fn rule_id(&self) -> &str {
        rules::VALUE_LENGTH
    }

    fn description(&self) -> &str {
        "Character value exceeds defined maximum length"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Length
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
            if variable.data_type != VariableType::Char {
                continue;
            }
            let limit = variable
                .length
                .map(|length| length as usize)
                .unwrap_or(rules::SAS_V5_MAX_LENGTH)
                .min(rules::SAS_V5_MAX_LENGTH);
            let Some(column) = lookup.get(&variable.name) else {
                continue;
            };
            let Ok(series) = data.dataset.column(column) else {
                continue;
            };
            let mut offending = BTreeSet::new();
            let mut affected = 0u64;
            for idx in 0..data.dataset.height() {
                let raw = any_to_string(series.get(idx).unwrap_or(AnyValue::Null));
                let trimmed = raw.trim();
                if trimmed.is_empty() || trimmed.chars().count() <= limit {
                    continue;
                }
                affected += 1;
                if offending.len() < 5 {
                    offending.insert(trimmed.to_string());
                }
            }
            if affected == 0 {
                continue;
            }
            let message = format!(
                "Variable value is longer than defined max length: {} exceeds length {} in {} value(s)",
                variable.name, limit, affected
            );
            findings.push(self.make_finding(
                domain,
                Some(variable.name.clone()),
                message,
                affected,
                offending.into_iter().collect(),
            ));
        }
        Ok(findings)
    }
}
