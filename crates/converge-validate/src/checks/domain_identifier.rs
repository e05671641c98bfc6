use std::collections::BTreeSet;

use anyhow::Result;
use polars::prelude::AnyValue;

use converge_model::{
    CaseInsensitiveLookup, DomainData, Finding, RuleCategory, Severity, any_to_string, rules,
};

use crate::checks::sample;
use crate::evaluator::{RuleContext, RuleEvaluator};

/// DOMAIN column must exist and hold the domain code in every row.
pub struct DomainIdentifier;

impl RuleEvaluator for DomainIdentifier {
    fn rule_id(&self) -> &str {
        rules::DOMAIN_IDENTIFIER
    }

    fn description(&self) -> &str {
        "DOMAIN column missing or disagreeing with the domain code"
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
        let Some(column) = lookup.get("DOMAIN") else {
            let message = format!("DOMAIN column not found; expected every row to hold {domain}");
            return Ok(vec![self.make_finding(
                domain,
                Some("DOMAIN".to_string()),
                message,
                1,
                Vec::new(),
            )]);
        };

        let series = data.dataset.column(column)?;
        let mut offending = BTreeSet::new();
        let mut affected = 0u64;
        for idx in 0..data.dataset.height() {
            let raw = any_to_string(series.get(idx).unwrap_or(AnyValue::Null));
            let trimmed = raw.trim();
            if trimmed == domain {
                continue;
            }
            offending.insert(trimmed.to_string());
            affected += 1;
        }

        if affected == 0 {
            return Ok(Vec::new());
        }

        let message = format!(
            "DOMAIN disagrees with the domain code in {affected} row(s); expected {domain}, found: {}",
            sample(&offending, 5)
        );
        Ok(vec![self.make_finding(
            domain,
            Some("DOMAIN".to_string()),
            message,
            affected,
            offending.into_iter().collect(),
        )])
    }
}
