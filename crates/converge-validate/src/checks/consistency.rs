//! Cross-variable consistency: --STDTC must not be after --ENDTC.
//!
//! ISO 8601 values of equal precision compare correctly as strings; rows
//! where either side is blank or the precisions differ are left alone.

use std::collections::BTreeSet;

use anyhow::Result;

use converge_model::{
    CaseInsensitiveLookup, DomainData, Finding, RuleCategory, Severity, column_trimmed_values,
    rules,
};

use crate::checks::sample;
use crate::evaluator::{RuleContext, RuleEvaluator};

pub struct StartEndOrder;

impl RuleEvaluator for StartEndOrder {
    fn rule_id(&self) -> &str {
        rules::START_END_ORDER
    }

    fn description(&self) -> &str {
        "Start date/time is after end date/time"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Consistency
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
        for column in data.dataset.get_column_names() {
            let start_column = column.to_string();
            let upper = start_column.to_uppercase();
            if !upper.ends_with("STDTC") {
                continue;
            }
            let end_name = format!("{}ENDTC", &upper[..upper.len() - "STDTC".len()]);
            let Some(end_column) = lookup.get(&end_name) else {
                continue;
            };
            let Some(starts) = column_trimmed_values(&data.dataset, &start_column) else {
                continue;
            };
            let Some(ends) = column_trimmed_values(&data.dataset, end_column) else {
                continue;
            };

            let mut offending = BTreeSet::new();
            let mut affected = 0u64;
            for (start, end) in starts.iter().zip(ends.iter()) {
                if start.is_empty() || end.is_empty() || start.len() != end.len() {
                    continue;
                }
                if start > end {
                    affected += 1;
                    if offending.len() < 5 {
                        offending.insert(format!("{start} > {end}"));
                    }
                }
            }
            if affected == 0 {
                continue;
            }
            let message = format!(
                "{start_column} is after {end_column} in {affected} row(s): {}",
                sample(&offending, 5)
            );
            findings.push(self.make_finding(
                domain,
                Some(start_column),
                message,
                affected,
                offending.into_iter().collect(),
            ));
        }
        Ok(findings)
    }
}
