//! ISO 8601 format validation for --DTC variables.
//!
//! Partial dates are allowed: YYYY, YYYY-MM, YYYY-MM-DD, and datetime
//! precisions down to fractional seconds and timezone offsets.

use std::collections::BTreeSet;

use anyhow::Result;
use polars::prelude::AnyValue;
use regex::Regex;

use converge_model::{DomainData, Finding, RuleCategory, Severity, any_to_string, rules};

use crate::checks::sample;
use crate::evaluator::{RuleContext, RuleEvaluator};

const ISO8601_PATTERNS: &[&str] = &[
    r"^\d{4}$",                                              // YYYY
    r"^\d{4}-\d{2}$",                                        // YYYY-MM
    r"^\d{4}-\d{2}-\d{2}$",                                  // YYYY-MM-DD
    r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}$",                      // YYYY-MM-DDTHH:MM
    r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}$",                // YYYY-MM-DDTHH:MM:SS
    r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+$",           // fractional seconds
    r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}[+-]\d{2}:\d{2}$", // with timezone
];

/// --DTC values must be valid ISO 8601.
pub struct DatetimeFormat;

impl RuleEvaluator for DatetimeFormat {
    fn rule_id(&self) -> &str {
        rules::DATETIME_FORMAT
    }

    fn description(&self) -> &str {
        "Date/time value is not valid ISO 8601"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Format
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
        let patterns: Vec<Regex> = ISO8601_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<std::result::Result<_, _>>()?;

        let mut findings = Vec::new();
        for column in data.dataset.get_column_names() {
            let column = column.to_string();
            if !column.to_uppercase().ends_with("DTC") {
                continue;
            }
            let Ok(series) = data.dataset.column(&column) else {
                continue;
            };
            let mut offending = BTreeSet::new();
            let mut affected = 0u64;
            for idx in 0..data.dataset.height() {
                let raw = any_to_string(series.get(idx).unwrap_or(AnyValue::Null));
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if patterns.iter().any(|pattern| pattern.is_match(trimmed)) {
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
                "Variable {column} has {affected} value(s) not in ISO 8601 format: {}",
                sample(&offending, 5)
            );
            findings.push(self.make_finding(
                domain,
                Some(column),
                message,
                affected,
                offending.into_iter().collect(),
            ));
        }
        Ok(findings)
    }
}
