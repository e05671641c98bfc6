//! Cross-domain subject reference: every USUBJID must exist in DM.
//!
//! Reads the DM domain from the pass snapshot, never from same-iteration
//! partial updates.

use std::collections::BTreeSet;

use anyhow::Result;

use converge_model::{
    CaseInsensitiveLookup, DomainData, Finding, RuleCategory, Severity, column_trimmed_values,
    rules,
};

use crate::checks::sample;
use crate::evaluator::{RuleContext, RuleEvaluator};

pub struct SubjectReference;

impl RuleEvaluator for SubjectReference {
    fn rule_id(&self) -> &str {
        rules::SUBJECT_REFERENCE
    }

    fn description(&self) -> &str {
        "USUBJID value not present in the DM domain"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::CrossReference
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
        if domain.eq_ignore_ascii_case("DM") {
            return Ok(Vec::new());
        }
        let Some(dm) = ctx
            .snapshot
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case("DM"))
            .map(|(_, dm_data)| dm_data)
        else {
            return Ok(Vec::new());
        };

        let dm_lookup = CaseInsensitiveLookup::new(dm.dataset.get_column_names_owned());
        let Some(dm_column) = dm_lookup.get("USUBJID") else {
            return Ok(Vec::new());
        };
        let Some(dm_subjects) = column_trimmed_values(&dm.dataset, dm_column) else {
            return Ok(Vec::new());
        };
        let known: BTreeSet<&str> = dm_subjects
            .iter()
            .map(String::as_str)
            .filter(|subject| !subject.is_empty())
            .collect();

        let lookup = CaseInsensitiveLookup::new(data.dataset.get_column_names_owned());
        let Some(column) = lookup.get("USUBJID") else {
            return Ok(Vec::new());
        };
        let Some(subjects) = column_trimmed_values(&data.dataset, column) else {
            return Ok(Vec::new());
        };

        let mut offending = BTreeSet::new();
        let mut affected = 0u64;
        for subject in &subjects {
            if subject.is_empty() || known.contains(subject.as_str()) {
                continue;
            }
            affected += 1;
            offending.insert(subject.clone());
        }
        if affected == 0 {
            return Ok(Vec::new());
        }

        let message = format!(
            "USUBJID has {affected} value(s) not found in DM: {}",
            sample(&offending, 5)
        );
        Ok(vec![self.make_finding(
            domain,
            Some("USUBJID".to_string()),
            message,
            affected,
            offending.into_iter().collect(),
        )])
    }
}
