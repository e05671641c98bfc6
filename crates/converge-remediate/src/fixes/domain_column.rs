//! domain_column: create the DOMAIN column filled with the domain code, or
//! overwrite rows that disagree with it.

use std::collections::BTreeSet;

use anyhow::Result;
use polars::prelude::{AnyValue, NamedFrom, Series};

use converge_model::{CaseInsensitiveLookup, FixAction, FixType, any_to_string};

use crate::fixes::{FixInput, FixResult, action_timestamp, value_sample};

pub(crate) fn apply(input: &FixInput<'_>) -> Result<FixResult> {
    let domain = input.domain;
    let height = input.dataset.height();
    let lookup = CaseInsensitiveLookup::new(input.dataset.get_column_names_owned());

    let Some(column) = lookup.get("DOMAIN") else {
        // Column absent: create it filled with the domain code.
        let mut dataset = input.dataset.clone();
        let values = vec![domain.to_string(); height];
        dataset.with_column(Series::new("DOMAIN".into(), values))?;
        let action = FixAction {
            rule_id: input.finding.rule_id.clone(),
            domain: domain.to_string(),
            variable: Some("DOMAIN".to_string()),
            fix_type: FixType::DomainColumn,
            before_value: None,
            after_value: Some(domain.to_string()),
            affected_count: height as u64,
            timestamp: action_timestamp(),
        };
        return Ok(FixResult::Applied {
            dataset,
            spec: input.spec.clone(),
            action,
        });
    };

    let series = input.dataset.column(column)?;
    let mut values = Vec::with_capacity(height);
    let mut wrong = BTreeSet::new();
    let mut changed = 0u64;
    for idx in 0..height {
        let raw = any_to_string(series.get(idx).unwrap_or(AnyValue::Null));
        let trimmed = raw.trim();
        if trimmed == domain {
            values.push(raw);
            continue;
        }
        changed += 1;
        wrong.insert(trimmed.to_string());
        values.push(domain.to_string());
    }

    if changed == 0 {
        return Ok(FixResult::skipped("DOMAIN already consistent"));
    }

    let mut dataset = input.dataset.clone();
    dataset.with_column(Series::new(column.into(), values))?;
    let action = FixAction {
        rule_id: input.finding.rule_id.clone(),
        domain: domain.to_string(),
        variable: Some("DOMAIN".to_string()),
        fix_type: FixType::DomainColumn,
        before_value: Some(value_sample(&wrong, 5)),
        after_value: Some(domain.to_string()),
        affected_count: changed,
        timestamp: action_timestamp(),
    };
    Ok(FixResult::Applied {
        dataset,
        spec: input.spec.clone(),
        action,
    })
}
