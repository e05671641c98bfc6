//! ct_case_normalize: replace values matching a codelist term
//! case-insensitively (but not exactly) with the term's canonical form.

use std::collections::BTreeSet;

use anyhow::Result;
use polars::prelude::{AnyValue, NamedFrom, Series};

use converge_model::{CaseInsensitiveLookup, FixAction, FixType, any_to_string};

use crate::fixes::{FixInput, FixResult, action_timestamp, value_sample};

pub(crate) fn apply(input: &FixInput<'_>) -> Result<FixResult> {
    let finding = input.finding;
    let Some(variable_name) = finding.variable.as_deref() else {
        return Ok(FixResult::skipped("finding names no variable"));
    };
    let Some(variable) = input.spec.variable(variable_name) else {
        return Ok(FixResult::skipped(format!(
            "{variable_name} is not in the mapping spec"
        )));
    };
    let Some(codelist) = input.ctx.terminology.resolve_for_variable(variable) else {
        return Ok(FixResult::skipped(format!(
            "no codelist resolvable for {variable_name}"
        )));
    };
    let lookup = CaseInsensitiveLookup::new(input.dataset.get_column_names_owned());
    let Some(column) = lookup.get(variable_name) else {
        return Ok(FixResult::skipped(format!(
            "column {variable_name} not present"
        )));
    };
    let series = input.dataset.column(column)?;

    let mut values = Vec::with_capacity(input.dataset.height());
    let mut changed = 0u64;
    let mut before = BTreeSet::new();
    let mut after = BTreeSet::new();
    for idx in 0..input.dataset.height() {
        let raw = any_to_string(series.get(idx).unwrap_or(AnyValue::Null));
        let trimmed = raw.trim();
        match codelist.case_variant_of(trimmed) {
            Some(canonical) => {
                changed += 1;
                before.insert(trimmed.to_string());
                after.insert(canonical.to_string());
                values.push(canonical.to_string());
            }
            None => values.push(raw),
        }
    }

    if changed == 0 {
        return Ok(FixResult::skipped("values already canonical"));
    }

    let mut dataset = input.dataset.clone();
    dataset.with_column(Series::new(column.into(), values))?;
    let action = FixAction {
        rule_id: finding.rule_id.clone(),
        domain: input.domain.to_string(),
        variable: Some(variable_name.to_string()),
        fix_type: FixType::CtCaseNormalize,
        before_value: Some(value_sample(&before, 5)),
        after_value: Some(format!(
            "{} ({})",
            value_sample(&after, 5),
            codelist.code
        )),
        affected_count: changed,
        timestamp: action_timestamp(),
    };
    Ok(FixResult::Applied {
        dataset,
        spec: input.spec.clone(),
        action,
    })
}
