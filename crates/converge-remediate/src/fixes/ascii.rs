//! ascii_substitute: replace non-portable characters with fixed ASCII
//! equivalents. Characters outside the table are left alone and keep the
//! finding alive for human review.

use std::collections::BTreeSet;

use anyhow::Result;
use polars::prelude::{AnyValue, NamedFrom, Series};

use converge_model::{CaseInsensitiveLookup, FixAction, FixType, any_to_string};

use crate::fixes::{FixInput, FixResult, action_timestamp, value_sample};

/// Fixed substitution table for common non-ASCII characters.
const SUBSTITUTIONS: &[(char, &str)] = &[
    ('\u{2018}', "'"),     // left single quote
    ('\u{2019}', "'"),     // right single quote
    ('\u{201C}', "\""),    // left double quote
    ('\u{201D}', "\""),    // right double quote
    ('\u{2013}', "-"),     // en dash
    ('\u{2014}', "-"),     // em dash
    ('\u{2026}', "..."),   // ellipsis
    ('\u{00A0}', " "),     // non-breaking space
    ('\u{00B5}', "u"),     // micro sign
    ('\u{03BC}', "u"),     // greek mu
    ('\u{00B0}', " deg"),  // degree sign
    ('\u{00B1}', "+/-"),   // plus-minus
    ('\u{2264}', "<="),    // less-than-or-equal
    ('\u{2265}', ">="),    // greater-than-or-equal
    ('\u{00D7}', "x"),     // multiplication sign
    ('\u{00F7}', "/"),     // division sign
    ('\u{03B1}', "alpha"), // greek alpha
    ('\u{03B2}', "beta"),  // greek beta
];

/// Apply the substitution table to one value.
pub(crate) fn substitute(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match SUBSTITUTIONS.iter().find(|(from, _)| *from == ch) {
            Some((_, replacement)) => out.push_str(replacement),
            None => out.push(ch),
        }
    }
    out
}

pub(crate) fn apply(input: &FixInput<'_>) -> Result<FixResult> {
    let finding = input.finding;
    let Some(variable_name) = finding.variable.as_deref() else {
        return Ok(FixResult::skipped("finding names no variable"));
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
        let replaced = substitute(&raw);
        if replaced != raw {
            changed += 1;
            if before.len() < 3 {
                before.insert(raw.clone());
                after.insert(replaced.clone());
            }
        }
        values.push(replaced);
    }

    if changed == 0 {
        return Ok(FixResult::skipped("no substitutable characters"));
    }

    let mut dataset = input.dataset.clone();
    dataset.with_column(Series::new(column.into(), values))?;
    let action = FixAction {
        rule_id: finding.rule_id.clone(),
        domain: input.domain.to_string(),
        variable: Some(variable_name.to_string()),
        fix_type: FixType::AsciiSubstitute,
        before_value: Some(value_sample(&before, 3)),
        after_value: Some(value_sample(&after, 3)),
        affected_count: changed,
        timestamp: action_timestamp(),
    };
    Ok(FixResult::Applied {
        dataset,
        spec: input.spec.clone(),
        action,
    })
}
