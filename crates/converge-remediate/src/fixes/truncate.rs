//! truncate_name / truncate_label: bring over-long variable names and labels
//! within the transport limits.
//!
//! Name collisions resolve deterministically by replacing the last prefix
//! character with an incrementing digit; when no candidate is free the fix
//! declines and the finding persists.

use anyhow::Result;

use converge_model::{CaseInsensitiveLookup, FixAction, FixType, rules};

use crate::fixes::{FixInput, FixResult, action_timestamp};

pub(crate) fn apply_name(input: &FixInput<'_>) -> Result<FixResult> {
    let finding = input.finding;
    let Some(variable_name) = finding.variable.as_deref() else {
        return Ok(FixResult::skipped("finding names no variable"));
    };
    if variable_name.chars().count() <= rules::NAME_MAX_LENGTH {
        return Ok(FixResult::skipped("name already within limit"));
    }
    let lookup = CaseInsensitiveLookup::new(input.dataset.get_column_names_owned());
    let Some(target) = free_truncated_name(variable_name, &lookup, input) else {
        return Ok(FixResult::skipped("no free truncated name available"));
    };

    let mut dataset = input.dataset.clone();
    if let Some(column) = lookup.get(variable_name) {
        let column = column.to_string();
        dataset.rename(&column, target.as_str().into())?;
    }
    let mut spec = input.spec.clone();
    spec.rename_variable(variable_name, &target);

    let action = FixAction {
        rule_id: finding.rule_id.clone(),
        domain: input.domain.to_string(),
        variable: Some(variable_name.to_string()),
        fix_type: FixType::TruncateName,
        before_value: Some(variable_name.to_string()),
        after_value: Some(target),
        affected_count: 0,
        timestamp: action_timestamp(),
    };
    Ok(FixResult::Applied {
        dataset,
        spec,
        action,
    })
}

/// The length-limited prefix, or prefix + digit on collision.
fn free_truncated_name(
    name: &str,
    columns: &CaseInsensitiveLookup,
    input: &FixInput<'_>,
) -> Option<String> {
    let base: String = name.chars().take(rules::NAME_MAX_LENGTH).collect();
    if is_free(&base, columns, input) {
        return Some(base);
    }
    let stem: String = name.chars().take(rules::NAME_MAX_LENGTH - 1).collect();
    for digit in 1..=9u32 {
        let candidate = format!("{stem}{digit}");
        if is_free(&candidate, columns, input) {
            return Some(candidate);
        }
    }
    None
}

fn is_free(candidate: &str, columns: &CaseInsensitiveLookup, input: &FixInput<'_>) -> bool {
    !columns.contains(candidate) && input.spec.variable(candidate).is_none()
}

pub(crate) fn apply_label(input: &FixInput<'_>) -> Result<FixResult> {
    let finding = input.finding;
    let Some(variable_name) = finding.variable.as_deref() else {
        return Ok(FixResult::skipped("finding names no variable"));
    };
    let mut spec = input.spec.clone();
    let Some(variable) = spec.variable_mut(variable_name) else {
        return Ok(FixResult::skipped(format!(
            "{variable_name} is not in the mapping spec"
        )));
    };
    let Some(label) = variable.label.clone() else {
        return Ok(FixResult::skipped("variable has no label"));
    };
    if label.chars().count() <= rules::LABEL_MAX_LENGTH {
        return Ok(FixResult::skipped("label already within limit"));
    }

    let truncated: String = label
        .chars()
        .take(rules::LABEL_MAX_LENGTH)
        .collect::<String>()
        .trim_end()
        .to_string();
    variable.label = Some(truncated.clone());

    let action = FixAction {
        rule_id: finding.rule_id.clone(),
        domain: input.domain.to_string(),
        variable: Some(variable_name.to_string()),
        fix_type: FixType::TruncateLabel,
        before_value: Some(label),
        after_value: Some(truncated),
        affected_count: 0,
        timestamp: action_timestamp(),
    };
    Ok(FixResult::Applied {
        dataset: input.dataset.clone(),
        spec,
        action,
    })
}
