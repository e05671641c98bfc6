//! constant_column: create a missing column filled with its configured
//! constant (e.g., STUDYID with the study identifier).

use anyhow::Result;
use polars::prelude::{NamedFrom, Series};

use converge_model::{CaseInsensitiveLookup, FixAction, FixType};

use crate::fixes::{FixInput, FixResult, action_timestamp};

pub(crate) fn apply(input: &FixInput<'_>) -> Result<FixResult> {
    let finding = input.finding;
    let Some(variable_name) = finding.variable.as_deref() else {
        return Ok(FixResult::skipped("finding names no variable"));
    };
    let Some(constant) = input.ctx.constant_for(variable_name) else {
        return Ok(FixResult::skipped(format!(
            "no constant configured for {variable_name}"
        )));
    };
    let lookup = CaseInsensitiveLookup::new(input.dataset.get_column_names_owned());
    if lookup.contains(variable_name) {
        return Ok(FixResult::skipped(format!(
            "column {variable_name} already present"
        )));
    }

    let height = input.dataset.height();
    let mut dataset = input.dataset.clone();
    let values = vec![constant.to_string(); height];
    dataset.with_column(Series::new(variable_name.into(), values))?;
    let action = FixAction {
        rule_id: finding.rule_id.clone(),
        domain: input.domain.to_string(),
        variable: Some(variable_name.to_string()),
        fix_type: FixType::ConstantColumn,
        before_value: None,
        after_value: Some(constant.to_string()),
        affected_count: height as u64,
        timestamp: action_timestamp(),
    };
    Ok(FixResult::Applied {
        dataset,
        spec: input.spec.clone(),
        action,
    })
}
