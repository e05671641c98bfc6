//! file_naming: record the canonical output dataset name in the spec.
//! Metadata-only; dataset rows are never touched.

use anyhow::Result;

use converge_model::{FixAction, FixType};

use crate::fixes::{FixInput, FixResult, action_timestamp};

pub(crate) fn apply(input: &FixInput<'_>) -> Result<FixResult> {
    let expected = input.domain.to_lowercase();
    if input.spec.dataset_name.as_deref() == Some(expected.as_str()) {
        return Ok(FixResult::skipped("dataset name already canonical"));
    }

    let mut spec = input.spec.clone();
    let before = spec.dataset_name.clone();
    spec.dataset_name = Some(expected.clone());

    let action = FixAction {
        rule_id: input.finding.rule_id.clone(),
        domain: input.domain.to_string(),
        variable: None,
        fix_type: FixType::FileNaming,
        before_value: before,
        after_value: Some(expected),
        affected_count: 0,
        timestamp: action_timestamp(),
    };
    Ok(FixResult::Applied {
        dataset: input.dataset.clone(),
        spec,
        action,
    })
}
