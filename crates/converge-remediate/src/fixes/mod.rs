//! Deterministic fix functions.
//!
//! Each fix is pure given `(dataset, spec, finding, context)` and returns an
//! explicit result: either a new dataset/spec with one audit action, or a
//! typed skip with a reason. Expected "cannot fix" outcomes are never errors.

pub(crate) mod ascii;
pub(crate) mod constant_column;
pub(crate) mod ct_case;
pub(crate) mod domain_column;
pub(crate) mod naming;
pub(crate) mod truncate;

use std::collections::BTreeSet;

use polars::prelude::DataFrame;

use converge_model::{Finding, FixAction, MappingSpec};

use crate::context::FixContext;

/// Everything a fix function sees.
pub struct FixInput<'a> {
    pub domain: &'a str,
    pub dataset: &'a DataFrame,
    pub spec: &'a MappingSpec,
    pub finding: &'a Finding,
    pub ctx: &'a FixContext<'a>,
}

/// Outcome of one fix attempt.
pub enum FixResult {
    /// The fix changed the dataset and/or spec; one audit action records it.
    Applied {
        dataset: DataFrame,
        spec: MappingSpec,
        action: FixAction,
    },
    /// Precondition unmet or nothing to change; the finding persists for the
    /// next pass. No audit entry is emitted.
    Skipped { reason: String },
}

impl FixResult {
    pub(crate) fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }
}

pub(crate) fn action_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Join up to `limit` sorted values for an audit sample.
pub(crate) fn value_sample(values: &BTreeSet<String>, limit: usize) -> String {
    values
        .iter()
        .take(limit)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}
