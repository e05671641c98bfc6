use std::collections::BTreeMap;

use polars::prelude::DataFrame;

use crate::spec::MappingSpec;

/// One domain's current state: the dataset and its mapping specification.
///
/// The engine operates on internal clones only; a caller's original is never
/// mutated.
#[derive(Debug, Clone)]
pub struct DomainData {
    pub dataset: DataFrame,
    pub spec: MappingSpec,
}

impl DomainData {
    pub fn new(dataset: DataFrame, spec: MappingSpec) -> Self {
        Self { dataset, spec }
    }

    pub fn row_count(&self) -> usize {
        self.dataset.height()
    }
}

/// The per-domain state at an iteration boundary, keyed by domain code.
pub type StudySnapshot = BTreeMap<String, DomainData>;
