use std::collections::BTreeMap;

use converge_model::TerminologyRegistry;

/// Read-only inputs shared by every fix function for the duration of a run.
#[derive(Clone, Copy)]
pub struct FixContext<'a> {
    pub study_id: &'a str,
    pub terminology: &'a TerminologyRegistry,
    /// Constant-valued columns that may be created when missing
    /// (variable name -> constant value), e.g. STUDYID -> the study id.
    pub constants: &'a BTreeMap<String, String>,
}

impl<'a> FixContext<'a> {
    /// Look up the configured constant for a variable, case-insensitively.
    pub fn constant_for(&self, variable: &str) -> Option<&str> {
        self.constants
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(variable))
            .map(|(_, value)| value.as_str())
    }
}
