use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableType {
    Char,
    Num,
}

/// Expected shape of one dataset column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableSpec {
    /// Canonical variable name (e.g., "AETERM").
    pub name: String,
    pub label: Option<String>,
    pub data_type: VariableType,
    /// Defined maximum length for Char variables.
    pub length: Option<u32>,
    /// Codelist NCI code(s); multiple codes are separated by ';'.
    pub codelist_code: Option<String>,
    /// Core designation from the implementation guide (Req/Exp/Perm).
    pub core: Option<String>,
}

impl VariableSpec {
    pub fn is_required(&self) -> bool {
        matches!(
            self.core.as_deref().map(str::trim),
            Some(core) if core.eq_ignore_ascii_case("req")
        )
    }
}

/// The mapping specification accompanying one domain dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingSpec {
    /// Domain code (e.g., "AE").
    pub domain: String,
    pub label: Option<String>,
    /// Canonical output dataset name (e.g., "ae"), when already decided.
    pub dataset_name: Option<String>,
    pub variables: Vec<VariableSpec>,
}

impl MappingSpec {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            label: None,
            dataset_name: None,
            variables: Vec::new(),
        }
    }

    /// Find a variable spec by canonical name (case-insensitive).
    pub fn variable(&self, name: &str) -> Option<&VariableSpec> {
        self.variables
            .iter()
            .find(|variable| variable.name.eq_ignore_ascii_case(name))
    }

    pub fn variable_mut(&mut self, name: &str) -> Option<&mut VariableSpec> {
        self.variables
            .iter_mut()
            .find(|variable| variable.name.eq_ignore_ascii_case(name))
    }

    /// Rename a variable in the spec, returning whether an entry changed.
    pub fn rename_variable(&mut self, from: &str, to: &str) -> bool {
        match self.variable_mut(from) {
            Some(variable) => {
                variable.name = to.to_string();
                true
            }
            None => false,
        }
    }
}
