//! Controlled terminology model.
//!
//! A codelist maps uppercase submission values to terms; synonyms map to the
//! canonical submission value. Extensibility decides issue severity:
//! non-extensible deviations are errors, extensible ones warnings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::spec::VariableSpec;

/// A single term within a codelist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    /// NCI concept code for this term (e.g., "C20197" for Male).
    pub code: String,
    /// The permissible value in datasets (e.g., "M").
    pub submission_value: String,
    /// Alternative spellings that normalize to `submission_value`.
    pub synonyms: Vec<String>,
    /// NCI preferred term.
    pub preferred_term: Option<String>,
}

/// A codelist containing multiple terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Codelist {
    /// NCI code for this codelist (e.g., "C66731" for Sex).
    pub code: String,
    /// Human-readable name (e.g., "Sex").
    pub name: String,
    /// Whether sponsors can add values not in this codelist.
    pub extensible: bool,
    /// Terms keyed by uppercase submission value.
    pub terms: BTreeMap<String, Term>,
    /// Synonym lookup: uppercase alias -> uppercase submission value.
    synonyms: BTreeMap<String, String>,
}

impl Codelist {
    pub fn new(code: impl Into<String>, name: impl Into<String>, extensible: bool) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            extensible,
            terms: BTreeMap::new(),
            synonyms: BTreeMap::new(),
        }
    }

    pub fn add_term(&mut self, term: Term) {
        let key = term.submission_value.to_uppercase();
        for synonym in &term.synonyms {
            let syn_key = synonym.to_uppercase();
            if syn_key != key {
                self.synonyms.insert(syn_key, key.clone());
            }
        }
        self.terms.insert(key, term);
    }

    /// All valid submission values.
    pub fn submission_values(&self) -> Vec<&str> {
        self.terms
            .values()
            .map(|term| term.submission_value.as_str())
            .collect()
    }

    /// Check if a value is valid for this codelist (case-insensitive,
    /// synonyms included).
    pub fn is_valid(&self, value: &str) -> bool {
        let key = value.to_uppercase();
        self.terms.contains_key(&key) || self.synonyms.contains_key(&key)
    }

    /// Normalize a value to its canonical submission value.
    /// Returns the original value if not found.
    pub fn normalize(&self, value: &str) -> String {
        let key = value.to_uppercase();
        if let Some(term) = self.terms.get(&key) {
            return term.submission_value.clone();
        }
        if let Some(canonical) = self.synonyms.get(&key)
            && let Some(term) = self.terms.get(canonical)
        {
            return term.submission_value.clone();
        }
        value.to_string()
    }

    /// The canonical form of a value that matches a submission value
    /// case-insensitively but not exactly. Synonyms do not count: this is
    /// strictly a case repair, not a vocabulary mapping.
    pub fn case_variant_of(&self, value: &str) -> Option<&str> {
        let term = self.terms.get(&value.to_uppercase())?;
        (term.submission_value != value).then_some(term.submission_value.as_str())
    }
}

/// Registry of codelists keyed by NCI code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerminologyRegistry {
    pub codelists: BTreeMap<String, Codelist>,
}

impl TerminologyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_codelist(&mut self, codelist: Codelist) {
        self.codelists
            .insert(codelist.code.to_uppercase(), codelist);
    }

    pub fn get(&self, code: &str) -> Option<&Codelist> {
        self.codelists.get(&code.trim().to_uppercase())
    }

    /// Resolve the codelist for a variable from its spec entry.
    ///
    /// Multiple codes in the spec are tried in order; the first code present
    /// in the registry wins.
    pub fn resolve_for_variable(&self, variable: &VariableSpec) -> Option<&Codelist> {
        let raw = variable.codelist_code.as_deref()?;
        raw.split(';')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .find_map(|code| self.get(code))
    }
}
