//! Data model for the converge engine.
//!
//! - **finding**: typed validation findings with structured offending values
//! - **spec**: mapping specifications describing expected dataset columns
//! - **terminology**: controlled terminology codelists and registry
//! - **audit**: fix types, audit records, and classifications
//! - **dataset**: per-domain dataset + spec pairs and study snapshots
//! - **frame**: DataFrame value extraction helpers
//! - **rules**: rule id constants and transport length limits

pub mod audit;
pub mod dataset;
pub mod error;
pub mod finding;
pub mod frame;
pub mod lookup;
pub mod rules;
pub mod spec;
pub mod terminology;

pub use audit::{Classification, ClassificationStatus, FixAction, FixType};
pub use dataset::{DomainData, StudySnapshot};
pub use error::{ConvergeError, Result};
pub use finding::{Finding, RuleCategory, Severity};
pub use frame::{any_to_string, column_trimmed_values, is_missing_value};
pub use lookup::CaseInsensitiveLookup;
pub use spec::{MappingSpec, VariableSpec, VariableType};
pub use terminology::{Codelist, Term, TerminologyRegistry};

#[cfg(test)]
mod tests {
    use super::*;

    fn sex_codelist() -> Codelist {
        let mut codelist = Codelist::new("C66731", "Sex", false);
        codelist.add_term(Term {
            code: "C20197".to_string(),
            submission_value: "M".to_string(),
            synonyms: vec!["Male".to_string()],
            preferred_term: Some("Male".to_string()),
        });
        codelist.add_term(Term {
            code: "C16576".to_string(),
            submission_value: "F".to_string(),
            synonyms: vec!["Female".to_string()],
            preferred_term: Some("Female".to_string()),
        });
        codelist
    }

    #[test]
    fn codelist_validates_case_insensitively() {
        let codelist = sex_codelist();
        assert!(codelist.is_valid("M"));
        assert!(codelist.is_valid("m"));
        assert!(codelist.is_valid("MALE"));
        assert!(!codelist.is_valid("Unknown"));
    }

    #[test]
    fn codelist_normalizes_to_submission_values() {
        let codelist = sex_codelist();
        assert_eq!(codelist.normalize("m"), "M");
        assert_eq!(codelist.normalize("MALE"), "M");
        assert_eq!(codelist.normalize("Unknown"), "Unknown");
    }

    #[test]
    fn missing_values_are_null_or_blank() {
        use polars::prelude::AnyValue;
        assert!(is_missing_value(&AnyValue::Null));
        assert!(is_missing_value(&AnyValue::String("  ")));
        assert!(!is_missing_value(&AnyValue::String("AE")));
        assert!(!is_missing_value(&AnyValue::Int64(0)));
    }

    #[test]
    fn case_variant_excludes_exact_and_synonym_matches() {
        let codelist = sex_codelist();
        assert_eq!(codelist.case_variant_of("m"), Some("M"));
        assert_eq!(codelist.case_variant_of("M"), None);
        assert_eq!(codelist.case_variant_of("Male"), None);
        assert_eq!(codelist.case_variant_of("Unknown"), None);
    }

    #[test]
    fn registry_resolves_first_known_code() {
        let mut registry = TerminologyRegistry::new();
        registry.add_codelist(sex_codelist());
        let variable = VariableSpec {
            name: "SEX".to_string(),
            label: None,
            data_type: VariableType::Char,
            length: None,
            codelist_code: Some("C99999; C66731".to_string()),
            core: None,
        };
        let codelist = registry
            .resolve_for_variable(&variable)
            .expect("codelist resolves");
        assert_eq!(codelist.code, "C66731");
    }

    #[test]
    fn fix_type_serializes_snake_case() {
        let json = serde_json::to_string(&FixType::CtCaseNormalize).expect("serialize");
        assert_eq!(json, "\"ct_case_normalize\"");
        assert_eq!(FixType::CtCaseNormalize.as_str(), "ct_case_normalize");
    }

    #[test]
    fn finding_round_trips_through_json() {
        let finding = Finding {
            rule_id: rules::CT_NON_EXTENSIBLE.to_string(),
            description: "Value not found in codelist".to_string(),
            category: RuleCategory::Terminology,
            severity: Severity::Error,
            domain: "DM".to_string(),
            variable: Some("SEX".to_string()),
            message: "SEX has 1 value(s) not found in Sex (C66731)".to_string(),
            affected_count: 1,
            offending_values: vec!["m".to_string()],
            fix_suggestion: Some("normalize case".to_string()),
            known_false_positive: false,
            external_cross_reference: None,
        };
        let json = serde_json::to_string(&finding).expect("serialize");
        let round: Finding = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(round.rule_id, finding.rule_id);
        assert_eq!(round.offending_values, finding.offending_values);
    }
}
