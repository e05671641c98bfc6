use proptest::prelude::*;

use converge_model::{
    ClassificationStatus, Codelist, Finding, FixType, MappingSpec, RuleCategory, Severity, Term,
    TerminologyRegistry, VariableSpec, VariableType, rules,
};
use converge_remediate::Classifier;

fn sex_registry() -> TerminologyRegistry {
    let mut codelist = Codelist::new("C66731", "Sex", false);
    for (code, value) in [("C20197", "M"), ("C16576", "F")] {
        codelist.add_term(Term {
            code: code.to_string(),
            submission_value: value.to_string(),
            synonyms: Vec::new(),
            preferred_term: None,
        });
    }
    let mut registry = TerminologyRegistry::new();
    registry.add_codelist(codelist);
    registry
}

fn dm_spec() -> MappingSpec {
    MappingSpec {
        domain: "DM".to_string(),
        label: None,
        dataset_name: Some("dm".to_string()),
        variables: vec![VariableSpec {
            name: "SEX".to_string(),
            label: None,
            data_type: VariableType::Char,
            length: None,
            codelist_code: Some("C66731".to_string()),
            core: Some("Req".to_string()),
        }],
    }
}

fn finding(rule_id: &str, variable: Option<&str>, offending: &[&str]) -> Finding {
    Finding {
        rule_id: rule_id.to_string(),
        description: String::new(),
        category: RuleCategory::Terminology,
        severity: Severity::Error,
        domain: "DM".to_string(),
        variable: variable.map(str::to_string),
        message: String::new(),
        affected_count: offending.len() as u64,
        offending_values: offending.iter().map(|value| value.to_string()).collect(),
        fix_suggestion: None,
        known_false_positive: false,
        external_cross_reference: None,
    }
}

#[test]
fn case_variant_classifies_auto_fixable() {
    let registry = sex_registry();
    let classifier = Classifier::new(&registry, ["STUDYID"]);
    let classification = classifier.classify(
        &finding(rules::CT_NON_EXTENSIBLE, Some("SEX"), &["m"]),
        &dm_spec(),
    );
    assert_eq!(classification.status, ClassificationStatus::AutoFixable);
    assert_eq!(
        classification.suggested_fix,
        Some(FixType::CtCaseNormalize)
    );
}

#[test]
fn unmatched_value_classifies_needs_human() {
    let registry = sex_registry();
    let classifier = Classifier::new(&registry, ["STUDYID"]);
    let classification = classifier.classify(
        &finding(rules::CT_NON_EXTENSIBLE, Some("SEX"), &["Unknown"]),
        &dm_spec(),
    );
    assert_eq!(classification.status, ClassificationStatus::NeedsHuman);
}

#[test]
fn mixed_values_classify_needs_human() {
    let registry = sex_registry();
    let classifier = Classifier::new(&registry, ["STUDYID"]);
    let classification = classifier.classify(
        &finding(rules::CT_NON_EXTENSIBLE, Some("SEX"), &["m", "Unknown"]),
        &dm_spec(),
    );
    assert_eq!(classification.status, ClassificationStatus::NeedsHuman);
}

#[test]
fn empty_offending_values_fail_closed() {
    let registry = sex_registry();
    let classifier = Classifier::new(&registry, ["STUDYID"]);
    let classification = classifier.classify(
        &finding(rules::CT_NON_EXTENSIBLE, Some("SEX"), &[]),
        &dm_spec(),
    );
    assert_eq!(classification.status, ClassificationStatus::NeedsHuman);
}

#[test]
fn unrecognized_rule_id_fails_closed() {
    let registry = sex_registry();
    let classifier = Classifier::new(&registry, ["STUDYID"]);
    let classification =
        classifier.classify(&finding("XX9999", Some("SEX"), &["m"]), &dm_spec());
    assert_eq!(classification.status, ClassificationStatus::NeedsHuman);
    assert!(classification.reason.contains("XX9999"));
}

#[test]
fn required_presence_honors_allow_list() {
    let registry = sex_registry();
    let classifier = Classifier::new(&registry, ["STUDYID"]);

    let derivable = classifier.classify(
        &finding(rules::REQUIRED_PRESENCE, Some("STUDYID"), &[]),
        &dm_spec(),
    );
    assert_eq!(derivable.status, ClassificationStatus::AutoFixable);
    assert_eq!(derivable.suggested_fix, Some(FixType::ConstantColumn));

    let not_derivable = classifier.classify(
        &finding(rules::REQUIRED_PRESENCE, Some("AETERM"), &[]),
        &dm_spec(),
    );
    assert_eq!(not_derivable.status, ClassificationStatus::NeedsHuman);
}

#[test]
fn fixed_policies_match_the_table() {
    let registry = sex_registry();
    let classifier = Classifier::new(&registry, ["STUDYID"]);
    let spec = dm_spec();

    let cases = [
        (rules::DOMAIN_IDENTIFIER, ClassificationStatus::AutoFixable),
        (rules::NAME_LENGTH, ClassificationStatus::AutoFixable),
        (rules::LABEL_LENGTH, ClassificationStatus::AutoFixable),
        (rules::VALUE_LENGTH, ClassificationStatus::NeedsHuman),
        (rules::DATETIME_FORMAT, ClassificationStatus::NeedsHuman),
        (rules::NON_ASCII, ClassificationStatus::AutoFixable),
        (rules::FILE_NAMING, ClassificationStatus::AutoFixable),
        (rules::START_END_ORDER, ClassificationStatus::NeedsHuman),
        (rules::SUBJECT_REFERENCE, ClassificationStatus::NeedsHuman),
    ];
    for (rule_id, expected) in cases {
        let classification =
            classifier.classify(&finding(rule_id, Some("SEX"), &["x"]), &spec);
        assert_eq!(classification.status, expected, "rule {rule_id}");
    }
}

proptest! {
    /// Identical finding and spec must always classify identically.
    #[test]
    fn classify_is_pure(values in proptest::collection::vec("[A-Za-z]{1,8}", 0..5)) {
        let registry = sex_registry();
        let classifier = Classifier::new(&registry, ["STUDYID"]);
        let spec = dm_spec();
        let offending: Vec<&str> = values.iter().map(String::as_str).collect();
        let finding = finding(rules::CT_NON_EXTENSIBLE, Some("SEX"), &offending);

        let first = classifier.classify(&finding, &spec);
        let second = classifier.classify(&finding, &spec);
        prop_assert_eq!(first, second);
    }
}
