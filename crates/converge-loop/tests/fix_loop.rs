use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use polars::prelude::*;

use converge_loop::{FixLoopConfig, run_fix_loop};
use converge_model::{
    Codelist, DomainData, Finding, FixType, MappingSpec, RuleCategory, Severity, StudySnapshot,
    Term, TerminologyRegistry, VariableSpec, VariableType, column_trimmed_values, rules,
};
use converge_remediate::{FixContext, Remediator};
use converge_validate::{RuleContext, RuleEvaluator, ValidationEngine};

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

fn make_var(name: &str, codelist: Option<&str>) -> VariableSpec {
    VariableSpec {
        name: name.to_string(),
        label: None,
        data_type: VariableType::Char,
        length: None,
        codelist_code: codelist.map(str::to_string),
        core: Some("Req".to_string()),
    }
}

fn make_spec(domain: &str, variables: Vec<VariableSpec>) -> MappingSpec {
    MappingSpec {
        domain: domain.to_string(),
        label: None,
        dataset_name: Some(domain.to_lowercase()),
        variables,
    }
}

fn study_constants() -> BTreeMap<String, String> {
    BTreeMap::from([("STUDYID".to_string(), "STUDY01".to_string())])
}

fn audit_is_complete(result: &converge_loop::FixLoopResult) -> bool {
    let per_iteration: usize = result
        .iteration_details
        .iter()
        .map(|record| record.auto_fixed)
        .sum();
    result.all_fix_actions.len() == per_iteration
}

#[test]
fn missing_domain_column_converges_in_two_iterations() {
    // Scenario A: domain AE, one row, missing domain-identifier column.
    let registry = TerminologyRegistry::new();
    let constants = study_constants();
    let ctx = FixContext {
        study_id: "STUDY01",
        terminology: &registry,
        constants: &constants,
    };
    let remediator = Remediator::with_defaults(ctx).expect("remediator");
    let engine = ValidationEngine::with_default_rules();

    let mut snapshot: StudySnapshot = BTreeMap::new();
    snapshot.insert(
        "AE".to_string(),
        DomainData::new(
            df! { "AETERM" => ["Headache"] }.expect("df"),
            make_spec("AE", vec![make_var("AETERM", None)]),
        ),
    );

    let result = run_fix_loop(snapshot, &engine, &remediator, &FixLoopConfig::new(3));

    assert!(result.converged);
    assert_eq!(result.iterations_run, 2);
    assert_eq!(result.total_fixed, 1);
    assert_eq!(result.datasets["AE"].row_count(), 1);
    assert_eq!(
        column_trimmed_values(&result.datasets["AE"].dataset, "DOMAIN").expect("column"),
        vec!["AE"]
    );
    assert!(result.remaining_issues.is_empty());
    assert!(audit_is_complete(&result));
}

#[test]
fn ct_case_variant_is_fixed_and_audited() {
    // Scenario B: SEX holds "m" where valid terms are {M, F}.
    let registry = sex_registry();
    let constants = study_constants();
    let ctx = FixContext {
        study_id: "STUDY01",
        terminology: &registry,
        constants: &constants,
    };
    let remediator = Remediator::with_defaults(ctx).expect("remediator");
    let engine = ValidationEngine::with_default_rules();

    let mut snapshot: StudySnapshot = BTreeMap::new();
    snapshot.insert(
        "DM".to_string(),
        DomainData::new(
            df! { "DOMAIN" => ["DM"], "SEX" => ["m"] }.expect("df"),
            make_spec("DM", vec![make_var("SEX", Some("C66731"))]),
        ),
    );

    let result = run_fix_loop(snapshot, &engine, &remediator, &FixLoopConfig::new(5));

    assert!(result.converged);
    assert_eq!(result.total_fixed, 1);
    let action = &result.all_fix_actions[0];
    assert_eq!(action.fix_type, FixType::CtCaseNormalize);
    assert_eq!(action.affected_count, 1);
    assert_eq!(
        column_trimmed_values(&result.datasets["DM"].dataset, "SEX").expect("column"),
        vec!["M"]
    );

    let serialized = serde_json::to_value(action).expect("serialize action");
    assert_eq!(serialized["fix_type"], "ct_case_normalize");
}

#[test]
fn unmatched_ct_value_needs_human_and_converges_immediately() {
    // Scenario C: "Unknown" has no case-insensitive match.
    let registry = sex_registry();
    let constants = study_constants();
    let ctx = FixContext {
        study_id: "STUDY01",
        terminology: &registry,
        constants: &constants,
    };
    let remediator = Remediator::with_defaults(ctx).expect("remediator");
    let engine = ValidationEngine::with_default_rules();

    let mut snapshot: StudySnapshot = BTreeMap::new();
    snapshot.insert(
        "DM".to_string(),
        DomainData::new(
            df! { "DOMAIN" => ["DM"], "SEX" => ["Unknown"] }.expect("df"),
            make_spec("DM", vec![make_var("SEX", Some("C66731"))]),
        ),
    );

    let result = run_fix_loop(snapshot, &engine, &remediator, &FixLoopConfig::new(5));

    assert!(result.converged);
    assert_eq!(result.iterations_run, 1);
    assert_eq!(result.total_fixed, 0);
    assert!(
        result
            .needs_human_issues
            .iter()
            .any(|finding| finding.rule_id == rules::CT_NON_EXTENSIBLE)
    );
    assert_eq!(
        column_trimmed_values(&result.datasets["DM"].dataset, "SEX").expect("column"),
        vec!["Unknown"]
    );
}

struct FailsForLb;

impl RuleEvaluator for FailsForLb {
    fn rule_id(&self) -> &str {
        "SD9999"
    }

    fn description(&self) -> &str {
        "Always fails for LB"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::CrossReference
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn evaluate(
        &self,
        domain: &str,
        _data: &DomainData,
        _ctx: &RuleContext<'_>,
    ) -> Result<Vec<Finding>> {
        if domain == "LB" {
            Err(anyhow!("reference data unavailable"))
        } else {
            Ok(Vec::new())
        }
    }
}

#[test]
fn failing_evaluator_yields_synthetic_warning_and_loop_converges() {
    // Scenario D: an evaluator for domain LB always raises.
    let registry = TerminologyRegistry::new();
    let constants = study_constants();
    let ctx = FixContext {
        study_id: "STUDY01",
        terminology: &registry,
        constants: &constants,
    };
    let remediator = Remediator::with_defaults(ctx).expect("remediator");
    let mut engine = ValidationEngine::with_default_rules();
    engine.register(Box::new(FailsForLb));

    let mut snapshot: StudySnapshot = BTreeMap::new();
    snapshot.insert(
        "DM".to_string(),
        DomainData::new(
            df! { "DOMAIN" => ["DM"] }.expect("df"),
            make_spec("DM", vec![]),
        ),
    );
    snapshot.insert(
        "LB".to_string(),
        DomainData::new(
            df! { "DOMAIN" => ["LB"] }.expect("df"),
            make_spec("LB", vec![]),
        ),
    );

    let result = run_fix_loop(snapshot, &engine, &remediator, &FixLoopConfig::new(3));

    assert!(result.converged);
    let synthetic: Vec<&Finding> = result
        .remaining_issues
        .iter()
        .filter(|finding| finding.rule_id == "SD9999")
        .collect();
    assert_eq!(synthetic.len(), 1);
    assert_eq!(synthetic[0].severity, Severity::Warning);
    assert_eq!(synthetic[0].domain, "LB");
}

/// Reports a different missing constant column on every evaluation, so its
/// trigger condition never clears.
struct RotatingMissingColumn {
    counter: AtomicUsize,
}

impl RuleEvaluator for RotatingMissingColumn {
    fn rule_id(&self) -> &str {
        rules::REQUIRED_PRESENCE
    }

    fn description(&self) -> &str {
        "Required variable not found in dataset"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Presence
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn evaluate(
        &self,
        domain: &str,
        _data: &DomainData,
        _ctx: &RuleContext<'_>,
    ) -> Result<Vec<Finding>> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(vec![self.make_finding(
            domain,
            Some(format!("C{n}")),
            format!("Required variable not found: C{n}"),
            1,
            Vec::new(),
        )])
    }
}

#[test]
fn budget_exhaustion_reports_not_converged() {
    // Scenario E: fixes keep applying without clearing their trigger.
    let registry = TerminologyRegistry::new();
    let mut constants = study_constants();
    for n in 1..=9 {
        constants.insert(format!("C{n}"), "X".to_string());
    }
    let ctx = FixContext {
        study_id: "STUDY01",
        terminology: &registry,
        constants: &constants,
    };
    let remediator = Remediator::with_defaults(ctx).expect("remediator");
    let mut engine = ValidationEngine::new();
    engine.register(Box::new(RotatingMissingColumn {
        counter: AtomicUsize::new(0),
    }));

    let mut snapshot: StudySnapshot = BTreeMap::new();
    snapshot.insert(
        "AE".to_string(),
        DomainData::new(
            df! { "DOMAIN" => ["AE"] }.expect("df"),
            make_spec("AE", vec![]),
        ),
    );

    let result = run_fix_loop(snapshot, &engine, &remediator, &FixLoopConfig::new(2));

    assert!(!result.converged);
    assert_eq!(result.iterations_run, 2);
    assert!(result.iterations_run <= result.max_iterations);
    assert_eq!(result.total_fixed, 2);
    assert!(audit_is_complete(&result));
}

#[test]
fn zero_findings_converge_in_one_iteration() {
    let registry = TerminologyRegistry::new();
    let constants = study_constants();
    let ctx = FixContext {
        study_id: "STUDY01",
        terminology: &registry,
        constants: &constants,
    };
    let remediator = Remediator::with_defaults(ctx).expect("remediator");
    let engine = ValidationEngine::with_default_rules();

    let mut snapshot: StudySnapshot = BTreeMap::new();
    snapshot.insert(
        "AE".to_string(),
        DomainData::new(
            df! { "DOMAIN" => ["AE"] }.expect("df"),
            make_spec("AE", vec![]),
        ),
    );

    let result = run_fix_loop(snapshot, &engine, &remediator, &FixLoopConfig::new(3));

    assert!(result.converged);
    assert_eq!(result.iterations_run, 1);
    assert_eq!(result.total_fixed, 0);
    assert_eq!(result.iteration_details.len(), 1);
    assert_eq!(result.iteration_details[0].issues_found, 0);
    assert!(result.final_report.submission_ready);
}

#[test]
fn skipped_precondition_converges_and_surfaces_finding() {
    // A truncation with no free candidate name is retried, never fixed, and
    // surfaced in the remaining issues; the loop still converges because a
    // skip applies zero actions.
    let registry = TerminologyRegistry::new();
    let constants = study_constants();
    let ctx = FixContext {
        study_id: "STUDY01",
        terminology: &registry,
        constants: &constants,
    };
    let remediator = Remediator::with_defaults(ctx).expect("remediator");
    let engine = ValidationEngine::with_default_rules();

    let mut columns = vec![
        Column::new("DOMAIN".into(), ["AE"]),
        Column::new("AETERMLONGX".into(), ["x"]),
        Column::new("AETERMLO".into(), ["y"]),
    ];
    for digit in 1..=9 {
        columns.push(Column::new(format!("AETERML{digit}").into(), ["y"]));
    }
    let mut snapshot: StudySnapshot = BTreeMap::new();
    snapshot.insert(
        "AE".to_string(),
        DomainData::new(
            DataFrame::new(columns).expect("df"),
            make_spec("AE", vec![]),
        ),
    );

    let result = run_fix_loop(snapshot, &engine, &remediator, &FixLoopConfig::new(3));

    assert!(result.converged);
    assert_eq!(result.iterations_run, 1);
    assert_eq!(result.total_fixed, 0);
    assert_eq!(result.iteration_details[0].remaining_auto_fixable, 1);
    assert!(
        result
            .remaining_issues
            .iter()
            .any(|finding| finding.rule_id == rules::NAME_LENGTH)
    );
}

#[test]
fn result_serializes_without_datasets() {
    let registry = TerminologyRegistry::new();
    let constants = study_constants();
    let ctx = FixContext {
        study_id: "STUDY01",
        terminology: &registry,
        constants: &constants,
    };
    let remediator = Remediator::with_defaults(ctx).expect("remediator");
    let engine = ValidationEngine::with_default_rules();

    let mut snapshot: StudySnapshot = BTreeMap::new();
    snapshot.insert(
        "AE".to_string(),
        DomainData::new(
            df! { "AETERM" => ["Headache"] }.expect("df"),
            make_spec("AE", vec![make_var("AETERM", None)]),
        ),
    );

    let result = run_fix_loop(snapshot, &engine, &remediator, &FixLoopConfig::new(3));
    let value = serde_json::to_value(&result).expect("serialize result");

    assert!(value.get("datasets").is_none());
    assert_eq!(value["converged"], true);
    assert_eq!(value["total_fixed"], 1);
    assert_eq!(value["iteration_details"].as_array().expect("array").len(), 2);
    assert_eq!(value["final_report"]["study_id"], "STUDY01");
}
