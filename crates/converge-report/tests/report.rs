use std::fs;
use std::path::PathBuf;

use converge_model::{Finding, RuleCategory, Severity};
use converge_report::{ValidationReport, write_report_json};

fn finding(
    rule_id: &str,
    domain: &str,
    category: RuleCategory,
    severity: Severity,
    false_positive: bool,
) -> Finding {
    Finding {
        rule_id: rule_id.to_string(),
        description: String::new(),
        category,
        severity,
        domain: domain.to_string(),
        variable: None,
        message: String::new(),
        affected_count: 1,
        offending_values: Vec::new(),
        fix_suggestion: None,
        known_false_positive: false_positive,
        external_cross_reference: None,
    }
}

fn domains(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|code| code.to_string()).collect()
}

#[test]
fn empty_findings_pass_everything() {
    let report = ValidationReport::from_results("STUDY01", &[], &domains(&["AE", "DM"]));
    assert_eq!(report.total_rules_run, 0);
    assert_eq!(report.pass_rate, 1.0);
    assert!(report.submission_ready);
}

#[test]
fn empty_domain_list_has_full_pass_rate() {
    let findings = vec![finding(
        "CT2001",
        "DM",
        RuleCategory::Terminology,
        Severity::Error,
        false,
    )];
    let report = ValidationReport::from_results("STUDY01", &findings, &[]);
    assert_eq!(report.pass_rate, 1.0);
    assert!(!report.submission_ready);
}

#[test]
fn false_positives_are_excluded_from_effective_counts() {
    let findings = vec![
        finding("CT2001", "DM", RuleCategory::Terminology, Severity::Error, true),
        finding("SD0003", "AE", RuleCategory::Format, Severity::Warning, false),
    ];
    let report = ValidationReport::from_results("STUDY01", &findings, &domains(&["AE", "DM"]));

    assert_eq!(report.counts.errors, 1);
    assert_eq!(report.effective.errors, 0);
    assert_eq!(report.false_positives, 1);
    // The false-positive error does not block submission or the pass rate.
    assert!(report.submission_ready);
    assert_eq!(report.pass_rate, 1.0);
}

#[test]
fn pass_rate_counts_domains_with_effective_errors() {
    let findings = vec![
        finding("CT2001", "DM", RuleCategory::Terminology, Severity::Error, false),
        finding("CT2002", "AE", RuleCategory::Terminology, Severity::Warning, false),
    ];
    let report = ValidationReport::from_results("STUDY01", &findings, &domains(&["AE", "DM"]));

    assert_eq!(report.pass_rate, 0.5);
    assert!(!report.submission_ready);
    assert_eq!(report.by_domain["DM"].effective.errors, 1);
    assert_eq!(report.by_domain["AE"].effective.errors, 0);
}

#[test]
fn render_text_for_clean_study_is_stable() {
    let report = ValidationReport::from_results("STUDY01", &[], &domains(&["AE"]));
    let expected = "Validation report for study STUDY01\n\
                    Domains validated: 1\n\
                    Rules run: 0\n\
                    Errors: 0 (0 effective)\n\
                    Warnings: 0 (0 effective)\n\
                    Notices: 0 (0 effective)\n\
                    Known false positives: 0\n\
                    Pass rate: 100.0%\n\
                    Submission ready: yes\n";
    assert_eq!(report.render_text(), expected);
}

#[test]
fn render_text_lists_domain_and_category_breakdowns() {
    let findings = vec![
        finding("CT2001", "DM", RuleCategory::Terminology, Severity::Error, false),
        finding("SD0003", "AE", RuleCategory::Format, Severity::Warning, false),
    ];
    let report = ValidationReport::from_results("STUDY01", &findings, &domains(&["AE", "DM"]));
    let rendered = report.render_text();

    assert!(rendered.contains("Findings by domain:"));
    assert!(rendered.contains("  DM: 1 error(s), 0 warning(s), 0 notice(s)"));
    assert!(rendered.contains("  AE: 0 error(s), 1 warning(s), 0 notice(s)"));
    assert!(rendered.contains("Findings by category:"));
    assert!(rendered.contains("  Terminology: 1 error(s), 0 warning(s), 0 notice(s)"));
    assert!(rendered.contains("Pass rate: 50.0%"));
    assert!(rendered.contains("Submission ready: no"));
}

#[test]
fn report_json_payload_round_trips() {
    let mut dir = std::env::temp_dir();
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("converge_report_{stamp}"));

    let findings = vec![finding(
        "CT2001",
        "DM",
        RuleCategory::Terminology,
        Severity::Error,
        false,
    )];
    let report = ValidationReport::from_results("STUDY01", &findings, &domains(&["DM"]));
    let path: PathBuf = write_report_json(&dir, &report, &[]).expect("write payload");

    let raw = fs::read_to_string(&path).expect("read payload");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("parse payload");
    assert_eq!(value["schema"], "sdtm-converge.fix-loop-report");
    assert_eq!(value["study_id"], "STUDY01");
    assert_eq!(value["report"]["total_rules_run"], 1);

    fs::remove_dir_all(&dir).ok();
}
