//! Read-only statistical projection of a finding set.
//!
//! Effective counts exclude findings flagged as known false positives; those
//! stay in the totals and are reported separately. The pass rate is the
//! fraction of validated domains with zero effective errors.

mod payload;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use converge_model::{Finding, Severity};

pub use payload::write_report_json;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub errors: u64,
    pub warnings: u64,
    pub notices: u64,
}

impl SeverityCounts {
    fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Notice => self.notices += 1,
        }
    }
}

/// Per-domain finding counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainBreakdown {
    /// All findings for the domain.
    pub counts: SeverityCounts,
    /// Counts excluding known false positives.
    pub effective: SeverityCounts,
    pub false_positives: u64,
}

/// Statistical summary of one validation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub study_id: String,
    /// Domain codes that were validated (the pass-rate denominator).
    pub domains: Vec<String>,
    /// Total findings produced by the pass.
    pub total_rules_run: u64,
    /// All findings by severity.
    pub counts: SeverityCounts,
    /// Findings by severity excluding known false positives.
    pub effective: SeverityCounts,
    pub false_positives: u64,
    pub by_domain: BTreeMap<String, DomainBreakdown>,
    pub by_category: BTreeMap<String, SeverityCounts>,
    /// Fraction of validated domains with zero effective errors.
    pub pass_rate: f64,
    /// True when the effective error count is zero.
    pub submission_ready: bool,
}

impl ValidationReport {
    pub fn from_results(study_id: &str, findings: &[Finding], domains: &[String]) -> Self {
        let mut counts = SeverityCounts::default();
        let mut effective = SeverityCounts::default();
        let mut false_positives = 0u64;
        let mut by_domain: BTreeMap<String, DomainBreakdown> = BTreeMap::new();
        let mut by_category: BTreeMap<String, SeverityCounts> = BTreeMap::new();

        for finding in findings {
            counts.add(finding.severity);
            by_category
                .entry(finding.category.label().to_string())
                .or_default()
                .add(finding.severity);
            let domain = by_domain.entry(finding.domain.clone()).or_default();
            domain.counts.add(finding.severity);
            if finding.known_false_positive {
                false_positives += 1;
                domain.false_positives += 1;
            } else {
                effective.add(finding.severity);
                domain.effective.add(finding.severity);
            }
        }

        let pass_rate = if domains.is_empty() {
            1.0
        } else {
            let passing = domains
                .iter()
                .filter(|domain| {
                    by_domain
                        .get(domain.as_str())
                        .map(|breakdown| breakdown.effective.errors == 0)
                        .unwrap_or(true)
                })
                .count();
            passing as f64 / domains.len() as f64
        };

        Self {
            study_id: study_id.to_string(),
            domains: domains.to_vec(),
            total_rules_run: findings.len() as u64,
            counts,
            submission_ready: effective.errors == 0,
            effective,
            false_positives,
            by_domain,
            by_category,
            pass_rate,
        }
    }

    /// Project the report to human-readable text. Pure; no additional state.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Validation report for study {}\n", self.study_id));
        out.push_str(&format!("Domains validated: {}\n", self.domains.len()));
        out.push_str(&format!("Rules run: {}\n", self.total_rules_run));
        out.push_str(&format!(
            "Errors: {} ({} effective)\n",
            self.counts.errors, self.effective.errors
        ));
        out.push_str(&format!(
            "Warnings: {} ({} effective)\n",
            self.counts.warnings, self.effective.warnings
        ));
        out.push_str(&format!(
            "Notices: {} ({} effective)\n",
            self.counts.notices, self.effective.notices
        ));
        out.push_str(&format!(
            "Known false positives: {}\n",
            self.false_positives
        ));
        out.push_str(&format!("Pass rate: {:.1}%\n", self.pass_rate * 100.0));
        out.push_str(&format!(
            "Submission ready: {}\n",
            if self.submission_ready { "yes" } else { "no" }
        ));

        if !self.by_domain.is_empty() {
            out.push_str("\nFindings by domain:\n");
            for (domain, breakdown) in &self.by_domain {
                out.push_str(&format!(
                    "  {domain}: {} error(s), {} warning(s), {} notice(s)\n",
                    breakdown.counts.errors, breakdown.counts.warnings, breakdown.counts.notices
                ));
            }
        }
        if !self.by_category.is_empty() {
            out.push_str("\nFindings by category:\n");
            for (category, counts) in &self.by_category {
                out.push_str(&format!(
                    "  {category}: {} error(s), {} warning(s), {} notice(s)\n",
                    counts.errors, counts.warnings, counts.notices
                ));
            }
        }
        out
    }
}
