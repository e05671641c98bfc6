//! Fix-loop orchestrator: drives validate -> classify -> fix -> revalidate to
//! convergence or the configured iteration budget.
//!
//! Each iteration validates the snapshot produced at the end of the prior
//! iteration, so cross-domain rules never see partially-updated domains.
//! All staged remediations are applied together to form the next snapshot.
//! The loop converges on the first iteration that applies zero fix actions;
//! it exhausts when the budget ends while fixes were still being applied.
//!
//! A remediation error in one domain is caught here, logged, and treated as
//! zero fixes for that domain for the iteration; it never aborts the run.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use converge_model::{Finding, FixAction, StudySnapshot};
use converge_remediate::{Remediation, Remediator};
use converge_report::ValidationReport;
use converge_validate::ValidationEngine;

/// Caller-configured loop bounds.
#[derive(Debug, Clone)]
pub struct FixLoopConfig {
    /// Iteration budget; the loop never runs more than this many iterations.
    pub max_iterations: usize,
}

impl FixLoopConfig {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }
}

impl Default for FixLoopConfig {
    fn default() -> Self {
        Self { max_iterations: 5 }
    }
}

/// What happened in one iteration.
#[derive(Debug, Clone, Serialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub issues_found: usize,
    /// Fix actions applied this iteration.
    pub auto_fixed: usize,
    /// Findings classified auto-fixable but skipped by precondition.
    pub remaining_auto_fixable: usize,
    pub needs_human: usize,
    pub fix_actions: Vec<FixAction>,
}

/// Loop progress states: running until converged or exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Running,
    Converged,
    Exhausted,
}

/// Outcome of a fix-loop run.
///
/// `converged` distinguishes "nothing left to fix" from "gave up at the
/// budget". The final datasets are returned by value and excluded from
/// serialization; the audit trail and report serialize completely.
#[derive(Debug, Serialize)]
pub struct FixLoopResult {
    pub study_id: String,
    pub iterations_run: usize,
    pub max_iterations: usize,
    pub converged: bool,
    pub total_fixed: usize,
    /// All findings from the final validation pass.
    pub remaining_issues: Vec<Finding>,
    /// The subset of `remaining_issues` that needs human review.
    pub needs_human_issues: Vec<Finding>,
    /// Flattened, ordered audit trail across all iterations.
    pub all_fix_actions: Vec<FixAction>,
    pub iteration_details: Vec<IterationRecord>,
    pub final_report: ValidationReport,
    /// Final per-domain state.
    #[serde(skip)]
    pub datasets: StudySnapshot,
}

/// Run the fix loop over the given per-domain state.
///
/// The study id and reference terminology come from the remediator's
/// context, so evaluators and fixers are guaranteed to share them.
pub fn run_fix_loop(
    domains: StudySnapshot,
    engine: &ValidationEngine,
    remediator: &Remediator<'_>,
    config: &FixLoopConfig,
) -> FixLoopResult {
    let study_id = remediator.context().study_id;
    let terminology = remediator.context().terminology;
    let domain_codes: Vec<String> = domains.keys().cloned().collect();

    let mut snapshot = domains;
    let mut iteration_details: Vec<IterationRecord> = Vec::new();
    let mut all_fix_actions: Vec<FixAction> = Vec::new();
    let mut state = LoopState::Running;
    let mut iterations_run = 0;

    for iteration in 1..=config.max_iterations {
        iterations_run = iteration;

        // (a) Validate the snapshot from the end of the prior iteration.
        let findings = engine.validate_all(&snapshot, study_id, terminology);
        let issues_found = findings.len();

        // (b) Classify every finding against the current specs.
        let mut needs_human = 0usize;
        let mut auto_by_domain: BTreeMap<String, Vec<Finding>> = BTreeMap::new();
        for finding in findings {
            let auto = snapshot
                .get(&finding.domain)
                .map(|data| {
                    remediator
                        .classifier()
                        .classify(&finding, &data.spec)
                        .is_auto_fixable()
                })
                .unwrap_or(false);
            if auto {
                auto_by_domain
                    .entry(finding.domain.clone())
                    .or_default()
                    .push(finding);
            } else {
                needs_human += 1;
            }
        }

        // (c) Remediate each domain with at least one auto-fixable finding.
        // Results are staged; the snapshot is untouched during this phase.
        let mut staged: BTreeMap<String, Remediation> = BTreeMap::new();
        for (domain, domain_findings) in &auto_by_domain {
            let Some(data) = snapshot.get(domain) else {
                continue;
            };
            match remediator.apply_fixes(domain, data, domain_findings) {
                Ok(remediation) => {
                    staged.insert(domain.clone(), remediation);
                }
                Err(error) => {
                    warn!(
                        domain = %domain,
                        error = %error,
                        "remediation failed; zero fixes for this domain this iteration"
                    );
                }
            }
        }

        // (d) Apply all staged replacements together to form the next snapshot.
        let mut auto_fixed = 0usize;
        let mut remaining_auto_fixable = 0usize;
        let mut fix_actions = Vec::new();
        for (domain, remediation) in staged {
            auto_fixed += remediation.actions.len();
            remaining_auto_fixable += remediation.skipped.len();
            fix_actions.extend(remediation.actions.iter().cloned());
            all_fix_actions.extend(remediation.actions);
            snapshot.insert(domain, remediation.data);
        }

        info!(
            iteration,
            issues_found, auto_fixed, remaining_auto_fixable, needs_human,
            "fix-loop iteration complete"
        );
        iteration_details.push(IterationRecord {
            iteration,
            issues_found,
            auto_fixed,
            remaining_auto_fixable,
            needs_human,
            fix_actions,
        });

        // (e) Zero applied fixes means a fixed point: nothing wrong, or only
        // human-review issues remain.
        if auto_fixed == 0 {
            state = LoopState::Converged;
            break;
        }
    }

    if state == LoopState::Running {
        state = LoopState::Exhausted;
    }
    let converged = state == LoopState::Converged;

    // Final validation pass over the resulting state.
    let remaining_issues = engine.validate_all(&snapshot, study_id, terminology);
    let needs_human_issues: Vec<Finding> = remaining_issues
        .iter()
        .filter(|finding| {
            snapshot
                .get(&finding.domain)
                .map(|data| {
                    !remediator
                        .classifier()
                        .classify(finding, &data.spec)
                        .is_auto_fixable()
                })
                .unwrap_or(true)
        })
        .cloned()
        .collect();
    let final_report = ValidationReport::from_results(study_id, &remaining_issues, &domain_codes);

    info!(
        iterations_run,
        converged,
        total_fixed = all_fix_actions.len(),
        remaining = remaining_issues.len(),
        "fix loop finished"
    );

    FixLoopResult {
        study_id: study_id.to_string(),
        iterations_run,
        max_iterations: config.max_iterations,
        converged,
        total_fixed: all_fix_actions.len(),
        remaining_issues,
        needs_human_issues,
        all_fix_actions,
        iteration_details,
        final_report,
        datasets: snapshot,
    }
}
