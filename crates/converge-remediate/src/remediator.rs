//! Remediator: dispatches auto-fixable findings to their fix functions and
//! returns new dataset/spec copies plus the audit trail.
//!
//! The fixer table is consistency-checked at construction: every rule id the
//! classifier can mark auto-fixable must have a fixer entry, or construction
//! fails before any loop starts.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use converge_model::{ConvergeError, DomainData, Finding, FixAction, rules};

use crate::classify::Classifier;
use crate::context::FixContext;
use crate::fixes::{self, FixInput, FixResult};

/// Tagged dispatch entry: which fix function handles a rule id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixFn {
    CtCaseNormalize,
    DomainColumn,
    ConstantColumn,
    TruncateName,
    TruncateLabel,
    AsciiSubstitute,
    FileNaming,
}

impl FixFn {
    fn apply(&self, input: &FixInput<'_>) -> Result<FixResult> {
        match self {
            Self::CtCaseNormalize => fixes::ct_case::apply(input),
            Self::DomainColumn => fixes::domain_column::apply(input),
            Self::ConstantColumn => fixes::constant_column::apply(input),
            Self::TruncateName => fixes::truncate::apply_name(input),
            Self::TruncateLabel => fixes::truncate::apply_label(input),
            Self::AsciiSubstitute => fixes::ascii::apply(input),
            Self::FileNaming => fixes::naming::apply(input),
        }
    }
}

/// The default fixer dispatch table over the built-in rule set.
pub fn default_fixers() -> BTreeMap<String, FixFn> {
    let mut fixers = BTreeMap::new();
    fixers.insert(rules::CT_NON_EXTENSIBLE.to_string(), FixFn::CtCaseNormalize);
    fixers.insert(rules::CT_EXTENSIBLE.to_string(), FixFn::CtCaseNormalize);
    fixers.insert(rules::DOMAIN_IDENTIFIER.to_string(), FixFn::DomainColumn);
    fixers.insert(rules::REQUIRED_PRESENCE.to_string(), FixFn::ConstantColumn);
    fixers.insert(rules::NAME_LENGTH.to_string(), FixFn::TruncateName);
    fixers.insert(rules::LABEL_LENGTH.to_string(), FixFn::TruncateLabel);
    fixers.insert(rules::NON_ASCII.to_string(), FixFn::AsciiSubstitute);
    fixers.insert(rules::FILE_NAMING.to_string(), FixFn::FileNaming);
    fixers
}

/// A fix that declined to run, with the reason it was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFix {
    pub rule_id: String,
    pub variable: Option<String>,
    pub reason: String,
}

/// Result of remediating one domain: the new state, the audit trail, and the
/// fixes that were classified auto-fixable but declined by precondition.
pub struct Remediation {
    pub data: DomainData,
    pub actions: Vec<FixAction>,
    pub skipped: Vec<SkippedFix>,
}

pub struct Remediator<'a> {
    classifier: Classifier<'a>,
    fixers: BTreeMap<String, FixFn>,
    ctx: FixContext<'a>,
}

impl<'a> Remediator<'a> {
    /// Build a remediator, failing fast when the classifier policy and fixer
    /// table disagree.
    pub fn new(
        classifier: Classifier<'a>,
        fixers: BTreeMap<String, FixFn>,
        ctx: FixContext<'a>,
    ) -> converge_model::Result<Self> {
        for (rule_id, policy) in classifier.policy() {
            if policy.can_auto_fix() && !fixers.contains_key(rule_id) {
                return Err(ConvergeError::FixerTableMismatch {
                    rule_id: rule_id.clone(),
                });
            }
        }
        Ok(Self {
            classifier,
            fixers,
            ctx,
        })
    }

    /// Build with the default policy and fixer tables. Constant-derivable
    /// variables come from the context's constants map.
    pub fn with_defaults(ctx: FixContext<'a>) -> converge_model::Result<Self> {
        let classifier = Classifier::new(ctx.terminology, ctx.constants.keys());
        Self::new(classifier, default_fixers(), ctx)
    }

    pub fn classifier(&self) -> &Classifier<'a> {
        &self.classifier
    }

    pub fn context(&self) -> &FixContext<'a> {
        &self.ctx
    }

    /// Apply every auto-fixable finding for one domain.
    ///
    /// Inputs are never mutated; fixes chain on internal copies so later
    /// fixes in the same pass see earlier ones. Findings tagged to other
    /// domains are ignored.
    pub fn apply_fixes(
        &self,
        domain: &str,
        data: &DomainData,
        findings: &[Finding],
    ) -> Result<Remediation> {
        let mut dataset = data.dataset.clone();
        let mut spec = data.spec.clone();
        let mut actions = Vec::new();
        let mut skipped = Vec::new();

        for finding in findings {
            if !finding.domain.eq_ignore_ascii_case(domain) {
                continue;
            }
            let classification = self.classifier.classify(finding, &spec);
            if !classification.is_auto_fixable() {
                continue;
            }
            let Some(fixer) = self.fixers.get(finding.rule_id.as_str()) else {
                // Unreachable with a consistency-checked table; decline safely.
                skipped.push(SkippedFix {
                    rule_id: finding.rule_id.clone(),
                    variable: finding.variable.clone(),
                    reason: "no fixer registered".to_string(),
                });
                continue;
            };

            let input = FixInput {
                domain,
                dataset: &dataset,
                spec: &spec,
                finding,
                ctx: &self.ctx,
            };
            match fixer.apply(&input)? {
                FixResult::Applied {
                    dataset: new_dataset,
                    spec: new_spec,
                    action,
                } => {
                    if new_dataset.height() != dataset.height() {
                        return Err(ConvergeError::RowCountChanged {
                            rule_id: finding.rule_id.clone(),
                            before: dataset.height(),
                            after: new_dataset.height(),
                        }
                        .into());
                    }
                    debug_assert!(action.affected_count as usize <= new_dataset.height());
                    info!(
                        domain = %domain,
                        rule_id = %finding.rule_id,
                        fix = %action.fix_type.as_str(),
                        affected = action.affected_count,
                        "fix applied"
                    );
                    dataset = new_dataset;
                    spec = new_spec;
                    actions.push(action);
                }
                FixResult::Skipped { reason } => {
                    debug!(
                        domain = %domain,
                        rule_id = %finding.rule_id,
                        reason = %reason,
                        "fix skipped; finding persists"
                    );
                    skipped.push(SkippedFix {
                        rule_id: finding.rule_id.clone(),
                        variable: finding.variable.clone(),
                        reason,
                    });
                }
            }
        }

        Ok(Remediation {
            data: DomainData::new(dataset, spec),
            actions,
            skipped,
        })
    }
}
