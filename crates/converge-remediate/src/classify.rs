//! Issue classifier: decides machine-fixable vs. human-required.
//!
//! Dispatch is by rule id against an explicit policy table. Unrecognized
//! rule ids fail closed to needs-human. The function is pure: the same
//! finding and spec always classify the same way.

use std::collections::{BTreeMap, BTreeSet};

use converge_model::{
    Classification, Finding, FixType, MappingSpec, TerminologyRegistry, rules,
};

/// One entry in the classification policy table.
#[derive(Debug, Clone)]
pub enum Policy {
    /// Deterministically fixable regardless of finding content.
    AlwaysAuto { fix: FixType, reason: &'static str },
    /// Never machine-fixable.
    AlwaysHuman { reason: &'static str },
    /// Auto only when every offending value is a pure case variant of a
    /// valid term in the variable's codelist.
    CtCaseVariant,
    /// Auto only for variables whose value is a configured constant.
    DerivableConstant,
}

impl Policy {
    /// Whether this policy can ever classify a finding as auto-fixable.
    pub fn can_auto_fix(&self) -> bool {
        !matches!(self, Policy::AlwaysHuman { .. })
    }
}

/// The default policy table over the built-in rule set.
pub fn default_policy() -> BTreeMap<String, Policy> {
    let mut policy = BTreeMap::new();
    policy.insert(rules::CT_NON_EXTENSIBLE.to_string(), Policy::CtCaseVariant);
    policy.insert(rules::CT_EXTENSIBLE.to_string(), Policy::CtCaseVariant);
    policy.insert(
        rules::DOMAIN_IDENTIFIER.to_string(),
        Policy::AlwaysAuto {
            fix: FixType::DomainColumn,
            reason: "the domain identifier derives from the domain code",
        },
    );
    policy.insert(
        rules::REQUIRED_PRESENCE.to_string(),
        Policy::DerivableConstant,
    );
    policy.insert(
        rules::NAME_LENGTH.to_string(),
        Policy::AlwaysAuto {
            fix: FixType::TruncateName,
            reason: "over-long names truncate deterministically",
        },
    );
    policy.insert(
        rules::LABEL_LENGTH.to_string(),
        Policy::AlwaysAuto {
            fix: FixType::TruncateLabel,
            reason: "over-long labels truncate deterministically",
        },
    );
    policy.insert(
        rules::VALUE_LENGTH.to_string(),
        Policy::AlwaysHuman {
            reason: "truncating data values loses information",
        },
    );
    policy.insert(
        rules::DATETIME_FORMAT.to_string(),
        Policy::AlwaysHuman {
            reason: "date formats cannot be repaired without source context",
        },
    );
    policy.insert(
        rules::NON_ASCII.to_string(),
        Policy::AlwaysAuto {
            fix: FixType::AsciiSubstitute,
            reason: "fixed character substitution table applies",
        },
    );
    policy.insert(
        rules::FILE_NAMING.to_string(),
        Policy::AlwaysAuto {
            fix: FixType::FileNaming,
            reason: "the canonical name derives from the domain code",
        },
    );
    policy.insert(
        rules::START_END_ORDER.to_string(),
        Policy::AlwaysHuman {
            reason: "business rule deviations require clinical review",
        },
    );
    policy.insert(
        rules::SUBJECT_REFERENCE.to_string(),
        Policy::AlwaysHuman {
            reason: "cross-domain consistency requires review",
        },
    );
    policy
}

/// Pure classifier over the policy table.
pub struct Classifier<'a> {
    policy: BTreeMap<String, Policy>,
    terminology: &'a TerminologyRegistry,
    /// Uppercase names of variables whose value is a configured constant.
    derivable: BTreeSet<String>,
}

impl<'a> Classifier<'a> {
    pub fn new<I, S>(terminology: &'a TerminologyRegistry, derivable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            policy: default_policy(),
            terminology,
            derivable: derivable
                .into_iter()
                .map(|name| name.as_ref().to_uppercase())
                .collect(),
        }
    }

    /// Replace the policy table (for callers extending the rule set).
    pub fn with_policy(mut self, policy: BTreeMap<String, Policy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &BTreeMap<String, Policy> {
        &self.policy
    }

    /// Classify one finding against the current spec. Pure and idempotent.
    pub fn classify(&self, finding: &Finding, spec: &MappingSpec) -> Classification {
        let Some(policy) = self.policy.get(finding.rule_id.as_str()) else {
            return Classification::human(format!(
                "unrecognized rule id {}; review required",
                finding.rule_id
            ));
        };
        match policy {
            Policy::AlwaysAuto { fix, reason } => Classification::auto(*reason, *fix),
            Policy::AlwaysHuman { reason } => Classification::human(*reason),
            Policy::CtCaseVariant => self.classify_ct(finding, spec),
            Policy::DerivableConstant => self.classify_constant(finding),
        }
    }

    fn classify_ct(&self, finding: &Finding, spec: &MappingSpec) -> Classification {
        if finding.offending_values.is_empty() {
            return Classification::human("no offending values reported; review required");
        }
        let Some(variable_name) = finding.variable.as_deref() else {
            return Classification::human("finding names no variable; review required");
        };
        let Some(variable) = spec.variable(variable_name) else {
            return Classification::human(format!(
                "{variable_name} is not in the mapping spec; review required"
            ));
        };
        let Some(codelist) = self.terminology.resolve_for_variable(variable) else {
            return Classification::human(format!(
                "no codelist resolvable for {variable_name}; review required"
            ));
        };
        let all_case_variants = finding
            .offending_values
            .iter()
            .all(|value| codelist.case_variant_of(value).is_some());
        if all_case_variants {
            Classification::auto(
                "every offending value matches a valid term case-insensitively",
                FixType::CtCaseNormalize,
            )
        } else {
            Classification::human(
                "offending value(s) have no case-insensitive match in the codelist",
            )
        }
    }

    fn classify_constant(&self, finding: &Finding) -> Classification {
        match finding.variable.as_deref() {
            Some(variable) if self.derivable.contains(&variable.to_uppercase()) => {
                Classification::auto(
                    "the variable's value is a configured constant",
                    FixType::ConstantColumn,
                )
            }
            Some(variable) => Classification::human(format!(
                "{variable} is not deterministically derivable"
            )),
            None => Classification::human("finding names no variable; review required"),
        }
    }
}
