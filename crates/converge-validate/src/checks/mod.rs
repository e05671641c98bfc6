//! Default rule evaluators.
//!
//! Each module implements one check against a domain dataset/spec pair.

mod consistency;
mod dates;
mod domain_identifier;
mod encoding;
mod length;
mod naming;
mod presence;
mod subject_reference;
mod terminology;

use std::collections::BTreeSet;

pub use consistency::StartEndOrder;
pub use dates::DatetimeFormat;
pub use domain_identifier::DomainIdentifier;
pub use encoding::NonAscii;
pub use length::{LabelLength, NameLength, ValueLength};
pub use naming::FileNaming;
pub use presence::RequiredPresence;
pub use subject_reference::SubjectReference;
pub use terminology::{ExtensibleTerminology, NonExtensibleTerminology};

use crate::evaluator::RuleEvaluator;

/// The default rule set, in execution order.
pub fn default_evaluators() -> Vec<Box<dyn RuleEvaluator>> {
    vec![
        Box::new(NonExtensibleTerminology),
        Box::new(ExtensibleTerminology),
        Box::new(DomainIdentifier),
        Box::new(RequiredPresence),
        Box::new(NameLength),
        Box::new(LabelLength),
        Box::new(ValueLength),
        Box::new(DatetimeFormat),
        Box::new(NonAscii),
        Box::new(FileNaming),
        Box::new(StartEndOrder),
        Box::new(SubjectReference),
    ]
}

/// Join up to `limit` values for a message, in sorted order.
pub(crate) fn sample(values: &BTreeSet<String>, limit: usize) -> String {
    values
        .iter()
        .take(limit)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}
