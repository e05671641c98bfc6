//! Issue classification and deterministic remediation.
//!
//! - **classify**: the policy table deciding auto-fixable vs. needs-human
//! - **fixes**: the closed set of pure fix functions
//! - **remediator**: dispatch, audit trail, and the startup consistency
//!   check between the classifier policy and the fixer table

pub mod classify;
mod context;
pub mod fixes;
mod remediator;

pub use classify::{Classifier, Policy, default_policy};
pub use context::FixContext;
pub use fixes::{FixInput, FixResult};
pub use remediator::{FixFn, Remediation, Remediator, SkippedFix, default_fixers};
