//! Rule evaluation engine for the converge fix loop.
//!
//! - **evaluator**: the pluggable `RuleEvaluator` contract and pass context
//! - **engine**: `ValidationEngine` with evaluator failure isolation
//! - **checks**: the default rule set, one module per check

pub mod checks;
mod engine;
mod evaluator;

pub use engine::{ValidationEngine, filter_results};
pub use evaluator::{RuleContext, RuleEvaluator};
