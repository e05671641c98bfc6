use anyhow::Result;

use converge_model::{DomainData, Finding, RuleCategory, Severity, rules};

use crate::evaluator::{RuleContext, RuleEvaluator};

/// The output dataset name must be the lowercase domain code.
pub struct FileNaming;

impl RuleEvaluator for FileNaming {
    fn rule_id(&self) -> &str {
        rules::FILE_NAMING
    }

    fn description(&self) -> &str {
        "Dataset file name differs from the lowercase domain code"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Metadata
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(
        &self,
        domain: &str,
        data: &DomainData,
        _ctx: &RuleContext<'_>,
    ) -> Result<Vec<Finding>> {
        let expected = domain.to_lowercase();
        let current = data.spec.dataset_name.as_deref();
        if current == Some(expected.as_str()) {
            return Ok(Vec::new());
        }
        let message = match current {
            Some(name) => {
                format!("Dataset name {name} differs from the expected name {expected}")
            }
            None => format!("Dataset name is not set; expected {expected}"),
        };
        let offending = current.map(|name| vec![name.to_string()]).unwrap_or_default();
        Ok(vec![self.make_finding(domain, None, message, 1, offending)])
    }
}
