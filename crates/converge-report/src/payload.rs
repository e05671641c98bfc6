//! Versioned JSON payload for the validation report and audit trail.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

use converge_model::FixAction;

use crate::ValidationReport;

const REPORT_SCHEMA: &str = "sdtm-converge.fix-loop-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct ReportPayload<'a> {
    schema: &'static str,
    schema_version: u32,
    generated_at: String,
    study_id: &'a str,
    report: &'a ValidationReport,
    fix_actions: &'a [FixAction],
}

/// Write the report and flattened audit trail as pretty-printed JSON.
pub fn write_report_json(
    output_dir: &Path,
    report: &ValidationReport,
    fix_actions: &[FixAction],
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join("fix_loop_report.json");
    let payload = ReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        study_id: &report.study_id,
        report,
        fix_actions,
    };
    let json = serde_json::to_string_pretty(&payload)?;
    std::fs::write(&output_path, format!("{json}\n"))?;
    Ok(output_path)
}
