//! DataFrame value helpers shared by evaluators and fixers.

use polars::prelude::{AnyValue, DataFrame};

/// Render any cell value as a string; nulls become empty.
pub fn any_to_string(value: AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(text) => text.to_string(),
        AnyValue::StringOwned(text) => text.to_string(),
        other => other.to_string(),
    }
}

/// Null or blank-after-trim counts as missing.
pub fn is_missing_value(value: &AnyValue) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::String(text) => text.trim().is_empty(),
        AnyValue::StringOwned(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// All values of a column rendered to trimmed strings, or None when the
/// column does not exist.
pub fn column_trimmed_values(df: &DataFrame, column: &str) -> Option<Vec<String>> {
    let series = df.column(column).ok()?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let raw = any_to_string(series.get(idx).unwrap_or(AnyValue::Null));
        values.push(raw.trim().to_string());
    }
    Some(values)
}
