//! Output formats for a names report.

pub mod text;

pub use text::{render_tree, render_text_report};

use crate::report::ReportData;

/// Pretty-printed JSON of the whole report.
pub fn render_json_report(data: &ReportData) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(data)?;
    json.push('\n');
    Ok(json)
}
