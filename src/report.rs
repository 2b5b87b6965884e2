use anyhow::Result;

use crate::pipeline::Aggregation;

/// Render the grouped names, one type per line, followed by a summary.
pub fn render_text(agg: &Aggregation) -> String {
    let mut out = String::new();
    if agg.is_empty() {
        out.push_str("No pokemon matched the filter.\n");
    }
    for (category, names) in &agg.groups {
        out.push_str(&format!("{} ({}): {}\n", category, names.len(), names.join(", ")));
    }
    out.push_str(&format!("\n{} scanned | {} matched\n", agg.scanned, agg.matched));
    out
}

pub fn render_json(agg: &Aggregation) -> Result<String> {
    Ok(serde_json::to_string_pretty(&agg.groups)?)
}
