//! Console scan report printed after a session.

use mapscrape_core::{BusinessRecord, SessionSummary};

const RULE_WIDTH: usize = 60;
const PREVIEW_COUNT: usize = 5;

/// Renders coverage statistics and the first few records.
#[must_use]
pub(crate) fn format_scan_report(summary: &SessionSummary, records: &[BusinessRecord]) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let coverage = summary.coverage;

    let mut out = format!("{heavy}\nSCAN REPORT\n{heavy}\n");
    out.push_str(&format!(
        "Finished: {}\n",
        summary.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Target:   {}\n", summary.target));
    out.push_str(&format!("Found:    {}\n", summary.collected));
    out.push_str(&format!("Outcome:  {}\n", summary.termination));
    out.push_str(&format!("{light}\n"));
    out.push_str(&coverage_line(
        "Phone:   ",
        coverage.with_phone,
        coverage.total,
        coverage.phone_ratio(),
    ));
    out.push_str(&coverage_line(
        "Address: ",
        coverage.with_address,
        coverage.total,
        coverage.address_ratio(),
    ));
    out.push_str(&coverage_line(
        "Rating:  ",
        coverage.with_rating,
        coverage.total,
        coverage.rating_ratio(),
    ));
    out.push_str(&format!("{light}\n"));

    if !records.is_empty() {
        out.push_str(&format!("FIRST {PREVIEW_COUNT} RESULTS:\n"));
        for record in records.iter().take(PREVIEW_COUNT) {
            out.push_str(&format!("{}. {}\n", record.sequence, record.name));
            for (label, value) in [
                ("address:", &record.address),
                ("phone:  ", &record.phone),
                ("rating: ", &record.rating),
            ] {
                if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                    out.push_str(&format!("   {label} {value}\n"));
                }
            }
        }
    }
    out.push_str(&heavy);
    out
}

fn coverage_line(label: &str, with: usize, total: usize, ratio: f64) -> String {
    format!("{label} {with}/{total} ({:.1}%)\n", ratio * 100.0)
}
