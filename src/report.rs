// 🧾 Report rendering - text and JSON views of an audit run

use crate::audit::{AuditReport, MissingCredential};
use crate::catalog::MergeOutcome;
use anyhow::{Context, Result};

const RULE: &str = "================================================================================";

/// How much of a report to print
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub top_n: usize,
    pub sample_limit: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            top_n: 50,
            sample_limit: 30,
        }
    }
}

fn banner(out: &mut String, title: &str) {
    out.push_str(&format!("{}\n{}\n{}\n", RULE, title, RULE));
}

/// Human-readable failure report
pub fn render_text(report: &AuditReport, options: &ReportOptions) -> String {
    let mut out = String::new();

    banner(&mut out, "NAME PARSING AUDIT REPORT");
    out.push_str(&format!("Run: {} ({})\n", report.run_id, report.generated_at.to_rfc3339()));
    out.push_str(&format!("Total rows analyzed: {}\n", report.total_rows));
    out.push_str(&format!("Rows with findings: {}\n", report.rows_with_findings()));
    out.push_str(&format!("Failure rate: {:.2}%\n", report.failure_rate() * 100.0));
    out.push_str(&format!("Total findings: {}\n", report.total_findings));
    out.push('\n');

    banner(&mut out, "FINDINGS BY CATEGORY");
    let mut categories: Vec<_> = report.by_category.iter().collect();
    categories.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (category, count) in categories {
        out.push_str(&format!("{:40} - {:4} occurrences\n", category.name(), count));
    }
    out.push('\n');

    banner(&mut out, &format!("TOP {} EXTRACTED TOKENS", options.top_n));
    for (token, count) in report.top_tokens(options.top_n) {
        out.push_str(&format!("{:30} - {:4} occurrences\n", token, count));
    }
    out.push('\n');

    let shown = report.failures.len().min(options.sample_limit);
    banner(&mut out, &format!("SAMPLE FAILURES (First {})", shown));
    for failure in report.failures.iter().take(options.sample_limit) {
        out.push_str(&format!("\nRow {}:\n", failure.row_index));
        out.push_str(&format!("  Input Name: {}\n", failure.row.original()));
        out.push_str(&format!(
            "  Output: {} | {}\n",
            failure.row.first_name(),
            failure.row.last_name()
        ));
        out.push_str(&format!("  Reasons: {}\n", failure.reasons().join(", ")));
    }

    out
}

/// Whole report as pretty JSON
pub fn render_json(report: &AuditReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize audit report")
}

/// Missing credentials with counts, example rows, then a copy-paste list in catalog order
pub fn render_missing(missing: &[MissingCredential]) -> String {
    let mut out = String::new();

    if missing.is_empty() {
        out.push_str("🎉 No missing credentials found!\n");
        return out;
    }

    banner(&mut out, "MISSING CREDENTIALS (sorted by frequency)");
    for credential in missing {
        out.push_str(&format!(
            "  {:<15} - {:>4} occurrences\n",
            credential.token, credential.count
        ));
    }
    out.push('\n');

    banner(&mut out, "EXAMPLES (first occurrence of each credential)");
    for credential in missing {
        for example in &credential.examples {
            out.push_str(&format!("\nRow {:>4}: {}\n", example.row_index, credential.token));
            out.push_str(&format!("  Input:  {}\n", example.original));
            out.push_str(&format!("  Output: Last Name = {}\n", example.last_name));
        }
    }
    out.push('\n');

    banner(&mut out, "CREDENTIALS TO ADD (copy-paste format)");
    let mut sorted: Vec<&str> = missing.iter().map(|m| m.token.as_str()).collect();
    sorted.sort_unstable();
    for token in &sorted {
        out.push_str(&format!("  \"{}\",\n", token));
    }
    out.push_str(&format!("\nTotal: {} credentials to add\n", sorted.len()));

    out
}

/// Outcome of a catalog merge
pub fn render_merge(before: usize, outcome: &MergeOutcome) -> String {
    let mut out = String::new();

    out.push_str(&format!("✅ Total credentials after merge: {}\n", outcome.catalog.len()));
    out.push_str(&format!("✅ New credentials added: {}\n", outcome.added.len()));
    if !outcome.collapsed.is_empty() {
        out.push_str(&format!(
            "⚠️  Duplicate entries collapsed: {}\n",
            outcome.collapsed.join(", ")
        ));
    }

    if !outcome.added.is_empty() {
        out.push('\n');
        banner(&mut out, &format!("NEW CREDENTIALS ({})", outcome.added.len()));
        for literal in outcome.added.iter().take(20) {
            out.push_str(&format!("  {}\n", literal));
        }
        if outcome.added.len() > 20 {
            out.push_str(&format!("  ... and {} more\n", outcome.added.len() - 20));
        }
    }

    out.push_str(&format!(
        "\nCredential count: {} → {} (+{})\n",
        before,
        outcome.catalog.len(),
        outcome.added.len()
    ));
    out
}

// ============================================================================
// TESTS
// ============================================================================
