use colored::Colorize;
use serde::Serialize;
use std::collections::HashMap;

/// Report order: most referenced first, ties broken by key.
fn sorted_entries(index: &HashMap<String, u64>) -> Vec<(&String, &u64)> {
    let mut entries: Vec<(&String, &u64)> = index.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    entries
}

/// Render the visit index as the human-readable crawl report.
pub fn generate_report(base_url: &str, index: &HashMap<String, u64>) -> String {
    let entries = sorted_entries(index);

    let mut report = String::new();
    report.push_str(&format!("{}\n", "━".repeat(52)));
    report.push_str(&format!("  REPORT for {}\n", base_url));
    report.push_str(&format!("{}\n\n", "━".repeat(52)));

    report.push_str(&format!("  Pages found: {}\n", entries.len()));
    let total_refs: u64 = entries.iter().map(|(_, count)| **count).sum();
    report.push_str(&format!("  Total internal references: {}\n\n", total_refs));

    for (page, count) in entries {
        report.push_str(&format!(
            "  {} {} {}\n",
            format!("{:>5}", count).green().bold(),
            "→".blue(),
            page
        ));
    }

    report
}

#[derive(Serialize)]
struct JsonReport<'a> {
    base_url: &'a str,
    pages: Vec<JsonPage<'a>>,
}

#[derive(Serialize)]
struct JsonPage<'a> {
    page: &'a str,
    references: u64,
}

/// Render the visit index as JSON, same ordering as the text report.
pub fn generate_json_report(base_url: &str, index: &HashMap<String, u64>) -> String {
    let pages = sorted_entries(index)
        .into_iter()
        .map(|(page, count)| JsonPage {
            page,
            references: *count,
        })
        .collect();

    let report = JsonReport { base_url, pages };
    let mut out = serde_json::to_string_pretty(&report).unwrap();
    out.push('\n');
    out
}
