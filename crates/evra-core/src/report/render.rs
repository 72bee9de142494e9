//! Report rendering: the Markdown security report and the JSON contract.
//!
//! The Markdown document has exactly four sections in a fixed order:
//! Summary, Technical Issues, AI Findings, Security Score. Section order
//! and the fixed phrases below are part of the output contract; report
//! consumers key on them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::report::model::{Finding, LlmFinding, RiskReport};
use crate::report::score::{security_score, severity_rank};

/// Best-effort function-name extraction from evidence text.
static FUNCTION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"function\s+(\w+)").expect("static pattern"));

/// Serializes the full report as pretty-printed JSON.
pub fn to_json(report: &RiskReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Renders the report as a Markdown document.
pub fn render_markdown(report: &RiskReport) -> String {
    [
        "# Security Report".to_string(),
        String::new(),
        "## Summary".to_string(),
        build_summary(report),
        String::new(),
        "## Technical Issues".to_string(),
        build_technical_issues(&report.static_findings),
        String::new(),
        "## AI Findings".to_string(),
        build_ai_findings(&report.llm_findings),
        String::new(),
        "## Security Score".to_string(),
        build_security_score(report),
    ]
    .join("\n")
}

fn build_summary(report: &RiskReport) -> String {
    if report.static_findings.is_empty() && report.llm_findings.is_empty() {
        return "No issues were detected by static or AI analysis.".to_string();
    }

    let overview = format!(
        "The contract has **{}** static findings and **{}** AI findings.",
        report.static_findings.len(),
        report.llm_findings.len()
    );

    let ranked = collect_top_issues(report);
    if ranked.is_empty() {
        return format!("{overview} No high-severity risks were detected.");
    }

    let top = ranked
        .iter()
        .take(3)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("; ");
    format!("{overview} Most critical risks: {top}.")
}

fn build_technical_issues(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return "- No static issues detected.".to_string();
    }

    let mut lines = Vec::new();
    for finding in findings {
        let function = extract_function_name(finding.evidence.as_deref().unwrap_or(""));
        lines.push(format!(
            "- **{}** | Function: `{}` | Severity: **{}**",
            finding.title, function, finding.severity
        ));
        lines.push(format!("  - {}", finding.description));
    }
    lines.join("\n")
}

fn build_ai_findings(findings: &[LlmFinding]) -> String {
    if findings.is_empty() {
        return "- No AI findings available.".to_string();
    }

    let mut lines = Vec::new();
    for finding in findings {
        lines.push(format!(
            "- **{}** | Function: `{}` | Severity: **{}**",
            finding.issue, finding.function, finding.severity
        ));
        lines.push(format!("  - {}", finding.explanation));
        lines.push(format!("  - Recommendation: {}", finding.recommendation));
    }
    lines.join("\n")
}

fn build_security_score(report: &RiskReport) -> String {
    let breakdown = security_score(&report.static_findings, &report.llm_findings);
    // Raw deduction equals total points by construction; both are
    // reported so score lines stay auditable.
    let raw_deduction = breakdown.total_points;
    format!(
        "**{:.1} / 100** — Score starts at 100 and subtracts weighted points per severity \
         (low=1, medium=5, high=10, critical=25), then clamps at 0.0 \
         (total points: {:.1}, raw deduction: {:.1}, capped deduction: {:.1}).",
        breakdown.score, breakdown.total_points, raw_deduction, breakdown.capped_deduction
    )
}

/// Every finding title ordered by severity rank, highest first. Ties
/// keep encounter order (static findings before model findings).
fn collect_top_issues(report: &RiskReport) -> Vec<String> {
    let mut issues: Vec<(u8, &str)> = report
        .static_findings
        .iter()
        .map(|f| (severity_rank(f.severity), f.title.as_str()))
        .chain(
            report
                .llm_findings
                .iter()
                .map(|f| (severity_rank(f.severity), f.issue.as_str())),
        )
        .collect();

    // Stable sort: equal ranks preserve encounter order.
    issues.sort_by(|a, b| b.0.cmp(&a.0));
    issues.into_iter().map(|(_, title)| title.to_string()).collect()
}

fn extract_function_name(evidence: &str) -> String {
    FUNCTION_NAME
        .captures(evidence)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}
