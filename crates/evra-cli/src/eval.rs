//! Fixture evaluation mode: check the analyzers against a labeled
//! exploit contract.
//!
//! A fixture is a local Solidity file plus a JSON list of the finding
//! ids the analysis is expected to produce. The mode reports which
//! expected ids were detected, which were missed, and which findings
//! appeared without a label, so rule changes can be checked against
//! known-bad contracts.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use evra_core::rules::heuristics::check_missing_modifiers;
use evra_core::rules::matcher::analyze_source;

/// Outcome of evaluating one labeled fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureOutcome {
    /// Expected ids the analysis produced.
    pub detected: Vec<String>,
    /// Expected ids the analysis failed to produce.
    pub missed: Vec<String>,
    /// Produced ids that were not in the expected list.
    pub unexpected: Vec<String>,
}

impl FixtureOutcome {
    pub fn all_detected(&self) -> bool {
        self.missed.is_empty()
    }
}

/// Reads the expected finding ids from a JSON array of strings.
pub fn load_expected_ids(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of finding ids", path.display()))
}

/// Runs source analysis and heuristics over `source` and compares the
/// produced finding ids against `expected`.
///
/// Order within each outcome list is deterministic: detected and missed
/// follow the expected list, unexpected follows analysis order.
pub fn evaluate_fixture(source: &str, expected: &[String]) -> FixtureOutcome {
    let mut findings = analyze_source(source);
    findings.extend(check_missing_modifiers(source));
    let produced: Vec<String> = findings.into_iter().map(|f| f.id).collect();

    let (detected, missed): (Vec<String>, Vec<String>) = expected
        .iter()
        .cloned()
        .partition(|id| produced.contains(id));

    let unexpected = produced
        .into_iter()
        .filter(|id| !expected.contains(id))
        .collect();

    FixtureOutcome {
        detected,
        missed,
        unexpected,
    }
}

/// Renders the evaluation outcome as a Markdown document.
pub fn render_fixture_report(outcome: &FixtureOutcome) -> String {
    let mut lines = vec![
        "# Exploit Fixture Evaluation".to_string(),
        String::new(),
        format!(
            "Detected {} of {} expected findings.",
            outcome.detected.len(),
            outcome.detected.len() + outcome.missed.len()
        ),
        String::new(),
    ];

    lines.push("## Detected".to_string());
    push_ids(&mut lines, &outcome.detected, "- none");
    lines.push(String::new());

    lines.push("## Missed".to_string());
    push_ids(&mut lines, &outcome.missed, "- none");
    lines.push(String::new());

    lines.push("## Unexpected".to_string());
    push_ids(&mut lines, &outcome.unexpected, "- none");

    lines.join("\n")
}

fn push_ids(lines: &mut Vec<String>, ids: &[String], empty_marker: &str) {
    if ids.is_empty() {
        lines.push(empty_marker.to_string());
    } else {
        lines.extend(ids.iter().map(|id| format!("- `{id}`")));
    }
}
