//! Pattern matching over source text and hex bytecode.
//!
//! Responsibilities:
//! - Find the leftmost occurrence of a rule in a text blob
//! - Build positional, human-readable evidence strings
//! - Evaluate the full registries in order, one finding per matched rule
//!
//! Non-responsibilities:
//! - Absence heuristics (handled in `rules::heuristics`)
//! - Severity aggregation (handled in `rules::classify` / `report::score`)

use regex::{Regex, RegexBuilder};

use crate::report::model::Finding;
use crate::rules::catalog::{BYTECODE_RULES, MatchStrategy, Rule, SOURCE_RULES};

/// Finds the leftmost occurrence of `rule` in `text`.
///
/// Returns the byte offset of the first match only; one finding per rule
/// per analysis regardless of how often the pattern occurs.
///
/// # Panics
///
/// Panics when called with a `Substring` rule. Substring rules carry raw
/// opcode patterns that are only meaningful against normalized bytecode;
/// routing one here is a bug in the rule registry, not a user error.
pub fn match_source_rule(rule: &Rule, text: &str) -> Option<usize> {
    let regex = match rule.strategy {
        MatchStrategy::Word => compile(&format!(r"\b{}\b", regex::escape(rule.pattern))),
        MatchStrategy::Regex => compile(rule.pattern),
        MatchStrategy::Substring => {
            panic!("substring rule '{}' cannot match source text", rule.id)
        }
    };

    regex.find(text).map(|m| m.start())
}

fn compile(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("registry patterns are static and must compile")
}

/// Evaluates every source rule against `source` in registry order.
///
/// An empty source is a normal condition (unverified contract) and
/// yields no findings.
pub fn analyze_source(source: &str) -> Vec<Finding> {
    if source.is_empty() {
        return Vec::new();
    }

    SOURCE_RULES
        .iter()
        .filter_map(|rule| {
            match_source_rule(rule, source).map(|offset| Finding {
                id: format!("source:{}", rule.id),
                title: rule.title.to_string(),
                description: rule.description.to_string(),
                severity: rule.severity,
                evidence: Some(line_evidence(
                    source,
                    offset,
                    &format!("matched '{}'", rule.id),
                )),
            })
        })
        .collect()
}

/// Scans hex bytecode for known opcode byte patterns.
///
/// Input is lower-cased and every `0x` token removed before the
/// containment check. The check is byte-alignment-unaware: a pattern can
/// match at an odd offset (inside a push argument, for example). That is
/// an accepted approximation; tightening it would change results and
/// must be treated as a behavior change, not a fix.
pub fn analyze_bytecode(bytecode: &str) -> Vec<Finding> {
    if bytecode.is_empty() {
        return Vec::new();
    }

    let normalized = bytecode.to_lowercase().replace("0x", "");

    BYTECODE_RULES
        .iter()
        .filter(|rule| normalized.contains(rule.pattern))
        .map(|rule| Finding {
            id: format!("bytecode:{}", rule.id),
            title: rule.title.to_string(),
            description: rule.description.to_string(),
            severity: rule.severity,
            evidence: Some(format!("Found opcode sequence '{}'.", rule.pattern)),
        })
        .collect()
}

/// Builds a `"Line N: <trimmed line> (<label>)"` evidence string for a
/// match at byte `offset`.
///
/// The line number is 1-based, computed from the newlines strictly
/// before the match offset.
pub(crate) fn line_evidence(text: &str, offset: usize, label: &str) -> String {
    let line_number = text[..offset].matches('\n').count() + 1;
    let line = text.split('\n').nth(line_number - 1).unwrap_or("").trim();
    format!("Line {line_number}: {line} ({label})")
}
