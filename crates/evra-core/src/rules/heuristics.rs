//! Absence heuristics: infer a missing guard from present risk markers.
//!
//! Unlike registry rules, which report what a contract *does*, these
//! checks report what it *lacks*. Each check emits at most one finding
//! and runs only over source text (there is no modifier concept in
//! bytecode). They are independent of the registry: a contract can
//! trigger both the `owner` rule match and the missing-onlyOwner
//! heuristic at once.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::report::model::Finding;
use crate::rules::catalog::Severity;
use crate::rules::matcher::line_evidence;

/// A `function` keyword with `external` or `public` before the body or
/// the end of the declaration.
static EXTERNAL_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"\bfunction\b[^{;]*?\b(?:external|public)\b")
        .case_insensitive(true)
        .build()
        .expect("static pattern")
});

/// Low-level call shapes that can re-enter the caller.
static REENTRANCY_RISK: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"delegatecall|call\s*\.?\s*value|\.call\b")
        .case_insensitive(true)
        .build()
        .expect("static pattern")
});

// Modifier tokens are case-sensitive: `nonReentrant` and `onlyOwner` are
// exact Solidity identifiers, and the owner tokens follow OpenZeppelin
// casing.
static NON_REENTRANT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bnonReentrant\b").expect("static pattern"));

static OWNER_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:owner|Ownable|transferOwnership)\b").expect("static pattern"));

static ONLY_OWNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bonlyOwner\b").expect("static pattern"));

/// Runs both modifier heuristics over `source`.
///
/// Evidence points at the first triggering site (the first
/// external/public declaration, or the first owner token), matching the
/// first-site-only policy of the registry matcher.
pub fn check_missing_modifiers(source: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    if source.is_empty() {
        return findings;
    }

    if let Some(m) = EXTERNAL_FUNCTION.find(source) {
        if REENTRANCY_RISK.is_match(source) && !NON_REENTRANT.is_match(source) {
            findings.push(Finding {
                id: "heuristic:missing-nonreentrant".to_string(),
                title: "Missing nonReentrant modifier".to_string(),
                description: "External functions with external calls detected, but no \
                              nonReentrant modifier found."
                    .to_string(),
                severity: Severity::Medium,
                evidence: Some(line_evidence(source, m.start(), "missing nonReentrant")),
            });
        }
    }

    if let Some(m) = OWNER_REFERENCE.find(source) {
        if !ONLY_OWNER.is_match(source) {
            findings.push(Finding {
                id: "heuristic:missing-onlyowner".to_string(),
                title: "Missing onlyOwner modifier".to_string(),
                description: "Owner-related patterns detected, but no onlyOwner modifier found."
                    .to_string(),
                severity: Severity::Medium,
                evidence: Some(line_evidence(source, m.start(), "missing onlyOwner")),
            });
        }
    }

    findings
}
