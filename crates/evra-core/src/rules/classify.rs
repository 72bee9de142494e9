//! Overall-risk bucketing.
//!
//! Derives the report-level risk label from static findings by summing
//! per-severity points and mapping the total onto three buckets:
//!
//!   - total < 2.0 → low
//!   - total < 4.0 → medium
//!   - otherwise   → high
//!
//! The policy is additive on purpose: an accumulation of low-grade
//! findings escalates the label even when no single finding is high
//! severity. This is not the same thing as "highest severity present".

use crate::report::model::Finding;
use crate::rules::catalog::Severity;

/// Per-finding points used only for the overall-risk bucket.
///
/// Distinct from the 0-100 score weights in `report::score`; the two
/// tables must not be merged.
fn bucket_points(severity: Severity) -> f64 {
    match severity {
        Severity::Low => 0.5,
        Severity::Medium => 1.0,
        Severity::High => 2.0,
        Severity::Critical => 3.0,
    }
}

/// Maps static findings onto the report's `overall_risk` label.
///
/// Deterministic: depends only on the multiset of severities present,
/// never on finding order. The bucket never reaches `critical`; the
/// label is a coarse triage signal, not a severity maximum.
pub fn overall_risk(findings: &[Finding]) -> Severity {
    let total: f64 = findings.iter().map(|f| bucket_points(f.severity)).sum();

    if total < 2.0 {
        Severity::Low
    } else if total < 4.0 {
        Severity::Medium
    } else {
        Severity::High
    }
}
