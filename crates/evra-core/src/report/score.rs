//! Security score: a deduction-based 0-100 numeric summary.
//!
//! Independent of the overall-risk bucket in `rules::classify`. The
//! bucket labels the report; the score feeds the narrative score line.
//! Both are reproduced exactly and must not share weight tables.

use crate::report::model::{Finding, LlmFinding};
use crate::rules::catalog::Severity;

/// Deduction weight per finding, applied to the union of static and
/// model findings.
fn score_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Low => 1.0,
        Severity::Medium => 5.0,
        Severity::High => 10.0,
        Severity::Critical => 25.0,
    }
}

/// Severity rank used only to order findings for the summary's
/// top-issues list. Never used for scoring.
pub fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Low => 1,
        Severity::Medium => 2,
        Severity::High => 3,
        Severity::Critical => 4,
    }
}

/// Score plus the intermediate numbers, kept for auditability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub score: f64,
    /// Uncapped sum of weights across all findings.
    pub total_points: f64,
    /// Deduction actually applied, capped at 100.
    pub capped_deduction: f64,
}

/// Computes the security score over static and model findings.
///
/// Starts at 100, subtracts the weight sum capped at 100, floors at 0.
pub fn security_score(
    static_findings: &[Finding],
    llm_findings: &[LlmFinding],
) -> ScoreBreakdown {
    let total: f64 = static_findings
        .iter()
        .map(|f| score_weight(f.severity))
        .chain(llm_findings.iter().map(|f| score_weight(f.severity)))
        .sum();

    let capped_deduction = total.min(100.0);
    let score = (100.0 - capped_deduction).max(0.0);

    ScoreBreakdown {
        score,
        total_points: total,
        capped_deduction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_finding(severity: Severity) -> Finding {
        Finding {
            id: "t".to_string(),
            title: "t".to_string(),
            description: "t".to_string(),
            severity,
            evidence: None,
        }
    }

    fn model_finding(severity: Severity) -> LlmFinding {
        LlmFinding {
            issue: "t".to_string(),
            function: "t".to_string(),
            severity,
            explanation: "t".to_string(),
            recommendation: "t".to_string(),
        }
    }

    #[test]
    fn no_findings_scores_a_clean_100() {
        let breakdown = security_score(&[], &[]);
        assert_eq!(breakdown.score, 100.0);
        assert_eq!(breakdown.total_points, 0.0);
        assert_eq!(breakdown.capped_deduction, 0.0);
    }

    #[test]
    fn one_high_static_and_one_high_model_finding_score_80() {
        let breakdown = security_score(
            &[static_finding(Severity::High)],
            &[model_finding(Severity::High)],
        );
        assert_eq!(breakdown.score, 80.0);
        assert_eq!(breakdown.total_points, 20.0);
        assert_eq!(breakdown.capped_deduction, 20.0);
    }

    #[test]
    fn deduction_caps_at_100() {
        // Five criticals are 125 raw points; the score floors at 0.
        let findings = vec![static_finding(Severity::Critical); 5];
        let breakdown = security_score(&findings, &[]);
        assert_eq!(breakdown.total_points, 125.0);
        assert_eq!(breakdown.capped_deduction, 100.0);
        assert_eq!(breakdown.score, 0.0);
    }

    #[test]
    fn weights_follow_the_score_table() {
        let breakdown = security_score(
            &[
                static_finding(Severity::Low),
                static_finding(Severity::Medium),
            ],
            &[model_finding(Severity::Critical)],
        );
        assert_eq!(breakdown.total_points, 31.0);
        assert_eq!(breakdown.score, 69.0);
    }

    #[test]
    fn rank_orders_severities() {
        assert!(severity_rank(Severity::Critical) > severity_rank(Severity::High));
        assert!(severity_rank(Severity::High) > severity_rank(Severity::Medium));
        assert!(severity_rank(Severity::Medium) > severity_rank(Severity::Low));
    }
}
