use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rules::catalog::Severity;
use crate::rules::classify;

/// A single static-analysis finding.
///
/// `id` is namespaced by origin: `source:<rule-id>`,
/// `bytecode:<rule-id>`, or `heuristic:<check-name>`. Findings from text
/// matches carry 1-based line evidence; findings from bytecode matches
/// carry an opcode-sequence evidence string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub evidence: Option<String>,
}

/// Model-derived finding supplied by the enrichment boundary.
///
/// Scored identically to a static finding: anything exposing a severity
/// participates in the security score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmFinding {
    pub issue: String,
    pub function: String,
    pub severity: Severity,
    pub explanation: String,
    pub recommendation: String,
}

/// Unified analysis report.
///
/// This struct is the stable JSON contract consumed by report readers.
/// It is constructed once per analysis run after all static findings are
/// collected and stays immutable afterwards, except for the one-time
/// enrichment step that fills `llm_findings` or `llm_summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub contract_address: String,
    pub chain: String,
    pub generated_at: DateTime<Utc>,
    pub overall_risk: Severity,
    pub static_findings: Vec<Finding>,
    pub llm_findings: Vec<LlmFinding>,
    pub llm_summary: Option<String>,
}

impl RiskReport {
    /// Builds a report from collected static findings, deriving
    /// `overall_risk` via the point-sum bucket policy.
    pub fn new(
        contract_address: impl Into<String>,
        chain: impl Into<String>,
        static_findings: Vec<Finding>,
    ) -> Self {
        let overall_risk = classify::overall_risk(&static_findings);
        Self {
            contract_address: contract_address.into(),
            chain: chain.into(),
            generated_at: Utc::now(),
            overall_risk,
            static_findings,
            llm_findings: Vec::new(),
            llm_summary: None,
        }
    }

    /// One-time enrichment with structured model findings.
    ///
    /// Structured findings take precedence over a free-text summary; any
    /// previously recorded summary is cleared.
    pub fn attach_llm_findings(&mut self, findings: Vec<LlmFinding>) {
        self.llm_findings = findings;
        self.llm_summary = None;
    }

    /// One-time enrichment with a free-text summary. Ignored when
    /// structured findings are already present.
    pub fn attach_llm_summary(&mut self, summary: impl Into<String>) {
        if self.llm_findings.is_empty() {
            self.llm_summary = Some(summary.into());
        }
    }
}
