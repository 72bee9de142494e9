use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Risk level attached to every finding.
///
/// Ordering is semantic: `Low < Medium < High < Critical`. The numeric
/// tables derived from a severity live next to their consumers
/// (`rules::classify` for bucket points, `report::score` for score
/// weights and rank) so the independent scales cannot be conflated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown severity: {0}")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(ParseSeverityError(other.to_string())),
        }
    }
}

/// How a rule's `pattern` is interpreted by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Case-insensitive whole-word match of the literal pattern.
    Word,
    /// Case-insensitive regular expression, no word-boundary constraint.
    Regex,
    /// Case-normalized containment check; bytecode rules only.
    Substring,
}

/// Immutable pattern rule. Defined once, never mutated.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Unique identifier used in finding ids and tests.
    pub id: &'static str,
    /// Pattern text, interpreted per `strategy`.
    pub pattern: &'static str,
    /// Human-readable label shown in the report.
    pub title: &'static str,
    /// Why the matched construct is risky.
    pub description: &'static str,
    pub severity: Severity,
    pub strategy: MatchStrategy,
}

/// Rules applied to verified contract source code.
///
/// Registry order carries no matching semantics (every rule is always
/// evaluated) but fixes the order findings appear in report output.
pub const SOURCE_RULES: &[Rule] = &[
    Rule {
        id: "delegatecall",
        pattern: "delegatecall",
        title: "Use of delegatecall",
        description: "delegatecall can allow code execution in caller context.",
        severity: Severity::High,
        strategy: MatchStrategy::Word,
    },
    Rule {
        id: "selfdestruct",
        pattern: "selfdestruct",
        title: "Use of selfdestruct",
        description: "selfdestruct can permanently remove contract code.",
        severity: Severity::High,
        strategy: MatchStrategy::Word,
    },
    Rule {
        id: "tx.origin",
        pattern: "tx.origin",
        title: "Use of tx.origin",
        description: "tx.origin is unsafe for authorization checks.",
        severity: Severity::Medium,
        strategy: MatchStrategy::Word,
    },
    Rule {
        id: "call.value",
        pattern: r"call\s*\.\s*value",
        title: "Use of call.value",
        description: "call.value can be unsafe and is discouraged in modern Solidity.",
        severity: Severity::High,
        strategy: MatchStrategy::Regex,
    },
    Rule {
        id: "upgradeable",
        pattern: "upgradeable",
        title: "Upgradeable pattern",
        description: "Upgradeable contracts can change logic after deployment.",
        severity: Severity::Medium,
        strategy: MatchStrategy::Word,
    },
    Rule {
        id: "owner",
        pattern: "owner",
        title: "Owner privileges",
        description: "Owner-only controls can enable privileged actions.",
        severity: Severity::Low,
        strategy: MatchStrategy::Word,
    },
];

/// Rules applied to raw bytecode when source code is unavailable.
pub const BYTECODE_RULES: &[Rule] = &[
    Rule {
        id: "opcode:selfdestruct",
        pattern: "ff",
        title: "Possible selfdestruct opcode",
        description: "Bytecode contains 0xFF, which can represent SELFDESTRUCT.",
        severity: Severity::High,
        strategy: MatchStrategy::Substring,
    },
    Rule {
        id: "opcode:delegatecall",
        pattern: "f4",
        title: "Possible delegatecall opcode",
        description: "Bytecode contains 0xF4, which can represent DELEGATECALL.",
        severity: Severity::High,
        strategy: MatchStrategy::Substring,
    },
];
