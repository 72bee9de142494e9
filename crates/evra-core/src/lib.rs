pub mod report;
pub mod rules;

pub const TOOL_NAME: &str = "evra";

/// Version of the built-in rule catalog.
/// Bump when rules are added, removed, or change severity.
pub const RULE_CATALOG_VERSION: &str = "0.1.0";
