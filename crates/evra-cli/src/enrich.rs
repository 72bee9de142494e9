//! Enrichment boundary between the core report and an external model.
//!
//! Model review is strictly optional: every path through here ends in a
//! one-time enrichment of the report, never in an error. Structured
//! findings take precedence; anything that goes wrong degrades to a
//! free-text summary so the static analysis always survives.

use evra_core::report::model::{LlmFinding, RiskReport};

use crate::config::Settings;

pub const SKIP_MESSAGE: &str = "LLM summary skipped because OPENAI_API_KEY is not set.";
pub const NO_SOURCE_MESSAGE: &str =
    "LLM review skipped because no verified source is available.";
pub const NOT_WIRED_MESSAGE: &str = "LLM review is not wired to a provider in this build.";

/// Seam for the external text-generation call.
///
/// An engine returns the model's raw response text; parsing and
/// degradation stay on this side of the seam.
pub trait ModelEngine {
    fn review(&self, source: &str) -> anyhow::Result<String>;
}

/// Resolves the engine for the current configuration.
///
/// The default build wires no provider; the seam exists so one can be
/// added without touching the orchestration flow.
fn configured_engine(_settings: &Settings) -> Option<Box<dyn ModelEngine>> {
    None
}

/// Runs the optional model review and applies the outcome to `report`.
pub fn enrich_report(report: &mut RiskReport, settings: &Settings, source: &str) {
    if settings.openai_api_key.is_none() {
        report.attach_llm_summary(SKIP_MESSAGE);
        return;
    }
    if source.is_empty() {
        report.attach_llm_summary(NO_SOURCE_MESSAGE);
        return;
    }

    match configured_engine(settings) {
        Some(engine) => apply_model_response(report, engine.review(source)),
        None => report.attach_llm_summary(NOT_WIRED_MESSAGE),
    }
}

/// Applies a model response to the report.
///
/// A response parsing as a JSON array of findings is attached
/// structurally; an empty array, a parse failure, or a transport
/// failure all degrade to a summary line.
fn apply_model_response(report: &mut RiskReport, response: anyhow::Result<String>) {
    match response {
        Ok(raw) => match serde_json::from_str::<Vec<LlmFinding>>(&raw) {
            Ok(findings) if !findings.is_empty() => report.attach_llm_findings(findings),
            Ok(_) => report.attach_llm_summary("Model review returned no findings."),
            Err(error) => report.attach_llm_summary(format!("request failed: {error}")),
        },
        Err(error) => report.attach_llm_summary(format!("request failed: {error}")),
    }
}
