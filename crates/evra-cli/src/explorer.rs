//! Block-explorer client for verified contract source.
//!
//! Speaks the Etherscan-style `getsourcecode` query against the v2 API,
//! which multiplexes chains through a `chainid` parameter. The response
//! is reduced to the verified source string plus status/message/detail
//! diagnostics; the analysis core only ever sees the source string, the
//! diagnostics exist for log lines.

use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;

const BASE_URL: &str = "https://api.etherscan.io/v2/api";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("explorer transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Verified source plus the explorer's own diagnostics.
///
/// `source` is empty for unverified contracts; `detail` carries the
/// explorer's error text when the API rejected the request outright
/// (rate limits, bad key).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceCodeResult {
    pub source: String,
    pub status: Option<String>,
    pub message: Option<String>,
    pub detail: Option<String>,
}

#[derive(Debug)]
pub struct ExplorerClient {
    http: Client,
    api_key: String,
    chain_id: u32,
    base_url: String,
}

impl ExplorerClient {
    pub fn new(api_key: impl Into<String>, chain_id: u32) -> Result<Self, ExplorerError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            chain_id,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Fetches the verified source for `address` on the configured
    /// chain. An unverified contract is not an error; it comes back as
    /// an empty `source` with the explorer's diagnostics filled in.
    pub fn get_source_code(&self, address: &str) -> Result<SourceCodeResult, ExplorerError> {
        let payload: serde_json::Value = self
            .http
            .get(&self.base_url)
            .query(&[
                ("chainid", self.chain_id.to_string().as_str()),
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", address),
                ("apikey", self.api_key.as_str()),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        Ok(parse_source_payload(&payload))
    }
}

/// Reduces a `getsourcecode` payload to source + diagnostics.
///
/// The explorer overloads `result`: a list of contract entries on
/// success, a bare string on API-level failure. Both shapes are handled
/// without erroring; the core treats "no source" uniformly either way.
fn parse_source_payload(payload: &serde_json::Value) -> SourceCodeResult {
    let status = payload["status"].as_str().map(str::to_string);
    let message = payload["message"].as_str().map(str::to_string);

    let first = payload["result"].as_array().and_then(|entries| entries.first());
    let source = first
        .and_then(|entry| entry["SourceCode"].as_str())
        .unwrap_or_default()
        .to_string();

    // Error payloads put a plain string in `result`; unverified
    // contracts put their notice in the first entry's ABI field.
    let detail = payload["result"]
        .as_str()
        .or_else(|| {
            if source.is_empty() {
                first.and_then(|entry| entry["ABI"].as_str())
            } else {
                None
            }
        })
        .map(str::to_string);

    SourceCodeResult {
        source,
        status,
        message,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> SourceCodeResult {
        let payload = serde_json::from_str(raw).expect("test payload should deserialize");
        parse_source_payload(&payload)
    }

    #[test]
    fn verified_contract_yields_its_source() {
        let result = parse(
            r#"{
                "status": "1",
                "message": "OK",
                "result": [{"SourceCode": "contract C {}", "ABI": "[]"}]
            }"#,
        );
        assert_eq!(result.source, "contract C {}");
        assert_eq!(result.status.as_deref(), Some("1"));
        assert_eq!(result.message.as_deref(), Some("OK"));
        assert!(result.detail.is_none());
    }

    #[test]
    fn unverified_contract_yields_empty_source_with_detail() {
        let result = parse(
            r#"{
                "status": "1",
                "message": "OK",
                "result": [{"SourceCode": "", "ABI": "Contract source code not verified"}]
            }"#,
        );
        assert!(result.source.is_empty());
        assert_eq!(
            result.detail.as_deref(),
            Some("Contract source code not verified")
        );
    }

    #[test]
    fn api_error_string_lands_in_detail() {
        let result = parse(
            r#"{
                "status": "0",
                "message": "NOTOK",
                "result": "Max rate limit reached"
            }"#,
        );
        assert!(result.source.is_empty());
        assert_eq!(result.status.as_deref(), Some("0"));
        assert_eq!(result.detail.as_deref(), Some("Max rate limit reached"));
    }

    #[test]
    fn empty_result_list_is_tolerated() {
        let result = parse(r#"{"status": "1", "message": "OK", "result": []}"#);
        assert!(result.source.is_empty());
        assert!(result.detail.is_none());
    }

    #[test]
    fn missing_fields_are_tolerated() {
        let result = parse(r#"{}"#);
        assert_eq!(result, SourceCodeResult::default());
    }
}
