//! JSON-RPC client for deployed bytecode.
//!
//! A single method is needed: `eth_getCode` at the latest block. The
//! node returns `"0x"` for an address without code; that is mapped to an
//! empty string so the analysis layer sees its normal "unavailable"
//! representation.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid contract address format: {0}")]
    InvalidAddress(String),
    #[error("rpc transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("rpc response carried neither result nor error")]
    MalformedResponse,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug)]
pub struct RpcClient {
    http: Client,
    url: String,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Result<Self, RpcError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Fetches the bytecode deployed at `address`.
    ///
    /// Returns an empty string when the address holds no code.
    pub fn get_bytecode(&self, address: &str) -> Result<String, RpcError> {
        validate_address(address)?;

        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_getCode",
            "params": [address, "latest"],
        });

        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        decode_response(response)
    }
}

/// Requires the canonical `0x` + 40 hex digits address shape.
fn validate_address(address: &str) -> Result<(), RpcError> {
    match address.strip_prefix("0x") {
        Some(digits) if digits.len() == 40 && digits.bytes().all(|b| b.is_ascii_hexdigit()) => {
            Ok(())
        }
        _ => Err(RpcError::InvalidAddress(address.to_string())),
    }
}

fn decode_response(response: RpcResponse) -> Result<String, RpcError> {
    if let Some(error) = response.error {
        return Err(RpcError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    let result = response.result.ok_or(RpcError::MalformedResponse)?;
    if result == "0x" {
        Ok(String::new())
    } else {
        Ok(result)
    }
}
