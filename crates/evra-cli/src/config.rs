use std::env;

/// Environment-derived settings for the network and enrichment steps.
///
/// Every field is optional: a missing key disables the corresponding
/// fetch instead of failing the run.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub etherscan_api_key: Option<String>,
    pub rpc_url: Option<String>,
    pub openai_api_key: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Blank values count as unset so that `FOO=` behaves like a
    /// missing variable.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            etherscan_api_key: read("ETHERSCAN_API_KEY"),
            rpc_url: read("RPC_URL"),
            openai_api_key: read("OPENAI_API_KEY"),
        }
    }
}
