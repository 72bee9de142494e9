//! Chain-name resolution for the explorer API.

/// Chain id used when the requested chain is not recognized.
pub const DEFAULT_CHAIN_ID: u32 = 1;

/// Maps a chain name onto its explorer chain id, case-insensitively.
///
/// `None` means the name is unknown; callers fall back to
/// [`DEFAULT_CHAIN_ID`] after logging.
pub fn resolve_chain_id(chain: &str) -> Option<u32> {
    match chain.to_lowercase().as_str() {
        "ethereum" | "mainnet" => Some(1),
        _ => None,
    }
}
