use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use evra_core::report::model::RiskReport;
use evra_core::report::render;
use evra_core::rules::heuristics::check_missing_modifiers;
use evra_core::rules::matcher::{analyze_bytecode, analyze_source};

mod args;
mod cache;
mod chain;
mod config;
mod enrich;
mod eval;
mod explorer;
mod retry;
mod rpc;

use args::{Args, OutputFormat};
use cache::FileCache;
use config::Settings;
use retry::RetryPolicy;

const CACHE_DIR: &str = ".cache";
const CACHE_TTL: Duration = Duration::from_secs(3600);

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = Settings::from_env();

    // Fixture evaluation mode bypasses report generation entirely.
    if let (Some(source_path), Some(expected_path)) = (&args.source_file, &args.expected) {
        return evaluate_fixture_file(source_path, expected_path, &args);
    }

    let report = match &args.source_file {
        Some(path) => analyze_local_file(path, &args, &settings)?,
        None => analyze_deployed_contract(&args, &settings)?,
    };

    let output = match args.format {
        OutputFormat::Json => render::to_json(&report)?,
        OutputFormat::Markdown => render::render_markdown(&report),
    };

    match &args.out {
        Some(path) => fs::write(path, &output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{output}"),
    }

    Ok(())
}

/// Evaluates a labeled exploit fixture and writes the detection report.
fn evaluate_fixture_file(source_path: &Path, expected_path: &Path, args: &Args) -> Result<()> {
    let source = fs::read_to_string(source_path)
        .with_context(|| format!("failed to read {}", source_path.display()))?;
    let expected = eval::load_expected_ids(expected_path)?;

    info!("evaluating fixture {}", source_path.display());
    let outcome = eval::evaluate_fixture(&source, &expected);
    if !outcome.all_detected() {
        warn!("{} expected findings were missed", outcome.missed.len());
    }

    let output = eval::render_fixture_report(&outcome);
    match &args.out {
        Some(path) => fs::write(path, &output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{output}"),
    }
    Ok(())
}

/// Offline mode: analyze a local Solidity file, no network involved.
fn analyze_local_file(path: &Path, args: &Args, settings: &Settings) -> Result<RiskReport> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    info!("analyzing local file {}", path.display());
    let mut findings = analyze_source(&source);
    findings.extend(check_missing_modifiers(&source));

    let label = args
        .address
        .clone()
        .unwrap_or_else(|| path.display().to_string());
    let mut report = RiskReport::new(label, args.chain.as_str(), findings);
    enrich::enrich_report(&mut report, settings, &source);
    Ok(report)
}

/// Online mode: fetch bytecode and verified source, then analyze both.
fn analyze_deployed_contract(args: &Args, settings: &Settings) -> Result<RiskReport> {
    let address = args
        .address
        .as_deref()
        .context("--address is required unless --source-file is used")?;

    let chain_id = chain::resolve_chain_id(&args.chain).unwrap_or_else(|| {
        warn!(
            "unknown chain '{}', falling back to ethereum mainnet",
            args.chain
        );
        chain::DEFAULT_CHAIN_ID
    });

    let cache = open_cache();
    let policy = RetryPolicy::default();

    let bytecode = fetch_bytecode(settings, address, cache.as_ref(), &policy);
    let source = fetch_source(settings, chain_id, address, cache.as_ref(), &policy);

    if bytecode.is_empty() && source.is_empty() {
        bail!("no contract code detected for {address}");
    }

    info!("running static analysis");
    let mut findings = analyze_bytecode(&bytecode);
    findings.extend(analyze_source(&source));
    findings.extend(check_missing_modifiers(&source));

    let mut report = RiskReport::new(address, args.chain.as_str(), findings);
    enrich::enrich_report(&mut report, settings, &source);
    Ok(report)
}

fn open_cache() -> Option<FileCache> {
    match FileCache::new(CACHE_DIR, CACHE_TTL) {
        Ok(cache) => Some(cache),
        Err(error) => {
            warn!("response cache unavailable: {error}");
            None
        }
    }
}

/// Fetches deployed bytecode, degrading to an empty string on any
/// failure so the analysis can continue on whatever inputs exist.
fn fetch_bytecode(
    settings: &Settings,
    address: &str,
    cache: Option<&FileCache>,
    policy: &RetryPolicy,
) -> String {
    let Some(rpc_url) = settings.rpc_url.as_deref() else {
        warn!("RPC_URL is not set, skipping bytecode fetch");
        return String::new();
    };

    let cache_key = format!("bytecode:{address}");
    if let Some(hit) = cache.and_then(|c| c.get(&cache_key)) {
        info!("bytecode served from cache");
        return hit;
    }

    let client = match rpc::RpcClient::new(rpc_url) {
        Ok(client) => client,
        Err(error) => {
            warn!("rpc client unavailable: {error}");
            return String::new();
        }
    };

    info!("fetching bytecode for {address}");
    match retry::with_retry(policy, "eth_getCode", || client.get_bytecode(address)) {
        Ok(bytecode) => {
            if bytecode.is_empty() {
                warn!("address {address} has no bytecode");
            } else if let Some(cache) = cache {
                cache.set(&cache_key, &bytecode);
            }
            bytecode
        }
        Err(error) => {
            warn!("bytecode fetch failed: {error}");
            String::new()
        }
    }
}

/// Fetches verified source from the explorer, degrading like
/// `fetch_bytecode`. An unverified contract is logged, not an error.
fn fetch_source(
    settings: &Settings,
    chain_id: u32,
    address: &str,
    cache: Option<&FileCache>,
    policy: &RetryPolicy,
) -> String {
    let Some(api_key) = settings.etherscan_api_key.as_deref() else {
        warn!("ETHERSCAN_API_KEY is not set, skipping source fetch");
        return String::new();
    };

    let cache_key = format!("source:{chain_id}:{address}");
    if let Some(hit) = cache.and_then(|c| c.get(&cache_key)) {
        info!("verified source served from cache");
        return hit;
    }

    let client = match explorer::ExplorerClient::new(api_key, chain_id) {
        Ok(client) => client,
        Err(error) => {
            warn!("explorer client unavailable: {error}");
            return String::new();
        }
    };

    info!("fetching verified source for {address}");
    match retry::with_retry(policy, "getsourcecode", || client.get_source_code(address)) {
        Ok(result) => {
            if result.source.is_empty() {
                warn!(
                    "no verified source for {address} (status={:?} message={:?} detail={:?})",
                    result.status, result.message, result.detail
                );
            } else if let Some(cache) = cache {
                cache.set(&cache_key, &result.source);
            }
            result.source
        }
        Err(error) => {
            warn!("source fetch failed: {error}");
            String::new()
        }
    }
}
