use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "evra",
    version,
    about = "Risk analysis for EVM smart contracts"
)]
pub struct Args {
    /// Contract address (0x...); required unless --source-file is used
    #[arg(long)]
    pub address: Option<String>,

    /// Chain name
    #[arg(long, default_value = "ethereum")]
    pub chain: String,

    /// Output format
    #[arg(long, default_value = "json")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Analyze a local Solidity file instead of fetching from the network
    #[arg(long)]
    pub source_file: Option<PathBuf>,

    /// JSON file with the finding ids a --source-file fixture must produce
    #[arg(long, requires = "source_file")]
    pub expected: Option<PathBuf>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
}
