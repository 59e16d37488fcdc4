//! Command line of the claimer
//!
//! Every run setting can be given as a flag; whatever is missing is asked
//! for interactively.

pub mod output;
pub mod prompt;

use clap::Parser;
use std::path::PathBuf;

/// Claim the STO airdrop and sweep STO and BNB to the recipients
#[derive(Parser, Debug)]
#[command(name = "sto-claimer")]
#[command(author, version, about)]
pub struct Cli {
    /// Directory holding default.toml and the environment overlays
    #[arg(long, default_value = "config")]
    pub config: PathBuf,

    /// Directory with wallets.txt, proxies.txt and recipients.txt
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Minimum delay between wallets, in seconds
    #[arg(long)]
    pub min_account_delay: Option<u64>,

    /// Maximum delay between wallets, in seconds
    #[arg(long)]
    pub max_account_delay: Option<u64>,

    /// Minimum delay between actions of one wallet, in seconds
    #[arg(long)]
    pub min_action_delay: Option<u64>,

    /// Maximum delay between actions of one wallet, in seconds
    #[arg(long)]
    pub max_action_delay: Option<u64>,

    /// Shuffle the wallets before processing (y/n)
    #[arg(long, value_parser = parse_yes_no)]
    pub shuffle: Option<bool>,
}

fn parse_yes_no(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        other => Err(format!("expected y or n, got {other}")),
    }
}
