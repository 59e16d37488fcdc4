use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use tracing::{error, info};

use sto_claimer::adapters::{load_accounts, HttpSessionFactory};
use sto_claimer::cli::output;
use sto_claimer::cli::prompt::{resolve_run_config, Prompter};
use sto_claimer::cli::Cli;
use sto_claimer::logging::init_logging;
use sto_claimer::{AppConfig, BatchRunner, ClaimContext};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Fatal: {:#}", e);
        output::print_error(&format!("Error: {e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load_from(&cli.config)
        .with_context(|| format!("Cannot load configuration from {}", cli.config.display()))?;
    if let Some(dir) = &cli.data_dir {
        config.paths.user_data_dir = dir.clone();
    }

    if let Err(errors) = config.validate() {
        for problem in &errors {
            output::print_error(problem);
        }
        anyhow::bail!("Invalid configuration ({} problems)", errors.len());
    }

    let _log_guard = init_logging(&config.logging);
    info!("sto-claimer {} starting", env!("CARGO_PKG_VERSION"));

    // Everything that can fail fatally happens before the first network call.
    let accounts = load_accounts(&config.paths.user_data_dir)?;
    let context = ClaimContext::load(config.clone())?;

    let run = {
        let stdin = io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), io::stdout());
        resolve_run_config(&cli, &mut prompter).context("Cannot read run settings")?
    };
    info!("Run settings: {:?}", run);

    let factory = HttpSessionFactory::new(config);
    let summary = BatchRunner::new(&factory, &context, run).run(accounts).await;
    summary.print();

    Ok(())
}
