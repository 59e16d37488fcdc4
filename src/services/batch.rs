//! Sequential run over every account

use futures::FutureExt;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use tracing::{error, info};

use super::context::ClaimContext;
use super::delay::sleep_between;
use super::pipeline::AccountPipeline;
use crate::adapters::SessionFactory;
use crate::cli::output;
use crate::config::RunConfig;
use crate::domain::{AccountRecord, PipelineResult};

/// Per-account results of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Account label and result, in processing order
    pub results: Vec<(String, PipelineResult)>,
    counts: BTreeMap<PipelineResult, usize>,
}

impl BatchSummary {
    fn record(&mut self, label: String, result: PipelineResult) {
        *self.counts.entry(result).or_default() += 1;
        self.results.push((label, result));
    }

    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    pub fn count(&self, result: PipelineResult) -> usize {
        self.counts.get(&result).copied().unwrap_or(0)
    }

    pub fn print(&self) {
        output::print_separator();
        output::print_heading(&format!(
            "Finished processing all {} wallets",
            self.attempted()
        ));
        for result in PipelineResult::ALL {
            let count = self.count(result);
            if count > 0 {
                println!("  {:<24} {}", result.as_str(), count);
            }
        }
        output::print_separator();
    }
}

/// Input order, or a uniform permutation of it
pub fn order_accounts<R: Rng + ?Sized>(
    mut accounts: Vec<AccountRecord>,
    shuffle: bool,
    rng: &mut R,
) -> Vec<AccountRecord> {
    if shuffle {
        accounts.shuffle(rng);
    }
    accounts
}

pub struct BatchRunner<'a> {
    factory: &'a dyn SessionFactory,
    context: &'a ClaimContext,
    run: RunConfig,
}

impl<'a> BatchRunner<'a> {
    pub fn new(factory: &'a dyn SessionFactory, context: &'a ClaimContext, run: RunConfig) -> Self {
        Self {
            factory,
            context,
            run,
        }
    }

    /// Process every account one after the other. A failing account never stops the run.
    pub async fn run(&self, accounts: Vec<AccountRecord>) -> BatchSummary {
        let accounts = order_accounts(accounts, self.run.shuffle, &mut StdRng::from_entropy());
        let total = accounts.len();
        let pipeline = AccountPipeline::new(self.factory, self.context, self.run);
        let mut summary = BatchSummary::default();

        println!();
        output::print_separator();
        output::print_heading(&format!("Found {total} wallets to process"));
        output::print_separator();
        info!("Starting batch of {} accounts (shuffle: {})", total, self.run.shuffle);

        for (index, account) in accounts.iter().enumerate() {
            let result = match AssertUnwindSafe(pipeline.process(account)).catch_unwind().await {
                Ok(result) => result,
                Err(panic) => {
                    let reason = panic_message(panic.as_ref());
                    error!("{} aborted: {}", account.label(), reason);
                    output::print_error(&format!(
                        "Error processing wallet {}: {reason}",
                        account.label()
                    ));
                    PipelineResult::Errored
                }
            };
            summary.record(account.label(), result);
            output::print_progress(index + 1, total);

            if index + 1 < total {
                sleep_between(self.run.account_delay(), "accounts").await;
            }
        }

        info!("Batch finished: {} accounts attempted", summary.attempted());
        summary
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected panic".to_string()
    }
}
