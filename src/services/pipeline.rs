//! Claim and sweep for a single account

use tracing::{error, info, instrument, warn};

use super::claim::ClaimExecutor;
use super::context::ClaimContext;
use super::delay::sleep_between;
use super::sweep::SweepExecutor;
use crate::adapters::SessionFactory;
use crate::cli::output;
use crate::config::RunConfig;
use crate::domain::{AccountRecord, PipelineResult};
use crate::signing::Wallet;

pub struct AccountPipeline<'a> {
    factory: &'a dyn SessionFactory,
    context: &'a ClaimContext,
    run: RunConfig,
}

impl<'a> AccountPipeline<'a> {
    pub fn new(factory: &'a dyn SessionFactory, context: &'a ClaimContext, run: RunConfig) -> Self {
        Self {
            factory,
            context,
            run,
        }
    }

    /// Run every stage for `account`. Failures end with a result, never an error.
    #[instrument(skip(self, account), fields(account = %account.label()))]
    pub async fn process(&self, account: &AccountRecord) -> PipelineResult {
        println!();

        if !account.has_valid_key_format() {
            warn!("Invalid private key format: {}", account.hidden_key());
            output::print_error(&format!(
                "Invalid private key format: {}",
                account.hidden_key()
            ));
            return PipelineResult::SkippedInvalidInput;
        }

        let wallet = match account.wallet() {
            Ok(wallet) => wallet,
            Err(e) => {
                warn!("{}: {}", account.hidden_key(), e);
                output::print_error(&format!("{}: {e}", account.hidden_key()));
                return PipelineResult::SkippedInvalidInput;
            }
        };

        output::print_heading(&format!("Start work with {}", wallet.address()));
        let result = self.run_stages(account, &wallet).await;
        output::print_heading(&format!("Finish work with {}", wallet.address()));

        info!("{} finished: {}", wallet.address(), result);
        result
    }

    async fn run_stages(&self, account: &AccountRecord, wallet: &Wallet) -> PipelineResult {
        let address = wallet.address();

        let recipient = match account.recipient() {
            Ok(recipient) => recipient,
            Err(e) => {
                warn!("{}: invalid recipient {}", address, account.raw_recipient());
                output::print_error(&format!(
                    "Invalid recipient address {}. Error: {e}",
                    account.raw_recipient()
                ));
                return PipelineResult::SkippedInvalidInput;
            }
        };

        let proxy = match account.proxy() {
            Some(proxy) => {
                let probed = self.factory.probe_proxy(proxy).await;
                if probed.is_none() {
                    output::print_warning(&format!(
                        "Proxy {proxy} is not usable, continue without it"
                    ));
                }
                probed
            }
            None => None,
        };

        let session = match self.factory.open(proxy) {
            Ok(session) => session,
            Err(e) => {
                error!(stage = "session", "{}: cannot open clients: {}", address, e);
                output::print_error(&format!("Error processing wallet {address}: {e}"));
                return PipelineResult::Errored;
            }
        };

        let claim = ClaimExecutor::new(&session, self.context).claim(wallet).await;
        if !claim.allows_sweep() {
            return PipelineResult::from_outcomes(&claim, &[]);
        }

        let sweeper = SweepExecutor::new(&session, self.context);

        sleep_between(self.run.action_delay(), "actions").await;
        let token = sweeper.sweep_token(wallet, recipient).await;

        sleep_between(self.run.action_delay(), "actions").await;
        let native = sweeper.sweep_native(wallet, recipient).await;

        PipelineResult::from_outcomes(&claim, &[token, native])
    }
}
