//! Token and native sweeps to the recipient

use alloy::dyn_abi::DynSolValue;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, U256};
use alloy::rpc::types::TransactionRequest;
use tracing::{info, instrument, warn};

use super::context::ClaimContext;
use super::submitter::TransactionSubmitter;
use crate::adapters::{decode_uint, AccountSession};
use crate::cli::output;
use crate::domain::{SweepFailure, SweepOutcome};
use crate::error::Result;
use crate::signing::Wallet;

/// Value left to send after reserving 1.5x the estimated gas cost.
///
/// The reserve is rounded up. `None` when nothing would be left.
pub fn native_sweep_value(balance: U256, gas: u64, gas_price: U256) -> Option<U256> {
    let cost = U256::from(gas).checked_mul(gas_price)?;
    let reserve = cost.checked_mul(U256::from(3u64))?.checked_add(U256::from(1u64))? / U256::from(2u64);
    balance.checked_sub(reserve).filter(|value| !value.is_zero())
}

pub struct SweepExecutor<'a> {
    session: &'a AccountSession,
    context: &'a ClaimContext,
    submitter: TransactionSubmitter<'a>,
}

impl<'a> SweepExecutor<'a> {
    pub fn new(session: &'a AccountSession, context: &'a ClaimContext) -> Self {
        Self {
            session,
            context,
            submitter: TransactionSubmitter::new(session.chain.as_ref(), &context.config),
        }
    }

    async fn token_balance(&self, owner: Address) -> Result<U256> {
        let data = self
            .context
            .token_interface
            .encode_call("balanceOf", &[DynSolValue::Address(owner)])?;
        let call = TransactionRequest::default()
            .with_from(owner)
            .with_to(self.context.token_address)
            .with_input(data);
        let raw = self.session.chain.call(&call).await?;
        decode_uint(&raw)
    }

    /// Transfer the whole token balance to `recipient`
    #[instrument(skip(self, wallet), fields(account = %wallet.address()))]
    pub async fn sweep_token(&self, wallet: &Wallet, recipient: Address) -> SweepOutcome {
        let address = wallet.address();

        let balance = match self.token_balance(address).await {
            Ok(balance) => balance,
            Err(e) => return rpc_failure(address, "STO transfer", e.to_string()),
        };

        if balance.is_zero() {
            output::print_error(&format!(
                "Insufficient token balance to transfer, {address}: 0 STO"
            ));
            return SweepOutcome::Failure(SweepFailure::ZeroBalance);
        }

        let data = match self.context.token_interface.encode_call(
            "transfer",
            &[DynSolValue::Address(recipient), DynSolValue::Uint(balance, 256)],
        ) {
            Ok(data) => data,
            Err(e) => return rpc_failure(address, "STO transfer", e.to_string()),
        };

        let tx = match self.submitter.prepare(address).await {
            Ok(tx) => tx.with_to(self.context.token_address).with_input(data),
            Err(e) => return rpc_failure(address, "STO transfer", e.to_string()),
        };

        let gas = match self.session.chain.estimate_gas(&tx).await {
            Ok(gas) => gas,
            Err(e) => return rpc_failure(address, "STO transfer", e.to_string()),
        };

        info!("{}: sweeping {} STO base units to {}", address, balance, recipient);
        SweepOutcome::Submitted(
            self.submitter
                .submit(tx.with_gas_limit(gas), wallet, "Transfer STO")
                .await,
        )
    }

    /// Transfer the native balance minus the gas reserve to `recipient`
    #[instrument(skip(self, wallet), fields(account = %wallet.address()))]
    pub async fn sweep_native(&self, wallet: &Wallet, recipient: Address) -> SweepOutcome {
        let address = wallet.address();

        let balance = match self.session.chain.balance(address).await {
            Ok(balance) => balance,
            Err(e) => return rpc_failure(address, "BNB transfer", e.to_string()),
        };

        if balance.is_zero() {
            output::print_error(&format!(
                "Insufficient BNB balance to transfer, {address}: 0 BNB"
            ));
            return SweepOutcome::Failure(SweepFailure::ZeroBalance);
        }

        let tx = match self.submitter.prepare(address).await {
            Ok(tx) => tx.with_to(recipient),
            Err(e) => return rpc_failure(address, "BNB transfer", e.to_string()),
        };

        // Sized once; the same limit is used for the reserve and the broadcast.
        let gas = match self.session.chain.estimate_gas(&tx).await {
            Ok(gas) => gas,
            Err(e) => return rpc_failure(address, "BNB transfer", e.to_string()),
        };

        let Some(value) = native_sweep_value(balance, gas, self.submitter.gas_price()) else {
            output::print_error(&format!("Insufficient BNB balance after gas, {address}"));
            return SweepOutcome::Failure(SweepFailure::InsufficientAfterGas);
        };

        info!("{}: sweeping {} wei to {}", address, value, recipient);
        SweepOutcome::Submitted(
            self.submitter
                .submit(
                    tx.with_value(value).with_gas_limit(gas),
                    wallet,
                    "Transfer BNB",
                )
                .await,
        )
    }
}

fn rpc_failure(address: Address, operation: &str, reason: String) -> SweepOutcome {
    warn!("{}: {} failed: {}", address, operation, reason);
    output::print_error(&format!("{address}: error during {operation}: {reason}"));
    SweepOutcome::Failure(SweepFailure::Rpc(reason))
}
