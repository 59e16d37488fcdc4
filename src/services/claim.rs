//! On-chain airdrop claim

use alloy::dyn_abi::DynSolValue;
use alloy::network::TransactionBuilder;
use alloy::primitives::Address;
use tracing::{error, info, instrument, warn};

use super::context::ClaimContext;
use super::eligibility::EligibilityClient;
use super::submitter::TransactionSubmitter;
use crate::adapters::{AccountSession, RpcFailure};
use crate::cli::output;
use crate::domain::{ClaimFailure, ClaimOutcome, EligibilityProof, RevertKind, TransactionOutcome};
use crate::error::ClaimerError;
use crate::signing::Wallet;

/// Revert selector of the claim contract when the account has already claimed
pub const ALREADY_CLAIMED_SELECTOR: [u8; 4] = [0x64, 0x6c, 0xf5, 0x58];

const INSUFFICIENT_FUNDS: &str = "insufficient funds for transfer";

const TERMS_HASH: &str = "0x676b7efc9a6eb2e90331c7c06a27499ffbcfcce4a16f3414080ad8ffc5da6b20";

/// Attestation signed to prove ownership of `address`. The leading space is expected by the service.
pub fn ownership_message(address: Address) -> String {
    format!(
        " I hereby authorize this message as confirmation of ownership for the wallet address: {address}. \
         By signing, I acknowledge that I have read and accepted the Airdrop Terms of Service and Privacy Policy. \
         The SHA-256 hash of the referenced terms and policy is: {TERMS_HASH}"
    )
}

/// Classify a failed gas estimation
pub fn classify_revert(failure: &RpcFailure) -> RevertKind {
    let selector_hex = format!("0x{}", hex::encode(ALREADY_CLAIMED_SELECTOR));
    let message = failure.message.to_lowercase();

    let selector_in_data = failure
        .revert_data
        .as_ref()
        .is_some_and(|data| data.starts_with(&ALREADY_CLAIMED_SELECTOR));

    if selector_in_data || message.contains(&selector_hex) {
        RevertKind::AlreadyClaimed
    } else if message.contains(INSUFFICIENT_FUNDS) {
        RevertKind::InsufficientFunds
    } else {
        RevertKind::Other(failure.to_string())
    }
}

fn claim_arguments(proof: &EligibilityProof, account: Address) -> Vec<DynSolValue> {
    vec![
        DynSolValue::Array(
            proof
                .proof
                .iter()
                .map(|node| DynSolValue::FixedBytes(*node, 32))
                .collect(),
        ),
        DynSolValue::Bytes(proof.signature.to_vec()),
        DynSolValue::Uint(proof.allocation_units, 256),
        DynSolValue::Address(account),
    ]
}

pub struct ClaimExecutor<'a> {
    session: &'a AccountSession,
    context: &'a ClaimContext,
    submitter: TransactionSubmitter<'a>,
}

impl<'a> ClaimExecutor<'a> {
    pub fn new(session: &'a AccountSession, context: &'a ClaimContext) -> Self {
        Self {
            session,
            context,
            submitter: TransactionSubmitter::new(session.chain.as_ref(), &context.config),
        }
    }

    /// Sign the ownership message, fetch the proof and submit the claim.
    ///
    /// Nothing is broadcast when the estimate shows the drop was already claimed.
    #[instrument(skip(self, wallet), fields(account = %wallet.address()))]
    pub async fn claim(&self, wallet: &Wallet) -> ClaimOutcome {
        let address = wallet.address();

        let signature = match wallet.sign_message(&ownership_message(address)).await {
            Ok(signature) => signature,
            Err(e) => return self.fail(address, ClaimFailure::Other(e.to_string())),
        };

        let proof = match EligibilityClient::new(self.session.eligibility.as_ref(), &self.context.config)
            .obtain_proof(address, &signature)
            .await
        {
            Ok(proof) => proof,
            Err(ClaimerError::NotEligible(_)) => {
                output::print_error(&format!("{address} is not eligible to claim the drop"));
                return ClaimOutcome::Failure(ClaimFailure::NotEligible);
            }
            Err(e) => return self.fail(address, ClaimFailure::Eligibility(e.to_string())),
        };

        let calldata = match self
            .context
            .claim_interface
            .encode_call("claim", &claim_arguments(&proof, address))
        {
            Ok(calldata) => calldata,
            Err(e) => return self.fail(address, ClaimFailure::Other(e.to_string())),
        };

        let tx = match self.submitter.prepare(address).await {
            Ok(tx) => tx
                .with_to(self.context.claim_address)
                .with_value(self.context.config.claim_fee())
                .with_input(calldata),
            Err(e) => return self.fail(address, ClaimFailure::Other(e.to_string())),
        };

        let gas = match self.session.chain.estimate_gas(&tx).await {
            Ok(gas) => gas,
            Err(failure) => {
                return match classify_revert(&failure) {
                    RevertKind::AlreadyClaimed => {
                        info!("{} already claimed", address);
                        output::print_warning(&format!("{address}: already claimed the airdrop"));
                        ClaimOutcome::AlreadyClaimed
                    }
                    RevertKind::InsufficientFunds => {
                        output::print_error(&format!("{address}: insufficient funds for claim"));
                        ClaimOutcome::Failure(ClaimFailure::InsufficientFunds)
                    }
                    RevertKind::Other(raw) => {
                        error!("{}: claim estimation failed: {}", address, raw);
                        output::print_error(&format!(
                            "{address}: error creating claim transaction. Error: {raw}"
                        ));
                        ClaimOutcome::Failure(ClaimFailure::Other(raw))
                    }
                };
            }
        };

        info!(
            "{}: claiming {} STO with gas limit {}",
            address, proof.allocation, gas
        );

        match self
            .submitter
            .submit(tx.with_gas_limit(gas), wallet, "Claim")
            .await
        {
            TransactionOutcome::Confirmed { hash } => ClaimOutcome::Success { hash },
            outcome => ClaimOutcome::Failure(ClaimFailure::Transaction(outcome)),
        }
    }

    fn fail(&self, address: Address, failure: ClaimFailure) -> ClaimOutcome {
        warn!("{}: claim failed: {}", address, failure);
        output::print_error(&format!("{address}: {failure}"));
        ClaimOutcome::Failure(failure)
    }
}
