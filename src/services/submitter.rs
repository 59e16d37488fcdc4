//! Sign, broadcast and confirm one transaction

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::{ChainClient, ReceiptStatus};
use crate::cli::output;
use crate::config::AppConfig;
use crate::domain::TransactionOutcome;
use crate::error::Result;
use crate::signing::Wallet;

pub struct TransactionSubmitter<'a> {
    chain: &'a dyn ChainClient,
    gas_price: u128,
    receipt_timeout: Duration,
    poll_interval: Duration,
    explorer_url: &'a str,
}

impl<'a> TransactionSubmitter<'a> {
    pub fn new(chain: &'a dyn ChainClient, config: &'a AppConfig) -> Self {
        Self {
            chain,
            gas_price: u128::from(config.transaction.gas_price_wei),
            receipt_timeout: config.receipt_timeout(),
            poll_interval: config.poll_interval(),
            explorer_url: &config.network.explorer_url,
        }
    }

    pub fn gas_price(&self) -> U256 {
        U256::from(self.gas_price)
    }

    /// Legacy envelope for `from`: chain id, pending nonce and the fixed gas price
    pub async fn prepare(&self, from: Address) -> Result<TransactionRequest> {
        let chain_id = self.chain.chain_id().await?;
        let nonce = self.chain.nonce(from).await?;
        debug!("Preparing transaction for {} (chain {}, nonce {})", from, chain_id, nonce);

        Ok(TransactionRequest::default()
            .with_from(from)
            .with_chain_id(chain_id)
            .with_nonce(nonce)
            .with_gas_price(self.gas_price))
    }

    /// Sign `tx` locally, broadcast it once and wait for its receipt.
    ///
    /// Never resubmits. A timeout leaves the transaction in the mempool.
    #[instrument(skip(self, tx, wallet), fields(from = %wallet.address()))]
    pub async fn submit(
        &self,
        tx: TransactionRequest,
        wallet: &Wallet,
        operation: &str,
    ) -> TransactionOutcome {
        let address = wallet.address();

        let signed = match wallet.sign_transaction(tx).await {
            Ok(signed) => signed,
            Err(e) => {
                error!("{}: signing {} transaction failed: {}", address, operation, e);
                output::print_error(&format!(
                    "{address}: error during {} transaction: {e}",
                    operation.to_lowercase()
                ));
                return TransactionOutcome::SubmissionFailed {
                    hash: None,
                    reason: e.to_string(),
                };
            }
        };

        let hash = match self.chain.send_raw_transaction(&signed.raw).await {
            Ok(hash) => hash,
            Err(e) => {
                error!("{}: broadcasting {} transaction failed: {}", address, operation, e);
                output::print_error(&format!(
                    "{address}: error during {} transaction: {e}",
                    operation.to_lowercase()
                ));
                return TransactionOutcome::SubmissionFailed {
                    hash: Some(signed.hash),
                    reason: e.to_string(),
                };
            }
        };

        if hash != signed.hash {
            warn!("Node returned hash {} for locally signed {}", hash, signed.hash);
        }

        info!("{} transaction {} broadcast", operation, hash);
        println!(
            "{operation} transaction sent, it will take up to {} seconds to confirm it",
            self.receipt_timeout.as_secs()
        );

        self.wait_for_receipt(hash, operation).await
    }

    async fn wait_for_receipt(&self, hash: TxHash, operation: &str) -> TransactionOutcome {
        let deadline = Instant::now() + self.receipt_timeout;
        let link = output::explorer_tx_url(self.explorer_url, hash);

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let lookup = tokio::time::timeout(remaining, self.chain.transaction_receipt(hash));
            let receipt = match lookup.await {
                Ok(receipt) => receipt,
                Err(_) => {
                    debug!("Receipt lookup for {} still pending at the deadline", hash);
                    break;
                }
            };

            match receipt {
                Ok(Some(ReceiptStatus::Success)) => {
                    info!("{} transaction {} confirmed", operation, hash);
                    output::print_success(&format!(
                        "Successful {} transaction: {link}",
                        operation.to_lowercase()
                    ));
                    return TransactionOutcome::Confirmed { hash };
                }
                Ok(Some(ReceiptStatus::Failure)) => {
                    warn!("{} transaction {} reverted", operation, hash);
                    output::print_error(&format!("{operation} transaction failed: {link}"));
                    return TransactionOutcome::Reverted { hash };
                }
                Ok(None) => debug!("No receipt yet for {}", hash),
                Err(e) => warn!("Receipt lookup for {} failed: {}", hash, e),
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }

        warn!("{} transaction {} not confirmed in time", operation, hash);
        output::print_error(&format!(
            "{operation} transaction was not confirmed within {} seconds: {link}",
            self.receipt_timeout.as_secs()
        ));
        TransactionOutcome::TimedOut { hash }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::chain::MockChainClient;
    use crate::error::ClaimerError;
    use alloy::primitives::keccak256;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn transfer() -> TransactionRequest {
        TransactionRequest::default()
            .with_to(Address::repeat_byte(0x22))
            .with_value(U256::from(5u64))
            .with_chain_id(56)
            .with_nonce(3)
            .with_gas_limit(21_000)
            .with_gas_price(1_000_000_000)
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_receipt() {
        let config = AppConfig::defaults().unwrap();
        let wallet = Wallet::from_private_key(TEST_KEY).unwrap();
        let mut chain = MockChainClient::new();
        chain
            .expect_send_raw_transaction()
            .times(1)
            .returning(|raw| Ok(keccak256(raw)));
        chain
            .expect_transaction_receipt()
            .times(1)
            .returning(|_| Ok(Some(ReceiptStatus::Success)));

        let outcome = TransactionSubmitter::new(&chain, &config)
            .submit(transfer(), &wallet, "Transfer BNB")
            .await;
        assert!(outcome.is_confirmed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_receipt_polled_until_included() {
        let config = AppConfig::defaults().unwrap();
        let wallet = Wallet::from_private_key(TEST_KEY).unwrap();
        let mut chain = MockChainClient::new();
        chain
            .expect_send_raw_transaction()
            .returning(|raw| Ok(keccak256(raw)));
        let mut seq = mockall::Sequence::new();
        chain
            .expect_transaction_receipt()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        chain
            .expect_transaction_receipt()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(ReceiptStatus::Failure)));

        let start = Instant::now();
        let outcome = TransactionSubmitter::new(&chain, &config)
            .submit(transfer(), &wallet, "Claim")
            .await;

        assert!(matches!(outcome, TransactionOutcome::Reverted { .. }));
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_receipt_times_out_without_resubmitting() {
        let config = AppConfig::defaults().unwrap();
        let wallet = Wallet::from_private_key(TEST_KEY).unwrap();
        let mut chain = MockChainClient::new();
        chain
            .expect_send_raw_transaction()
            .times(1)
            .returning(|raw| Ok(keccak256(raw)));
        chain
            .expect_transaction_receipt()
            .times(13)
            .returning(|_| Err(ClaimerError::Rpc("gateway timeout".into())));

        let start = Instant::now();
        let outcome = TransactionSubmitter::new(&chain, &config)
            .submit(transfer(), &wallet, "Claim")
            .await;

        assert!(matches!(outcome, TransactionOutcome::TimedOut { .. }));
        assert_eq!(start.elapsed(), Duration::from_secs(120));
    }

    /// Every receipt lookup stalls for 25 s before answering "not yet"
    struct StalledReceipts;

    #[async_trait::async_trait]
    impl ChainClient for StalledReceipts {
        async fn chain_id(&self) -> Result<u64> {
            Ok(56)
        }

        async fn nonce(&self, _address: Address) -> Result<u64> {
            Ok(0)
        }

        async fn balance(&self, _address: Address) -> Result<U256> {
            Ok(U256::ZERO)
        }

        async fn estimate_gas(
            &self,
            _tx: &TransactionRequest,
        ) -> std::result::Result<u64, crate::adapters::RpcFailure> {
            Ok(21_000)
        }

        async fn call(&self, _tx: &TransactionRequest) -> Result<alloy::primitives::Bytes> {
            Ok(Default::default())
        }

        async fn send_raw_transaction(&self, raw: &alloy::primitives::Bytes) -> Result<TxHash> {
            Ok(keccak256(raw))
        }

        async fn transaction_receipt(&self, _hash: TxHash) -> Result<Option<ReceiptStatus>> {
            tokio::time::sleep(Duration::from_secs(25)).await;
            Ok(None)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_receipt_lookups_do_not_outlast_the_timeout() {
        let config = AppConfig::defaults().unwrap();
        let wallet = Wallet::from_private_key(TEST_KEY).unwrap();
        let chain = StalledReceipts;

        let start = Instant::now();
        let outcome = TransactionSubmitter::new(&chain, &config)
            .submit(transfer(), &wallet, "Claim")
            .await;

        assert!(matches!(outcome, TransactionOutcome::TimedOut { .. }));
        assert_eq!(start.elapsed(), Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_broadcast_error_is_submission_failure() {
        let config = AppConfig::defaults().unwrap();
        let wallet = Wallet::from_private_key(TEST_KEY).unwrap();
        let mut chain = MockChainClient::new();
        chain
            .expect_send_raw_transaction()
            .times(1)
            .returning(|_| Err(ClaimerError::Rpc("nonce too low".into())));
        chain.expect_transaction_receipt().never();

        let outcome = TransactionSubmitter::new(&chain, &config)
            .submit(transfer(), &wallet, "Claim")
            .await;

        match outcome {
            TransactionOutcome::SubmissionFailed { hash, reason } => {
                assert!(hash.is_some());
                assert!(reason.contains("nonce too low"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_prepare_reads_chain_id_and_nonce() {
        let config = AppConfig::defaults().unwrap();
        let from = Address::repeat_byte(0x01);
        let mut chain = MockChainClient::new();
        chain.expect_chain_id().returning(|| Ok(56));
        chain
            .expect_nonce()
            .withf(move |a| *a == from)
            .returning(|_| Ok(9));

        let tx = TransactionSubmitter::new(&chain, &config)
            .prepare(from)
            .await
            .unwrap();
        assert_eq!(tx.chain_id, Some(56));
        assert_eq!(tx.nonce, Some(9));
        assert_eq!(tx.gas_price, Some(1_000_000_000));
        assert_eq!(tx.from, Some(from));
    }
}
