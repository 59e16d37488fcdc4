//! Chain RPC access
//!
//! Everything the claim and sweep stages need from the node goes through
//! [`ChainClient`], so the stages can be exercised against a fake chain.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportError;
use async_trait::async_trait;
use std::fmt;
use tracing::debug;
use url::Url;

use crate::error::{ClaimerError, Result};

/// Receipt status of an included transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Failure,
}

/// A failed RPC call, keeping what is needed to classify reverts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcFailure {
    pub message: String,
    /// Revert payload returned by the node, if any
    pub revert_data: Option<Bytes>,
}

impl RpcFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            revert_data: None,
        }
    }

    pub fn with_revert_data(mut self, data: Bytes) -> Self {
        self.revert_data = Some(data);
        self
    }
}

impl fmt::Display for RpcFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revert_data {
            Some(data) => write!(f, "{} (revert data: {})", self.message, data),
            None => f.write_str(&self.message),
        }
    }
}

impl From<TransportError> for RpcFailure {
    fn from(err: TransportError) -> Self {
        let revert_data = err
            .as_error_resp()
            .and_then(|payload| payload.as_revert_data());
        Self {
            message: err.to_string(),
            revert_data,
        }
    }
}

fn rpc_error(context: &str, err: TransportError) -> ClaimerError {
    ClaimerError::Rpc(format!("{context}: {err}"))
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    /// Transaction count of `address` at the latest block
    async fn nonce(&self, address: Address) -> Result<u64>;

    /// Native coin balance in wei
    async fn balance(&self, address: Address) -> Result<U256>;

    /// Gas limit estimate; the failure keeps the node's revert data
    async fn estimate_gas(&self, tx: &TransactionRequest) -> std::result::Result<u64, RpcFailure>;

    /// Read-only contract call
    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes>;

    async fn send_raw_transaction(&self, raw: &Bytes) -> Result<TxHash>;

    /// `None` while the transaction is not yet included
    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptStatus>>;
}

/// [`ChainClient`] over an alloy HTTP provider
pub struct RpcChainClient {
    provider: DynProvider,
}

impl RpcChainClient {
    /// Connect to `rpc_url` through the given HTTP client (which may carry a proxy)
    pub fn new(rpc_url: &str, http: reqwest::Client) -> Result<Self> {
        let url: Url = rpc_url
            .parse()
            .map_err(|e| ClaimerError::Configuration(format!("Invalid RPC URL {rpc_url}: {e}")))?;

        let client = RpcClient::builder().http_with_client(http, url);
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_client(client)
            .erased();

        Ok(Self { provider })
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| rpc_error("eth_chainId", e))
    }

    async fn nonce(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .await
            .map_err(|e| rpc_error("eth_getTransactionCount", e))
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| rpc_error("eth_getBalance", e))
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> std::result::Result<u64, RpcFailure> {
        let gas = self
            .provider
            .estimate_gas(tx.clone())
            .await
            .map_err(RpcFailure::from)?;
        debug!("Estimated gas: {}", gas);
        Ok(gas)
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes> {
        self.provider
            .call(tx.clone())
            .await
            .map_err(|e| rpc_error("eth_call", e))
    }

    async fn send_raw_transaction(&self, raw: &Bytes) -> Result<TxHash> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(|e| rpc_error("eth_sendRawTransaction", e))?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptStatus>> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| rpc_error("eth_getTransactionReceipt", e))?;

        Ok(receipt.map(|r| {
            if r.status() {
                ReceiptStatus::Success
            } else {
                ReceiptStatus::Failure
            }
        }))
    }
}
