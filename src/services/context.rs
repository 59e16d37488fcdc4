use alloy::primitives::Address;
use tracing::info;

use crate::adapters::ContractInterface;
use crate::config::AppConfig;
use crate::error::{ClaimerError, Result};

/// Everything loaded once at startup and shared read-only by every account
#[derive(Debug, Clone)]
pub struct ClaimContext {
    pub config: AppConfig,
    pub token_interface: ContractInterface,
    pub claim_interface: ContractInterface,
    pub token_address: Address,
    pub claim_address: Address,
}

impl ClaimContext {
    /// Load both contract interfaces from the configured paths
    pub fn load(config: AppConfig) -> Result<Self> {
        let token = ContractInterface::load("STO token", &config.paths.token_abi)?;
        let claim = ContractInterface::load("STO claim", &config.paths.claim_abi)?;
        Self::new(config, token, claim)
    }

    pub fn new(
        config: AppConfig,
        token_interface: ContractInterface,
        claim_interface: ContractInterface,
    ) -> Result<Self> {
        token_interface.require(&[("balanceOf", 1), ("transfer", 2)])?;
        claim_interface.require(&[("claim", 4)])?;

        let token_address = config.token_address().map_err(ClaimerError::Configuration)?;
        let claim_address = config.claim_address().map_err(ClaimerError::Configuration)?;
        info!(
            "Using token {} and claim contract {}",
            token_address, claim_address
        );

        Ok(Self {
            config,
            token_interface,
            claim_interface,
            token_address,
            claim_address,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub const TOKEN_ABI: &str = include_str!("../../global_data/STO_TOKEN_ABI.json");
    pub const CLAIM_ABI: &str = include_str!("../../global_data/STO_CLAIM_ABI.json");

    pub fn context() -> ClaimContext {
        ClaimContext::new(
            AppConfig::defaults().unwrap(),
            ContractInterface::from_json("STO token", TOKEN_ABI).unwrap(),
            ContractInterface::from_json("STO claim", CLAIM_ABI).unwrap(),
        )
        .unwrap()
    }
}
