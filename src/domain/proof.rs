use alloy::primitives::{Bytes, B256, U256};

/// Authorization for one on-chain claim, as issued by the eligibility service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityProof {
    /// Merkle proof, leaf to root
    pub proof: Vec<B256>,
    /// Allocation in whole tokens, as returned by the service
    pub allocation: U256,
    /// Allocation scaled to base units
    pub allocation_units: U256,
    /// Service co-signature over the claim
    pub signature: Bytes,
}

impl EligibilityProof {
    pub fn new(proof: Vec<B256>, allocation: U256, signature: Bytes, decimals: u8) -> Option<Self> {
        let scale = U256::from(10u64).checked_pow(U256::from(decimals))?;
        let allocation_units = allocation.checked_mul(scale)?;
        Some(Self {
            proof,
            allocation,
            allocation_units,
            signature,
        })
    }
}
