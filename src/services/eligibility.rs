//! Eligibility proofs from the claim-data service

use alloy::primitives::{Address, Bytes, B256, U256};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

use super::retry::{retry_when, RetryPolicy};
use crate::adapters::{ClaimDataRequest, EligibilityApi};
use crate::config::AppConfig;
use crate::domain::EligibilityProof;
use crate::error::{ClaimerError, Result};

pub const ADDRESS_NOT_FOUND: &str = "Address not found";
pub const INVALID_SIGNATURE: &str = "Invalid signature";

/// Failure of a single request
enum AttemptError {
    /// The service did not accept the ownership signature. Usually transient.
    InvalidSignature,
    Fatal(ClaimerError),
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::InvalidSignature => f.write_str(INVALID_SIGNATURE),
            AttemptError::Fatal(e) => write!(f, "{e}"),
        }
    }
}

impl From<ClaimerError> for AttemptError {
    fn from(err: ClaimerError) -> Self {
        AttemptError::Fatal(err)
    }
}

pub struct EligibilityClient<'a> {
    api: &'a dyn EligibilityApi,
    batch_id: &'a str,
    policy: RetryPolicy,
    decimals: u8,
}

impl<'a> EligibilityClient<'a> {
    pub fn new(api: &'a dyn EligibilityApi, config: &'a AppConfig) -> Self {
        Self {
            api,
            batch_id: &config.api.batch_id,
            policy: RetryPolicy::from_config(&config.eligibility),
            decimals: config.transaction.allocation_decimals,
        }
    }

    /// Exchange the signed ownership message for the account's claim data.
    ///
    /// `Address not found` maps to [`ClaimerError::NotEligible`]. Only
    /// `Invalid signature` is retried.
    pub async fn obtain_proof(&self, address: Address, signature: &str) -> Result<EligibilityProof> {
        let request = ClaimDataRequest {
            wallet_address: address.to_string(),
            batch_id: self.batch_id.to_string(),
            signature: signature.to_string(),
        };

        let result = retry_when(
            self.policy,
            |e| matches!(e, AttemptError::InvalidSignature),
            |attempt| {
                let request = &request;
                async move {
                    debug!("Requesting claim data for {} (attempt {})", address, attempt);
                    let body = self.api.post_claim_data(request).await?;
                    parse_claim_data(&body, address, self.decimals)
                }
            },
        )
        .await;

        match result {
            Ok(proof) => {
                info!(
                    "{} is eligible for {} STO ({} proof nodes)",
                    address,
                    proof.allocation,
                    proof.proof.len()
                );
                Ok(proof)
            }
            Err(AttemptError::InvalidSignature) => Err(ClaimerError::EligibilityService(format!(
                "Failed after {} attempts due to invalid signature",
                self.policy.max_attempts
            ))),
            Err(AttemptError::Fatal(e)) => Err(e),
        }
    }
}

fn malformed(what: &str) -> AttemptError {
    AttemptError::Fatal(ClaimerError::EligibilityService(format!(
        "Unexpected API response format: {what}"
    )))
}

fn parse_claim_data(
    body: &Value,
    address: Address,
    decimals: u8,
) -> std::result::Result<EligibilityProof, AttemptError> {
    if let Some(error) = body.get("error") {
        let code = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());
        return Err(match code.as_str() {
            ADDRESS_NOT_FOUND => AttemptError::Fatal(ClaimerError::NotEligible(address.to_string())),
            INVALID_SIGNATURE => AttemptError::InvalidSignature,
            other => AttemptError::Fatal(ClaimerError::EligibilityService(format!(
                "Unexpected API error: {other}"
            ))),
        });
    }

    let data = body.get("claimData").ok_or_else(|| malformed("missing claimData"))?;

    let proof = data
        .get("proof")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing proof"))?
        .iter()
        .map(|node| {
            node.as_str()
                .and_then(|s| s.parse::<B256>().ok())
                .ok_or_else(|| malformed("proof node is not bytes32"))
        })
        .collect::<std::result::Result<Vec<B256>, _>>()?;

    let allocation = match data.get("allocation") {
        // floats are truncated toward zero
        Some(Value::Number(n)) => n.as_u64().map(U256::from).or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && *f < u64::MAX as f64)
                .map(|f| U256::from(f.trunc() as u64))
        }),
        Some(Value::String(s)) => U256::from_str_radix(s.trim(), 10).ok(),
        _ => None,
    }
    .ok_or_else(|| malformed("allocation is not an integer"))?;

    let signature = data
        .get("signature")
        .and_then(Value::as_str)
        .and_then(|s| hex::decode(s.trim_start_matches("0x")).ok())
        .map(Bytes::from)
        .ok_or_else(|| malformed("signature is not hex"))?;

    EligibilityProof::new(proof, allocation, signature, decimals)
        .ok_or_else(|| malformed("allocation overflows uint256"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::eligibility_api::MockEligibilityApi;
    use serde_json::json;
    use std::time::Duration;

    fn address() -> Address {
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap()
    }

    fn claim_data() -> Value {
        json!({
            "claimData": {
                "proof": [format!("0x{}", "11".repeat(32)), format!("0x{}", "22".repeat(32))],
                "allocation": "150",
                "signature": "0xdeadbeef"
            }
        })
    }

    #[tokio::test]
    async fn test_claim_data_is_parsed_and_scaled() {
        let config = AppConfig::defaults().unwrap();
        let mut api = MockEligibilityApi::new();
        api.expect_post_claim_data()
            .withf(|req| {
                req.wallet_address == "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
                    && req.batch_id == "0"
                    && req.signature == "0xsig"
            })
            .times(1)
            .returning(|_| Ok(claim_data()));

        let proof = EligibilityClient::new(&api, &config)
            .obtain_proof(address(), "0xsig")
            .await
            .unwrap();

        assert_eq!(proof.proof, vec![B256::repeat_byte(0x11), B256::repeat_byte(0x22)]);
        assert_eq!(proof.allocation, U256::from(150u64));
        assert_eq!(
            proof.allocation_units,
            U256::from(150u64) * U256::from(10u64).pow(U256::from(18u64))
        );
        assert_eq!(proof.signature, Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]));
    }

    #[test]
    fn test_float_allocation_is_truncated() {
        let body = json!({"claimData": {"proof": [], "allocation": 150.0, "signature": "0x00"}});
        let proof = parse_claim_data(&body, address(), 0).ok().unwrap();
        assert_eq!(proof.allocation_units, U256::from(150u64));

        let body = json!({"claimData": {"proof": [], "allocation": 7.9, "signature": "0x00"}});
        let proof = parse_claim_data(&body, address(), 0).ok().unwrap();
        assert_eq!(proof.allocation_units, U256::from(7u64));

        let body = json!({"claimData": {"proof": [], "allocation": -1.0, "signature": "0x00"}});
        assert!(parse_claim_data(&body, address(), 0).is_err());
    }

    #[test]
    fn test_numeric_allocation_is_accepted() {
        let body = json!({"claimData": {"proof": [], "allocation": 7, "signature": "0x00"}});
        let proof = parse_claim_data(&body, address(), 0).ok().unwrap();
        assert_eq!(proof.allocation_units, U256::from(7u64));
    }

    #[tokio::test(start_paused = true)]
    async fn test_address_not_found_is_not_eligible_after_one_call() {
        let config = AppConfig::defaults().unwrap();
        let mut api = MockEligibilityApi::new();
        api.expect_post_claim_data()
            .times(1)
            .returning(|_| Ok(json!({"error": "Address not found"})));

        let err = EligibilityClient::new(&api, &config)
            .obtain_proof(address(), "0xsig")
            .await
            .unwrap_err();

        assert!(matches!(err, ClaimerError::NotEligible(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_signature_is_retried_five_times_two_seconds_apart() {
        let config = AppConfig::defaults().unwrap();
        let mut api = MockEligibilityApi::new();
        api.expect_post_claim_data()
            .times(5)
            .returning(|_| Ok(json!({"error": "Invalid signature"})));

        let start = tokio::time::Instant::now();
        let err = EligibilityClient::new(&api, &config)
            .obtain_proof(address(), "0xsig")
            .await
            .unwrap_err();

        assert!(matches!(err, ClaimerError::EligibilityService(_)));
        assert!(err.to_string().contains("5 attempts"), "{err}");
        assert_eq!(start.elapsed(), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_signature_then_success() {
        let config = AppConfig::defaults().unwrap();
        let mut api = MockEligibilityApi::new();
        let mut seq = mockall::Sequence::new();
        api.expect_post_claim_data()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json!({"error": "Invalid signature"})));
        api.expect_post_claim_data()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(claim_data()));

        let proof = EligibilityClient::new(&api, &config)
            .obtain_proof(address(), "0xsig")
            .await
            .unwrap();
        assert_eq!(proof.allocation, U256::from(150u64));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_error_and_malformed_bodies_are_not_retried() {
        let config = AppConfig::defaults().unwrap();
        for body in [
            json!({"error": "Batch closed"}),
            json!({"claimData": {"proof": "nope", "allocation": "1", "signature": "0x"}}),
            json!({"unexpected": true}),
        ] {
            let mut api = MockEligibilityApi::new();
            api.expect_post_claim_data()
                .times(1)
                .returning(move |_| Ok(body.clone()));

            let err = EligibilityClient::new(&api, &config)
                .obtain_proof(address(), "0xsig")
                .await
                .unwrap_err();
            assert!(matches!(err, ClaimerError::EligibilityService(_)), "{err}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_not_retried() {
        let config = AppConfig::defaults().unwrap();
        let mut api = MockEligibilityApi::new();
        api.expect_post_claim_data()
            .times(1)
            .returning(|_| Err(ClaimerError::EligibilityService("Non-JSON response".into())));

        let result = EligibilityClient::new(&api, &config)
            .obtain_proof(address(), "0xsig")
            .await;
        assert!(result.is_err());
    }
}
