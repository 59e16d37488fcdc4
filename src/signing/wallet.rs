use crate::error::{ClaimerError, Result};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{keccak256, Address, Bytes, TxHash};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use tracing::debug;
use zeroize::Zeroizing;

/// A transaction signed locally and ready for broadcast
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub raw: Bytes,
    pub hash: TxHash,
}

/// Account signer for ownership messages and transactions
///
/// # Security
/// The private key is only held by the inner signer. The hex string used to
/// build it is zeroized as soon as parsing is done.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
    inner: EthereumWallet,
}

impl Wallet {
    /// Create a wallet from a private key hex string (with or without 0x)
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let secure_key = Zeroizing::new(private_key.trim().trim_start_matches("0x").to_string());

        let signer = secure_key
            .parse::<PrivateKeySigner>()
            .map_err(|e| ClaimerError::Wallet(format!("Invalid private key: {}", e)))?;

        Ok(Self {
            inner: EthereumWallet::from(signer.clone()),
            signer,
        })
    }

    /// Get the wallet address
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a text message with the EIP-191 personal-sign prefix.
    ///
    /// Returns the 65-byte `r || s || v` signature as 0x-prefixed hex.
    pub async fn sign_message(&self, message: &str) -> Result<String> {
        let signature = self
            .signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| ClaimerError::Signature(format!("Failed to sign message: {}", e)))?;

        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }

    /// Sign a fully populated transaction request into its raw EIP-2718 encoding
    pub async fn sign_transaction(&self, tx: TransactionRequest) -> Result<SignedTransaction> {
        let envelope = tx
            .with_from(self.address())
            .build(&self.inner)
            .await
            .map_err(|e| ClaimerError::Signature(format!("Failed to sign transaction: {}", e)))?;

        let raw = envelope.encoded_2718();
        let hash = keccak256(&raw);
        debug!("Signed transaction {} for {}", hash, self.address());

        Ok(SignedTransaction {
            raw: Bytes::from(raw),
            hash,
        })
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Signature, U256};

    // Well-known development key (DO NOT use in production!)
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_wallet_creation() {
        let wallet = Wallet::from_private_key(TEST_KEY).unwrap();

        assert_eq!(
            format!("{:?}", wallet.address()).to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_prefix_is_optional() {
        let with = Wallet::from_private_key(TEST_KEY).unwrap();
        let without = Wallet::from_private_key(TEST_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(with.address(), without.address());
    }

    #[test]
    fn test_invalid_key_is_a_wallet_error() {
        let err = Wallet::from_private_key("0xnothex").unwrap_err();
        assert!(matches!(err, ClaimerError::Wallet(_)), "{err:?}");

        let zero = "0".repeat(64);
        assert!(matches!(
            Wallet::from_private_key(&zero),
            Err(ClaimerError::Wallet(_))
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let wallet = Wallet::from_private_key(TEST_KEY).unwrap();
        let debug = format!("{wallet:?}");
        assert!(!debug.contains("ac0974bec39a17e36ba4a6b4d238ff944bacb478"));
    }

    #[tokio::test]
    async fn test_sign_message_recovers_to_address() {
        let wallet = Wallet::from_private_key(TEST_KEY).unwrap();
        let hex_sig = wallet.sign_message("hello").await.unwrap();

        assert!(hex_sig.starts_with("0x"));
        assert_eq!(hex_sig.len(), 2 + 130);

        let bytes = hex::decode(hex_sig.trim_start_matches("0x")).unwrap();
        let signature = Signature::try_from(bytes.as_slice()).unwrap();
        let recovered = signature.recover_address_from_msg("hello").unwrap();
        assert_eq!(recovered, wallet.address());
    }

    #[tokio::test]
    async fn test_sign_transaction_hash_matches_raw() {
        let wallet = Wallet::from_private_key(TEST_KEY).unwrap();
        let tx = TransactionRequest::default()
            .with_to(Address::repeat_byte(0x11))
            .with_value(U256::from(1u64))
            .with_nonce(0)
            .with_chain_id(56)
            .with_gas_limit(21_000)
            .with_gas_price(1_000_000_000);

        let signed = wallet.sign_transaction(tx).await.unwrap();
        assert_eq!(signed.hash, keccak256(&signed.raw));
        assert!(!signed.raw.is_empty());
    }
}
