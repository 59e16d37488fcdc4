use alloy::primitives::Address;
use std::sync::OnceLock;
use zeroize::Zeroizing;

use crate::error::{ClaimerError, Result};
use crate::signing::Wallet;

/// One account of the batch: its key, its proxy and where its funds go
pub struct AccountRecord {
    private_key: Zeroizing<String>,
    proxy: Option<String>,
    recipient: String,
    address: OnceLock<Address>,
}

impl AccountRecord {
    pub fn new(private_key: &str, proxy: Option<&str>, recipient: &str) -> Self {
        Self {
            private_key: Zeroizing::new(private_key.trim().to_string()),
            proxy: proxy
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(ToString::to_string),
            recipient: recipient.trim().to_string(),
            address: OnceLock::new(),
        }
    }

    /// Address derived from the private key, computed on first use
    pub fn address(&self) -> Result<Address> {
        if let Some(address) = self.address.get() {
            return Ok(*address);
        }
        let address = self.wallet()?.address();
        Ok(*self.address.get_or_init(|| address))
    }

    /// Signer for this account
    pub fn wallet(&self) -> Result<Wallet> {
        Wallet::from_private_key(&self.private_key)
    }

    /// Check the key looks like 32 hex bytes, optionally 0x-prefixed
    pub fn has_valid_key_format(&self) -> bool {
        is_private_key_format(&self.private_key)
    }

    /// Truncated key for display
    pub fn hidden_key(&self) -> String {
        let prefix: String = self.private_key.chars().take(10).collect();
        format!("{prefix}*****")
    }

    /// Address when derivable, the truncated key otherwise
    pub fn label(&self) -> String {
        match self.address() {
            Ok(address) => address.to_string(),
            Err(_) => self.hidden_key(),
        }
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Recipient as written in the input file
    pub fn raw_recipient(&self) -> &str {
        &self.recipient
    }

    /// Recipient parsed and checksummed
    pub fn recipient(&self) -> Result<Address> {
        normalize_address(&self.recipient)
    }
}

impl std::fmt::Debug for AccountRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountRecord")
            .field("private_key", &self.hidden_key())
            .field("proxy", &self.proxy)
            .field("recipient", &self.recipient)
            .finish()
    }
}

pub fn is_private_key_format(key: &str) -> bool {
    let hex_part = key.strip_prefix("0x").unwrap_or(key);
    hex_part.len() == 64 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse an address in any letter case and return it in checksummed form
pub fn normalize_address(raw: &str) -> Result<Address> {
    let trimmed = raw.trim();
    let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ClaimerError::InvalidInput(format!(
            "Invalid recipient address {trimmed}: expected 20 hex bytes"
        )));
    }

    trimmed
        .parse::<Address>()
        .map_err(|e| ClaimerError::InvalidInput(format!("Invalid recipient address {trimmed}: {e}")))
}
