use thiserror::Error;

/// Main error type for the claimer
#[derive(Error, Debug)]
pub enum ClaimerError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Contract interface error: {0}")]
    Abi(String),

    // Per-account input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Eligibility service errors
    #[error("{0} is not eligible to claim the drop")]
    NotEligible(String),

    #[error("Eligibility service error: {0}")]
    EligibilityService(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error: {0}")]
    Rpc(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Crypto/signing errors
    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Signature error: {0}")]
    Signature(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ClaimerError
pub type Result<T> = std::result::Result<T, ClaimerError>;

impl ClaimerError {
    /// Errors that must stop the run before any account is processed
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClaimerError::Config(_) | ClaimerError::Configuration(_) | ClaimerError::Abi(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_fatal() {
        assert!(ClaimerError::Configuration("length mismatch".into()).is_fatal());
        assert!(ClaimerError::Abi("missing claim".into()).is_fatal());
        assert!(!ClaimerError::InvalidInput("bad key".into()).is_fatal());
        assert!(!ClaimerError::Rpc("timeout".into()).is_fatal());
    }

    #[test]
    fn not_eligible_message_names_the_address() {
        let err = ClaimerError::NotEligible("0xabc".into());
        assert_eq!(err.to_string(), "0xabc is not eligible to claim the drop");
    }
}
