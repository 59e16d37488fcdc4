use alloy::primitives::{Address, U256};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub contracts: ContractsConfig,
    pub api: ApiConfig,
    pub eligibility: EligibilityConfig,
    pub transaction: TransactionConfig,
    pub proxy: ProxyConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint of the chain
    pub rpc_url: String,
    /// Block explorer base URL, used for transaction links
    pub explorer_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    /// STO token contract
    pub token_address: String,
    /// Airdrop claim contract
    pub claim_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Claim-data endpoint of the eligibility service
    pub claim_url: String,
    pub origin: String,
    pub referer: String,
    pub user_agent: String,
    /// Airdrop batch identifier sent with every request
    pub batch_id: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct EligibilityConfig {
    /// Total attempts when the service answers `Invalid signature`
    pub max_attempts: u32,
    /// Pause between those attempts
    pub retry_delay_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionConfig {
    /// Legacy gas price used for every transaction
    pub gas_price_wei: u64,
    /// Native value attached to the claim call
    pub claim_fee_wei: u64,
    /// Decimals of the allocation returned by the service
    pub allocation_decimals: u8,
    /// How long to wait for a receipt before giving up
    pub receipt_timeout_secs: u64,
    /// Receipt polling interval
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// URL fetched through a proxy to check that it works
    pub probe_url: String,
    pub probe_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Directory holding wallets.txt, proxies.txt and recipients.txt
    pub user_data_dir: PathBuf,
    pub token_abi: PathBuf,
    pub claim_abi: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory of the rotating log file
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    /// Mirror log records to the console
    #[serde(default)]
    pub console: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
            console: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Self::with_defaults(Config::builder())?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("STO_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (STO_NETWORK__RPC_URL, etc.)
            .add_source(
                Environment::with_prefix("STO")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("network.rpc_url", "https://bsc.meowrpc.com")?
            .set_default("network.explorer_url", "https://bscscan.com/")?
            .set_default(
                "contracts.token_address",
                "0xdAf1695c41327b61B9b9965Ac6A5843A3198cf07",
            )?
            .set_default(
                "contracts.claim_address",
                "0x04bB7043eBbe5EC3f6a08EC45b3De8C36e0628B3",
            )?
            .set_default("api.claim_url", "https://airdrop.stakestone.io/api/claim-data")?
            .set_default("api.origin", "https://airdrop.stakestone.io")?
            .set_default("api.referer", "https://airdrop.stakestone.io/unified")?
            .set_default(
                "api.user_agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36",
            )?
            .set_default("api.batch_id", "0")?
            .set_default("api.request_timeout_secs", 30)?
            .set_default("eligibility.max_attempts", 5)?
            .set_default("eligibility.retry_delay_secs", 2)?
            .set_default("transaction.gas_price_wei", 1_000_000_000_u64)?
            .set_default("transaction.claim_fee_wei", 830_371_674_361_444_u64)?
            .set_default("transaction.allocation_decimals", 18)?
            .set_default("transaction.receipt_timeout_secs", 120)?
            .set_default("transaction.poll_interval_secs", 10)?
            .set_default("proxy.probe_url", "https://httpbin.org/ip")?
            .set_default("proxy.probe_timeout_secs", 10)?
            .set_default("paths.user_data_dir", "./user_data")?
            .set_default("paths.token_abi", "./global_data/STO_TOKEN_ABI.json")?
            .set_default("paths.claim_abi", "./global_data/STO_CLAIM_ABI.json")?
            .set_default("logging.level", "info")?
            .set_default("logging.dir", "./logs")?
            .set_default("logging.console", false)
    }

    /// Configuration made only of the built-in defaults
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::with_defaults(Config::builder())?
            .build()?
            .try_deserialize()
    }

    pub fn token_address(&self) -> Result<Address, String> {
        parse_address("contracts.token_address", &self.contracts.token_address)
    }

    pub fn claim_address(&self) -> Result<Address, String> {
        parse_address("contracts.claim_address", &self.contracts.claim_address)
    }

    pub fn claim_fee(&self) -> U256 {
        U256::from(self.transaction.claim_fee_wei)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.transaction.receipt_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.transaction.poll_interval_secs)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = self.token_address() {
            errors.push(e);
        }
        if let Err(e) = self.claim_address() {
            errors.push(e);
        }

        for (name, value) in [
            ("network.rpc_url", &self.network.rpc_url),
            ("network.explorer_url", &self.network.explorer_url),
            ("api.claim_url", &self.api.claim_url),
            ("proxy.probe_url", &self.proxy.probe_url),
        ] {
            if let Err(e) = url::Url::parse(value) {
                errors.push(format!("{name} is not a valid URL ({value}): {e}"));
            }
        }

        if self.eligibility.max_attempts == 0 {
            errors.push("eligibility.max_attempts must be at least 1".to_string());
        }

        if self.transaction.gas_price_wei == 0 {
            errors.push("transaction.gas_price_wei must be positive".to_string());
        }

        if self.transaction.poll_interval_secs == 0 {
            errors.push("transaction.poll_interval_secs must be positive".to_string());
        }

        if self.transaction.poll_interval_secs > self.transaction.receipt_timeout_secs {
            errors.push(
                "transaction.poll_interval_secs should not exceed receipt_timeout_secs"
                    .to_string(),
            );
        }

        if self.transaction.allocation_decimals > 36 {
            errors.push("transaction.allocation_decimals must be at most 36".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn parse_address(name: &str, raw: &str) -> Result<Address, String> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| format!("{name} is not a valid address ({raw}): {e}"))
}

/// Delay and ordering settings chosen by the operator for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub min_account_delay: u64,
    pub max_account_delay: u64,
    pub min_action_delay: u64,
    pub max_action_delay: u64,
    pub shuffle: bool,
}

/// An inclusive `[min, max]` delay range in seconds. Operator input needs `max > min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

impl DelayRange {
    pub fn new(min: u64, max: u64) -> Result<Self, String> {
        if max <= min {
            return Err(format!(
                "Maximum delay ({max}) must be greater than minimum ({min})"
            ));
        }
        Ok(Self { min, max })
    }
}

impl RunConfig {
    pub fn new(account: DelayRange, action: DelayRange, shuffle: bool) -> Self {
        Self {
            min_account_delay: account.min,
            max_account_delay: account.max,
            min_action_delay: action.min,
            max_action_delay: action.max,
            shuffle,
        }
    }

    pub fn account_delay(&self) -> DelayRange {
        DelayRange {
            min: self.min_account_delay,
            max: self.max_account_delay,
        }
    }

    pub fn action_delay(&self) -> DelayRange {
        DelayRange {
            min: self.min_action_delay,
            max: self.max_action_delay,
        }
    }

    /// No delays, original order. Handy for tests.
    pub fn immediate() -> Self {
        Self {
            min_account_delay: 0,
            max_account_delay: 0,
            min_action_delay: 0,
            max_action_delay: 0,
            shuffle: false,
        }
    }
}
