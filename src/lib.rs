pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod services;
pub mod signing;

pub use config::{AppConfig, DelayRange, RunConfig};
pub use domain::{AccountRecord, ClaimOutcome, EligibilityProof, PipelineResult, SweepOutcome, TransactionOutcome};
pub use error::{ClaimerError, Result};
pub use services::{BatchRunner, BatchSummary, ClaimContext};
pub use signing::Wallet;
