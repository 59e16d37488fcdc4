pub mod batch;
pub mod claim;
pub mod context;
pub mod delay;
pub mod eligibility;
pub mod pipeline;
pub mod retry;
pub mod submitter;
pub mod sweep;

pub use batch::{order_accounts, BatchRunner, BatchSummary};
pub use claim::{classify_revert, ownership_message, ClaimExecutor, ALREADY_CLAIMED_SELECTOR};
pub use context::ClaimContext;
pub use eligibility::EligibilityClient;
pub use pipeline::AccountPipeline;
pub use retry::{retry_when, RetryPolicy};
pub use submitter::TransactionSubmitter;
pub use sweep::{native_sweep_value, SweepExecutor};
