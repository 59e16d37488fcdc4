pub mod abi;
pub mod chain;
pub mod eligibility_api;
pub mod files;
pub mod session;

pub use abi::{decode_uint, ContractInterface};
pub use chain::{ChainClient, ReceiptStatus, RpcChainClient, RpcFailure};
pub use eligibility_api::{ClaimDataRequest, EligibilityApi, HttpEligibilityApi};
pub use files::load_accounts;
pub use session::{AccountSession, HttpSessionFactory, SessionFactory};
