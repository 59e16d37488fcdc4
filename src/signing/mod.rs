pub mod wallet;

pub use wallet::{SignedTransaction, Wallet};
