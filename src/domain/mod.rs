pub mod account;
pub mod outcome;
pub mod proof;

pub use account::*;
pub use outcome::*;
pub use proof::*;
