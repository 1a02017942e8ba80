//! Transaction module: value transfers and the transactions that group them

pub mod types;

pub use types::*;
