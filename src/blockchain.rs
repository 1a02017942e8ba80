// Thin re-export module: implementation is in `blockchain/core.rs`, split into
// the block structure and the checks run over sealed blocks.

pub mod core;
pub use self::core::*;
