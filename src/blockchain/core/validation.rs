use crate::error::ChainError;
use crate::miner::meets_difficulty;

use super::chain::Block;

/// Checks a block produced by a local node: sealed, hash meets its own
/// difficulty, and the first transaction is the miner's reward.
pub fn validate_sealed_block(block: &Block) -> Result<(), ChainError> {
    let hash = block.hash()?;
    if !meets_difficulty(&hash, block.difficulty) {
        return Err(ChainError::InvalidBlock(format!(
            "Hash {} does not have {} leading zeros",
            hash, block.difficulty
        )));
    }

    validate_reward_first(block)
}

/// The check that still applies to blocks read back from a store, which carry no nonce.
pub fn validate_reward_first(block: &Block) -> Result<(), ChainError> {
    match block.transactions.first() {
        Some(tx) if tx.is_reward() => Ok(()),
        _ => Err(ChainError::InvalidBlock(
            "First transaction in a block must be a reward transaction.".to_string(),
        )),
    }
}
