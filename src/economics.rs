/// Economics module: mining reward rules
use crate::transaction::Transaction;

/// Amount credited to the node that seals a block.
pub const MINING_COST: u64 = 1;

/// Returns `transactions` with the miner's reward transaction prepended.
pub fn with_reward(transactions: Vec<Transaction>, owner_id: &str) -> Vec<Transaction> {
    let mut rewarded = Vec::with_capacity(transactions.len() + 1);
    rewarded.push(Transaction::reward(MINING_COST, owner_id));
    rewarded.extend(transactions);
    rewarded
}
