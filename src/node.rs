use crate::blockchain::{validate_reward_first, validate_sealed_block, Block};
use crate::config::Config;
use crate::economics::with_reward;
use crate::error::ChainError;
use crate::miner::{build_pool, mine, mine_parallel};
use crate::persistence::{ChainStore, Database, InMemoryStore};
use crate::transaction::Transaction;
use rayon::ThreadPool;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Difficulty used when the caller has no preference.
pub const DEFAULT_DIFFICULTY: u32 = 1;

/// A mining node: owns the local chain and collects the reward for every
/// block it seals.
pub struct Node {
    owner_id: String,
    blocks: Vec<Block>,
    difficulty: u32,
    // Present when mining on more than one thread
    pool: Option<ThreadPool>,
    store: Box<dyn ChainStore>,
    // Blocks [0, persisted) are already in `store`
    persisted: usize,
}

impl Node {
    /// Create a node with an empty chain and an in-memory store.
    pub fn new(owner_id: impl Into<String>) -> Self {
        Node {
            owner_id: owner_id.into(),
            blocks: Vec::new(),
            difficulty: DEFAULT_DIFFICULTY,
            pool: None,
            store: Box::new(InMemoryStore::new()),
            persisted: 0,
        }
    }

    /// Create a node whose chain starts as whatever `store` already holds.
    pub fn with_store(owner_id: impl Into<String>, store: Box<dyn ChainStore>) -> Result<Self, ChainError> {
        let blocks = store.load()?;
        let persisted = blocks.len();
        let owner_id = owner_id.into();
        info!(owner_id = %owner_id, blocks = persisted, "Node loaded chain from store");

        Ok(Node {
            owner_id,
            blocks,
            difficulty: DEFAULT_DIFFICULTY,
            pool: None,
            store,
            persisted,
        })
    }

    /// Build a node from config: installs the log subscriber, opens the
    /// SQLite store and loads the chain from it.
    pub fn init(config: &Config) -> Result<Self, ChainError> {
        config.validate()?;

        // A subscriber may already be installed by the host; keep it
        let _ = tracing_subscriber::fmt()
            .with_max_level(config.log_level()?)
            .try_init();

        let db_path = Path::new(&config.database.path);
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let db = Database::open(&config.database.path)?;
        let node = Node::with_store(config.node.owner_id.clone(), Box::new(db))?;
        node.with_difficulty(config.miner.difficulty)
            .with_threads(config.miner.threads)
    }

    /// Mine with a worker pool of `threads` when greater than one. The pool
    /// is built here and reused for every block.
    pub fn with_threads(mut self, threads: usize) -> Result<Self, ChainError> {
        self.pool = if threads > 1 { Some(build_pool(threads)?) } else { None };
        Ok(self)
    }

    /// Difficulty used by [`Node::process_transactions_default`].
    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// [`Node::process_transactions`] at the node's configured difficulty.
    pub fn process_transactions_default(
        &mut self,
        transactions: Vec<Transaction>,
    ) -> Result<(Block, String), ChainError> {
        self.process_transactions(transactions, self.difficulty)
    }

    /// Seal `transactions` into a new block at `difficulty` and append it.
    ///
    /// The reward transaction is placed first. The new block's
    /// `previous_hash` is copied from the last block's own `previous_hash`
    /// field rather than that block's hash, so every block of a chain grown
    /// from genesis carries `""`.
    pub fn process_transactions(
        &mut self,
        transactions: Vec<Transaction>,
        difficulty: u32,
    ) -> Result<(Block, String), ChainError> {
        let transactions = with_reward(transactions, &self.owner_id);
        let previous_hash = match self.blocks.last() {
            Some(last) => last.previous_hash.clone(),
            None => String::new(),
        };

        let mut block = Block::new(transactions, previous_hash, difficulty);
        debug!(height = self.blocks.len(), difficulty, "Block prepared");

        let (nonce, hash) = match &self.pool {
            Some(pool) => mine_parallel(&block, difficulty, pool),
            None => mine(&block, difficulty),
        };

        block.seal(nonce)?;
        self.blocks.push(block.clone());
        info!(height = self.blocks.len() - 1, nonce, hash = %hash, "Block sealed");

        Ok((block, hash))
    }

    /// Write blocks not yet in the store. Returns how many were written.
    pub fn persist(&mut self) -> Result<usize, ChainError> {
        let pending = &self.blocks[self.persisted..];
        if pending.is_empty() {
            return Ok(0);
        }
        self.store.save(pending)?;
        let written = pending.len();
        self.persisted = self.blocks.len();
        Ok(written)
    }

    /// Re-check every block: proof-of-work for blocks sealed in this
    /// session, reward placement for all.
    pub fn verify_chain(&self) -> Result<(), ChainError> {
        for (height, block) in self.blocks.iter().enumerate() {
            let checked = if block.is_sealed() {
                validate_sealed_block(block)
            } else {
                validate_reward_first(block)
            };
            checked.map_err(|e| ChainError::InvalidBlock(format!("Block {}: {}", height, e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economics::MINING_COST;
    use crate::transaction::ValueTransfer;

    fn pay_fred() -> Transaction {
        Transaction::new(
            vec![ValueTransfer::new(5, "matt")],
            vec![ValueTransfer::new(4, "fred"), ValueTransfer::new(1, "matt")],
        )
    }

    #[test]
    fn test_genesis_block() {
        let mut node = Node::new("matt");
        let (block, hash) = node.process_transactions(Vec::new(), DEFAULT_DIFFICULTY).unwrap();

        assert_eq!(node.blocks().len(), 1);
        assert_eq!(block.previous_hash, "");
        assert!(hash.starts_with('0'));
        assert_eq!(block.hash().unwrap(), hash);
        assert_eq!(block.transactions, vec![Transaction::reward(MINING_COST, "matt")]);
    }

    #[test]
    fn test_second_block() {
        let mut node = Node::new("matt");
        node.process_transactions(Vec::new(), 1).unwrap();
        let (block, hash) = node.process_transactions(vec![pay_fred()], 1).unwrap();

        assert_eq!(node.blocks().len(), 2);
        assert!(hash.starts_with('0'));
        assert_eq!(block.transactions.len(), 2);
        assert!(block.transactions[0].is_reward());
        assert_eq!(block.transactions[1], pay_fred());
        assert_eq!(node.last_block(), Some(&block));
    }

    #[test]
    fn test_previous_hash_carries_forward() {
        let mut node = Node::new("matt");
        for _ in 0..3 {
            node.process_transactions(Vec::new(), 1).unwrap();
        }
        assert!(node.blocks().iter().all(|b| b.previous_hash.is_empty()));
    }

    #[test]
    fn test_difficulty_prefix() {
        let mut node = Node::new("matt");
        let (_, hash) = node.process_transactions(Vec::new(), 2).unwrap();
        assert_eq!(&hash[..2], "00");

        let (block, _) = node.process_transactions(Vec::new(), 0).unwrap();
        assert_eq!(block.nonce(), Some(0));
    }

    #[test]
    fn test_parallel_node_finds_same_block() {
        let mut single = Node::new("matt");
        let mut pooled = Node::new("matt").with_threads(3).unwrap();
        let (a, ha) = single.process_transactions(vec![pay_fred()], 2).unwrap();
        let (b, hb) = pooled.process_transactions(vec![pay_fred()], 2).unwrap();
        assert_eq!(ha, hb);
        assert_eq!(a.nonce(), b.nonce());
    }

    #[test]
    fn test_default_difficulty_from_node() {
        let node = Node::new("matt");
        assert_eq!(node.difficulty(), DEFAULT_DIFFICULTY);

        let mut node = node.with_difficulty(2);
        let (block, hash) = node.process_transactions_default(Vec::new()).unwrap();
        assert_eq!(block.difficulty, 2);
        assert!(hash.starts_with("00"));
    }

    #[test]
    fn test_single_thread_has_no_pool() {
        let node = Node::new("matt").with_threads(1).unwrap();
        assert!(node.pool.is_none());
        let node = node.with_threads(2).unwrap();
        assert_eq!(node.pool.as_ref().map(|p| p.current_num_threads()), Some(2));
    }

    #[test]
    fn test_persist_writes_only_new_blocks() {
        let store = InMemoryStore::new();
        let mut node = Node::with_store("matt", Box::new(store.clone())).unwrap();
        node.process_transactions(Vec::new(), 1).unwrap();
        assert_eq!(node.persist().unwrap(), 1);
        assert_eq!(node.persist().unwrap(), 0);

        node.process_transactions(vec![pay_fred()], 1).unwrap();
        assert_eq!(node.persist().unwrap(), 1);
        assert_eq!(store.load().unwrap(), node.blocks());
    }

    #[test]
    fn test_reload_and_extend() {
        let store = InMemoryStore::new();
        let mut node = Node::with_store("matt", Box::new(store.clone())).unwrap();
        node.process_transactions(Vec::new(), 1).unwrap();
        node.persist().unwrap();

        let mut reloaded = Node::with_store("matt", Box::new(store.clone())).unwrap();
        assert_eq!(reloaded.blocks(), node.blocks());
        assert_eq!(reloaded.persist().unwrap(), 0);

        reloaded.process_transactions(Vec::new(), 1).unwrap();
        assert_eq!(reloaded.persist().unwrap(), 1);
        assert_eq!(store.load().unwrap().len(), 2);
        assert!(reloaded.verify_chain().is_ok());
    }

    #[test]
    fn test_verify_chain() {
        let mut node = Node::new("matt");
        node.process_transactions(Vec::new(), 1).unwrap();
        node.process_transactions(vec![pay_fred()], 1).unwrap();
        assert!(node.verify_chain().is_ok());

        node.blocks[1].transactions.remove(0);
        assert!(matches!(node.verify_chain(), Err(ChainError::InvalidBlock(_))));
    }
}
