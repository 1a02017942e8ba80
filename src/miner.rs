//! Proof-of-work search
//!
//! A block is valid at difficulty `d` when the hex form of its hash starts
//! with `d` `'0'` characters. The search walks nonces upward from zero and
//! has no upper bound; difficulty 0 accepts nonce 0.

use crate::blockchain::Block;
use crate::error::ChainError;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::debug;

/// Nonces handed to the worker pool per round in [`mine_parallel`].
pub const PARALLEL_BATCH_SIZE: u64 = 4096;

/// True if `hash` starts with `difficulty` `'0'` characters.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let d = difficulty as usize;
    hash.len() >= d && hash.as_bytes()[..d].iter().all(|&b| b == b'0')
}

/// Reads a difficulty out of a record; only non-negative integers are accepted.
pub fn parse_difficulty(value: &Value) -> Result<u32, ChainError> {
    value
        .as_u64()
        .and_then(|d| u32::try_from(d).ok())
        .ok_or_else(|| ChainError::InvalidDifficulty(format!("expected a non-negative integer, got {}", value)))
}

/// Searches nonces 0, 1, 2, ... until the block hash meets `difficulty`.
pub fn mine(block: &Block, difficulty: u32) -> (u64, String) {
    let started = Instant::now();
    debug!(difficulty, transactions = block.transactions.len(), "Starting nonce search");

    let mut nonce: u64 = 0;
    loop {
        let hash = block.hash_with_nonce(nonce);
        if meets_difficulty(&hash, difficulty) {
            debug!(nonce, elapsed_ms = started.elapsed().as_millis() as u64, "Nonce found");
            return (nonce, hash);
        }
        nonce += 1;
    }
}

/// Same search as [`mine`], abandoned once `cancel` is set.
pub fn mine_with_cancel(block: &Block, difficulty: u32, cancel: &AtomicBool) -> Option<(u64, String)> {
    let mut nonce: u64 = 0;
    loop {
        if cancel.load(Ordering::Relaxed) {
            debug!(nonce, "Nonce search cancelled");
            return None;
        }
        let hash = block.hash_with_nonce(nonce);
        if meets_difficulty(&hash, difficulty) {
            return Some((nonce, hash));
        }
        nonce += 1;
    }
}

/// Worker pool for [`mine_parallel`]; build once and reuse across blocks.
pub fn build_pool(threads: usize) -> Result<ThreadPool, ChainError> {
    ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .map_err(|e| ChainError::MiningError(format!("Failed to build mining pool: {}", e)))
}

/// Multi-threaded search on `pool`. Returns the lowest winning nonce, the
/// same one [`mine`] would find.
pub fn mine_parallel(block: &Block, difficulty: u32, pool: &ThreadPool) -> (u64, String) {
    let started = Instant::now();
    debug!(difficulty, threads = pool.current_num_threads(), "Starting parallel nonce search");

    let found = pool.install(|| {
        let mut start: u64 = 0;
        loop {
            let end = start.saturating_add(PARALLEL_BATCH_SIZE);
            let winner = (start..end)
                .into_par_iter()
                .find_first(|&nonce| meets_difficulty(&block.hash_with_nonce(nonce), difficulty));
            if let Some(nonce) = winner {
                return (nonce, block.hash_with_nonce(nonce));
            }
            start = end;
        }
    });

    debug!(nonce = found.0, elapsed_ms = started.elapsed().as_millis() as u64, "Nonce found");
    found
}
