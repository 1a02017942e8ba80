//! Block storage for MiniChain
//!
//! Blocks are stored as opaque canonical records, one entry per block, in
//! insertion order. Loading rebuilds each block with `Block::deserialize`.

use crate::blockchain::Block;
use crate::error::ChainError;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Abstraction for storage backends holding the serialized block sequence.
pub trait ChainStore: Send + Sync {
    /// Appends `blocks` in order. Every block must be sealed.
    fn save(&self, blocks: &[Block]) -> Result<(), ChainError>;
    /// Returns all stored blocks in the order they were saved.
    fn load(&self) -> Result<Vec<Block>, ChainError>;
}

fn serialize_all(blocks: &[Block]) -> Result<Vec<String>, ChainError> {
    blocks.iter().map(Block::serialize).collect()
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &str) -> Result<Self, ChainError> {
        let conn = Connection::open(path)
            .map_err(|e| ChainError::DatabaseError(format!("Failed to open database: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS blocks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                data TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| ChainError::DatabaseError(format!("Failed to create blocks table: {}", e)))?;

        Ok(Database { conn: Mutex::new(conn) })
    }

    pub fn block_count(&self) -> Result<usize, ChainError> {
        let conn = self.conn.lock().map_err(|_| ChainError::DatabaseError("Mutex poisoned".to_string()))?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM blocks", [], |row| row.get(0))
            .map_err(|e| ChainError::DatabaseError(format!("Failed to count blocks: {}", e)))?;
        Ok(count as usize)
    }
}

impl ChainStore for Database {
    fn save(&self, blocks: &[Block]) -> Result<(), ChainError> {
        // Serialize everything first so an unsealed block writes nothing
        let records = serialize_all(blocks)?;

        let conn_guard = self.conn.lock().map_err(|_| ChainError::DatabaseError("Mutex poisoned".to_string()))?;
        let tx = conn_guard.unchecked_transaction().map_err(|e| {
            ChainError::DatabaseError(format!("Failed to start transaction: {}", e))
        })?;

        for data in &records {
            tx.execute("INSERT INTO blocks (data) VALUES (?1)", params![data])
                .map_err(|e| ChainError::DatabaseError(format!("Failed to save block: {}", e)))?;
        }

        tx.commit().map_err(|e| {
            ChainError::DatabaseError(format!("Failed to commit transaction: {}", e))
        })?;

        info!(count = records.len(), "Saved blocks to database");
        Ok(())
    }

    fn load(&self) -> Result<Vec<Block>, ChainError> {
        let conn_guard = self.conn.lock().map_err(|_| ChainError::DatabaseError("Mutex poisoned".to_string()))?;
        let mut stmt = conn_guard
            .prepare("SELECT data FROM blocks ORDER BY id ASC")
            .map_err(|e| ChainError::DatabaseError(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| ChainError::DatabaseError(format!("Failed to query blocks: {}", e)))?;

        let mut blocks = Vec::new();
        for row_result in rows {
            let data = row_result
                .map_err(|e| ChainError::DatabaseError(format!("Failed to read row: {}", e)))?;
            blocks.push(Block::deserialize(&data)?);
        }

        info!(count = blocks.len(), "Loaded blocks from database");
        Ok(blocks)
    }
}

/// Simple in-memory store useful for tests and ephemeral runs.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    records: Arc<Mutex<Vec<String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_count(&self) -> Result<usize, ChainError> {
        let records = self.records.lock().map_err(|_| ChainError::DatabaseError("Mutex poisoned".to_string()))?;
        Ok(records.len())
    }
}

impl ChainStore for InMemoryStore {
    fn save(&self, blocks: &[Block]) -> Result<(), ChainError> {
        let new_records = serialize_all(blocks)?;
        let mut records = self.records.lock().map_err(|_| ChainError::DatabaseError("Mutex poisoned".to_string()))?;
        records.extend(new_records);
        Ok(())
    }

    fn load(&self) -> Result<Vec<Block>, ChainError> {
        let records = self.records.lock().map_err(|_| ChainError::DatabaseError("Mutex poisoned".to_string()))?;
        records.iter().map(|data| Block::deserialize(data)).collect()
    }
}
