use crate::crypto::hash_record;
use crate::encoding::encode_json;
use crate::error::ChainError;
use crate::miner::parse_difficulty;
use crate::transaction::Transaction;
use serde_json::{json, Value};

/// A batch of transactions sealed by proof-of-work.
///
/// The hashed record is
/// `{header: {previous_hash, body_hash, difficulty, nonce}, body: {transactions}}`
/// where `body_hash` is the hash of `body`, so the header hash commits to the
/// transactions.
#[derive(Debug, Clone)]
pub struct Block {
    pub transactions: Vec<Transaction>,
    pub previous_hash: String,
    pub difficulty: u32,
    nonce: Option<u64>,
}

/// Blocks compare by `previous_hash` and `transactions`; nonce and difficulty
/// are not part of equality.
impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.previous_hash == other.previous_hash && self.transactions == other.transactions
    }
}

impl Block {
    pub fn new(transactions: Vec<Transaction>, previous_hash: impl Into<String>, difficulty: u32) -> Self {
        Block {
            transactions,
            previous_hash: previous_hash.into(),
            difficulty,
            nonce: None,
        }
    }

    pub fn nonce(&self) -> Option<u64> {
        self.nonce
    }

    pub fn is_sealed(&self) -> bool {
        self.nonce.is_some()
    }

    /// Fixes the winning nonce. A block is sealed at most once.
    pub fn seal(&mut self, nonce: u64) -> Result<(), ChainError> {
        if self.nonce.is_some() {
            return Err(ChainError::BlockAlreadySealed);
        }
        self.nonce = Some(nonce);
        Ok(())
    }

    fn body_record(&self) -> Value {
        json!({
            "transactions": self.transactions.iter().map(Transaction::to_record).collect::<Vec<_>>(),
        })
    }

    pub fn to_record(&self, nonce: u64) -> Value {
        let body = self.body_record();
        json!({
            "header": {
                "previous_hash": self.previous_hash,
                "body_hash": hash_record(&body),
                "difficulty": self.difficulty,
                "nonce": nonce,
            },
            "body": body,
        })
    }

    /// Hash of the block as if sealed with `nonce`.
    pub fn hash_with_nonce(&self, nonce: u64) -> String {
        hash_record(&self.to_record(nonce))
    }

    /// Hash under the sealed nonce.
    pub fn hash(&self) -> Result<String, ChainError> {
        let nonce = self.nonce.ok_or(ChainError::UnsealedBlock)?;
        Ok(self.hash_with_nonce(nonce))
    }

    /// Canonical stored form (compact JSON). Only sealed blocks can be serialized.
    pub fn serialize(&self) -> Result<String, ChainError> {
        let nonce = self.nonce.ok_or(ChainError::UnsealedBlock)?;
        Ok(encode_json(&self.to_record(nonce)))
    }

    pub fn deserialize(data: &str) -> Result<Self, ChainError> {
        let record: Value = serde_json::from_str(data)
            .map_err(|e| ChainError::MalformedRecord(format!("Stored block is not valid JSON: {}", e)))?;
        Self::from_record(&record)
    }

    /// Rebuilds a block from its record. The nonce is left unset.
    pub fn from_record(record: &Value) -> Result<Self, ChainError> {
        let header = record
            .get("header")
            .ok_or_else(|| ChainError::MalformedRecord("missing header".to_string()))?;
        let previous_hash = header
            .get("previous_hash")
            .and_then(Value::as_str)
            .ok_or_else(|| ChainError::MalformedRecord("missing header.previous_hash".to_string()))?;
        let difficulty = header
            .get("difficulty")
            .ok_or_else(|| ChainError::MalformedRecord("missing header.difficulty".to_string()))?;
        let difficulty = parse_difficulty(difficulty)?;

        let transactions = record
            .get("body")
            .and_then(|body| body.get("transactions"))
            .and_then(Value::as_array)
            .ok_or_else(|| ChainError::MalformedRecord("missing body.transactions".to_string()))?
            .iter()
            .map(Transaction::from_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Block::new(transactions, previous_hash, difficulty))
    }
}
