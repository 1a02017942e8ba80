//! Error types for MiniChain

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    InvalidDifficulty(String),
    InvalidAmount(String),
    UnsealedBlock,
    BlockAlreadySealed,
    MalformedRecord(String),
    InvalidBlock(String),
    DatabaseError(String),
    SerializationError(String),
    ConfigError(String),
    IoError(String),
    MiningError(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::InvalidDifficulty(msg) => write!(f, "Invalid difficulty: {}", msg),
            ChainError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            ChainError::UnsealedBlock => write!(f, "Block has no nonce; mine it before serializing"),
            ChainError::BlockAlreadySealed => write!(f, "Block is already sealed"),
            ChainError::MalformedRecord(msg) => write!(f, "Malformed stored record: {}", msg),
            ChainError::InvalidBlock(msg) => write!(f, "Invalid block: {}", msg),
            ChainError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ChainError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            ChainError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            ChainError::IoError(msg) => write!(f, "IO error: {}", msg),
            ChainError::MiningError(msg) => write!(f, "Mining error: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ChainError::InvalidDifficulty("\"2\"".to_string()).to_string(),
            "Invalid difficulty: \"2\""
        );
        assert_eq!(
            ChainError::MalformedRecord("missing header.difficulty".to_string()).to_string(),
            "Malformed stored record: missing header.difficulty"
        );
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(ChainError::from(err), ChainError::SerializationError(_)));
    }
}
