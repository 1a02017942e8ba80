//! Hashing primitives for MiniChain

use crate::encoding::encode;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest.
pub const HEX_DIGEST_LEN: usize = 64;

/// SHA-256 of `bytes`, lowercase hex.
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hash of the canonical encoding of `record`.
pub fn hash_record(record: &Value) -> String {
    digest(&encode(record))
}

/// True if `s` looks like the output of [`digest`].
pub fn is_hex_digest(s: &str) -> bool {
    s.len() == HEX_DIGEST_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
