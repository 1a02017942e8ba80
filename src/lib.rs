//! MiniChain - a single-node proof-of-work ledger
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`blockchain`] - Block structure, hashing and sealed-block checks
//! - [`transaction`] - Value transfers and transactions
//! - [`economics`] - Mining reward rules
//!
//! ## Consensus
//! - [`miner`] - Proof-of-work nonce search
//! - [`node`] - Chain owner that turns transaction batches into blocks
//!
//! ## Encoding & Hashing
//! - [`encoding`] - Canonical record encoding
//! - [`crypto`] - SHA-256 digests
//!
//! ## State Management
//! - [`persistence`] - Block stores (SQLite, in-memory)
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod economics;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod miner;
pub mod node;

// ============================================================================
// Encoding & Hashing
// ============================================================================
pub mod crypto;
pub mod encoding;

// ============================================================================
// State Management
// ============================================================================
pub mod persistence;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
