//! Emberchain consensus core
//!
//! The deterministic rule-set that derives a new block header from its
//! parent, bounds how far each block's gas limit may move, computes the
//! mandatory minimum cost of a transaction, and recovers a transaction's
//! signer from its signature. These rules are consensus-critical: every
//! validator must compute byte-identical results or the network forks.
//!
//! # Architecture
//!
//! ## Consensus Rules
//! - [`header`] - Block header field derivation and timestamps
//! - [`gas`] - Gas-limit elasticity bounds and recommendations
//! - [`fees`] - Intrinsic gas pricing
//!
//! ## Transactions
//! - [`transaction`] - Transaction values, sender recovery, and dry-run
//!   overlays
//!
//! ## Cryptography
//! - [`crypto`] - Signatures, recovery, and addresses (secp256k1)
//!
//! ## Configuration & Utilities
//! - [`config`] - Protocol parameters
//! - [`error`] - Error types
//!
//! Execution, state storage, networking, and wire encoding are external
//! collaborators; this crate consumes decoded headers and transactions
//! and produces field values, addresses, and gas costs.

#![forbid(unsafe_code)]

// ============================================================================
// Consensus Rules
// ============================================================================
pub mod fees;
pub mod gas;
pub mod header;

// ============================================================================
// Transactions
// ============================================================================
pub mod transaction;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
