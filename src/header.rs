//! Block header derivation
//!
//! Derives the field set of a child header from its parent, applying
//! genesis defaults when no parent exists. The deriver intentionally
//! performs partial construction: optional fields it was not given are
//! left absent rather than defaulted, so it never invents cryptographic
//! roots on the caller's behalf.

use crate::crypto::Address;
use crate::error::{ChainError, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};

pub type Sha256Hash = [u8; 32];

/// Block number of the first header in a chain.
pub const GENESIS_BLOCK_NUMBER: u64 = 0;

/// Parent-hash sentinel carried by the genesis header.
pub const GENESIS_PARENT_HASH: Sha256Hash = [0u8; 32];

/// SHA-256 of empty input: the digest of an empty state trie.
pub const BLANK_ROOT_HASH: Sha256Hash = [
    0xe3, 0xb0, 0xc4, 0x42, 0x98, 0xfc, 0x1c, 0x14, 0x9a, 0xfb, 0xf4, 0xc8, 0x99, 0x6f, 0xb9,
    0x24, 0x27, 0xae, 0x41, 0xe4, 0x64, 0x9b, 0x93, 0x4c, 0xa4, 0x95, 0x99, 0x1b, 0x78, 0x52,
    0xb8, 0x55,
];

/// An immutable block header. Constructed once, never mutated; signing
/// and hashing downstream finalize it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlockHeader {
    pub parent_hash: Sha256Hash,
    pub block_number: u64,
    pub coinbase: Address,
    pub state_root: Sha256Hash,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub difficulty: u64,
    pub timestamp: u64,
    #[serde(with = "serde_bytes")]
    pub nonce: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub extra_data: Vec<u8>,
    pub transaction_root: Sha256Hash,
    pub receipt_root: Sha256Hash,
    pub mix_hash: Sha256Hash,
}

impl BlockHeader {
    /// Canonical hash of this header.
    pub fn hash(&self) -> Sha256Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.parent_hash);
        hasher.update(self.block_number.to_le_bytes());
        hasher.update(self.coinbase);
        hasher.update(self.state_root);
        hasher.update(self.gas_limit.to_le_bytes());
        hasher.update(self.gas_used.to_le_bytes());
        hasher.update(self.difficulty.to_le_bytes());
        hasher.update(self.timestamp.to_le_bytes());
        hasher.update(&self.nonce);
        hasher.update(&self.extra_data);
        hasher.update(self.transaction_root);
        hasher.update(self.receipt_root);
        hasher.update(self.mix_hash);
        hasher.finalize().into()
    }
}

/// Optional header fields the caller may supply to the deriver. Absent
/// fields stay absent in the result; presence is explicit, never inferred
/// from sentinel values.
#[derive(Debug, Default, Clone)]
pub struct HeaderOptions {
    pub state_root: Option<Sha256Hash>,
    pub nonce: Option<Vec<u8>>,
    pub extra_data: Option<Vec<u8>>,
    pub transaction_root: Option<Sha256Hash>,
    pub receipt_root: Option<Sha256Hash>,
    pub mix_hash: Option<Sha256Hash>,
}

/// The deriver's output: required fields resolved, optional fields kept
/// only if the caller supplied them. A downstream finalizer fills
/// protocol-mandated defaults for the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFields {
    pub parent_hash: Sha256Hash,
    pub block_number: u64,
    pub coinbase: Address,
    pub state_root: Sha256Hash,
    pub gas_limit: u64,
    pub difficulty: u64,
    pub timestamp: u64,
    pub nonce: Option<Vec<u8>>,
    pub extra_data: Option<Vec<u8>>,
    pub transaction_root: Option<Sha256Hash>,
    pub receipt_root: Option<Sha256Hash>,
    pub mix_hash: Option<Sha256Hash>,
}

/// Derive the full field set for a new header from an optional parent.
///
/// Genesis (no parent): the parent hash is the 32-zero-byte sentinel, the
/// block number is zero, and the state root defaults to the empty-trie
/// digest. Non-genesis: the parent hash is `parent.hash()`, the block
/// number increments, and the state root defaults to the parent's.
pub fn derive_header_fields(
    parent: Option<&BlockHeader>,
    gas_limit: u64,
    difficulty: u64,
    timestamp: u64,
    coinbase: Address,
    options: &HeaderOptions,
) -> Result<HeaderFields> {
    if gas_limit == 0 {
        return Err(ChainError::InvalidArgument(
            "Gas limit must be positive".to_string(),
        ));
    }

    let (parent_hash, block_number, state_root) = match parent {
        None => {
            if options.state_root == Some([0u8; 32]) {
                return Err(ChainError::InvalidArgument(
                    "Genesis state root of all zeroes is not the empty-trie digest".to_string(),
                ));
            }
            (
                GENESIS_PARENT_HASH,
                GENESIS_BLOCK_NUMBER,
                options.state_root.unwrap_or(BLANK_ROOT_HASH),
            )
        }
        Some(parent) => (
            parent.hash(),
            parent.block_number + 1,
            options.state_root.unwrap_or(parent.state_root),
        ),
    };

    Ok(HeaderFields {
        parent_hash,
        block_number,
        coinbase,
        state_root,
        gas_limit,
        difficulty,
        timestamp,
        nonce: options.nonce.clone(),
        extra_data: options.extra_data.clone(),
        transaction_root: options.transaction_root,
        receipt_root: options.receipt_root,
        mix_hash: options.mix_hash,
    })
}

/// Current wall-clock time as integer UTC seconds.
pub fn now_utc() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Generate a timestamp for a new header. Uses the current time when it
/// is strictly past the parent's timestamp; otherwise `parent.timestamp
/// + 1`, keeping timestamps strictly increasing even under clock skew or
/// rapid block production.
pub fn next_timestamp(parent: Option<&BlockHeader>) -> u64 {
    match parent {
        None => now_utc(),
        // header timestamps must increment
        Some(parent) => now_utc().max(parent.timestamp + 1),
    }
}
