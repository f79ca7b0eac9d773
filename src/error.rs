//! Error types for the emberchain consensus core

use thiserror::Error;

/// Failure conditions surfaced by the consensus-core rules.
///
/// All variants are local, synchronous, and recoverable by the caller;
/// none leave partial state behind. Failures are propagated immediately
/// rather than substituted with defaults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Malformed or contradictory caller input.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Cryptographically malformed or non-recoverable signature.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    /// Attempt to override a property that is already authoritatively set.
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
