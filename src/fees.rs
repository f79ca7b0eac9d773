//! Intrinsic gas pricing
//!
//! The intrinsic gas of a transaction is the minimum it must pay before
//! any execution happens: a flat base cost, per-byte payload costs that
//! distinguish zero from non-zero bytes, and a surcharge for contract
//! creation.

use crate::transaction::TxDestination;
use serde::{Deserialize, Serialize};

/// Named cost constants for intrinsic gas. Immutable, process-wide
/// configuration, loaded once as part of [`crate::config::ProtocolParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasSchedule {
    /// Flat cost charged to every transaction.
    #[serde(default = "default_base_tx")]
    pub base_tx: u64,
    /// Additional cost when the destination is contract creation.
    #[serde(default = "default_create_surcharge")]
    pub create_surcharge: u64,
    /// Cost per 0x00 payload byte.
    #[serde(default = "default_per_zero_byte")]
    pub per_zero_byte: u64,
    /// Cost per non-zero payload byte.
    #[serde(default = "default_per_nonzero_byte")]
    pub per_nonzero_byte: u64,
}

impl Default for GasSchedule {
    fn default() -> Self {
        GasSchedule {
            base_tx: default_base_tx(),
            create_surcharge: default_create_surcharge(),
            per_zero_byte: default_per_zero_byte(),
            per_nonzero_byte: default_per_nonzero_byte(),
        }
    }
}

fn default_base_tx() -> u64 {
    21_000
}

fn default_create_surcharge() -> u64 {
    32_000
}

fn default_per_zero_byte() -> u64 {
    4
}

fn default_per_nonzero_byte() -> u64 {
    68
}

/// Compute the mandatory minimum gas for a transaction payload and
/// destination. Total over all byte strings; never fails.
pub fn intrinsic_gas(schedule: &GasSchedule, to: &TxDestination, payload: &[u8]) -> u64 {
    let zero_count = payload.iter().filter(|byte| **byte == 0).count() as u64;
    let nonzero_count = payload.len() as u64 - zero_count;
    let create_cost = if to.is_create() {
        schedule.create_surcharge
    } else {
        0
    };
    schedule.base_tx
        + zero_count * schedule.per_zero_byte
        + nonzero_count * schedule.per_nonzero_byte
        + create_cost
}
