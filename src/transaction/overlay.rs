/// Read-through transaction overlays for dry-run simulation
///
/// An overlay resolves each field first against a caller-supplied
/// override set, falling back to the underlying transaction. It is used
/// to simulate an "as-if" transaction (e.g. a synthetic sender for gas
/// estimation) without mutating or requiring a fully signed original.
use crate::crypto::Address;
use crate::error::{ChainError, Result};

use super::types::{SignedTransaction, TxDestination, UnsignedTransaction};

/// Placeholder y-parity installed alongside a synthetic sender.
pub const PLACEHOLDER_Y_PARITY: u8 = 0;

/// Placeholder r component (the scalar 1) installed alongside a
/// synthetic sender, so signed-shaped code paths see a populated field.
pub const PLACEHOLDER_R: [u8; 32] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    1,
];

/// Placeholder s component, same scalar as [`PLACEHOLDER_R`].
pub const PLACEHOLDER_S: [u8; 32] = PLACEHOLDER_R;

/// Per-field overrides applied over a base transaction. Absent fields
/// fall through to the base.
#[derive(Debug, Default, Clone)]
pub struct TxOverrides {
    pub sender: Option<Address>,
    pub nonce: Option<u64>,
    pub to: Option<TxDestination>,
    pub value: Option<u128>,
    pub payload: Option<Vec<u8>>,
    pub y_parity: Option<u8>,
    pub r: Option<[u8; 32]>,
    pub s: Option<[u8; 32]>,
}

impl TxOverrides {
    /// Merge `new` over `self`; values in `new` win on collision.
    fn merged(&self, new: &TxOverrides) -> TxOverrides {
        TxOverrides {
            sender: new.sender.or(self.sender),
            nonce: new.nonce.or(self.nonce),
            to: new.to.clone().or_else(|| self.to.clone()),
            value: new.value.or(self.value),
            payload: new.payload.clone().or_else(|| self.payload.clone()),
            y_parity: new.y_parity.or(self.y_parity),
            r: new.r.or(self.r),
            s: new.s.or(self.s),
        }
    }
}

/// The transaction an overlay wraps: either an unsigned simulation
/// target, or a real signed transaction with an authoritative sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayTarget {
    Unsigned(UnsignedTransaction),
    Signed(SignedTransaction),
}

impl From<UnsignedTransaction> for OverlayTarget {
    fn from(tx: UnsignedTransaction) -> Self {
        OverlayTarget::Unsigned(tx)
    }
}

impl From<SignedTransaction> for OverlayTarget {
    fn from(tx: SignedTransaction) -> Self {
        OverlayTarget::Signed(tx)
    }
}

/// A read-through view over a base transaction with selected fields
/// overridden. The base is never mutated.
#[derive(Debug, Clone)]
pub struct TransactionOverlay {
    target: OverlayTarget,
    overrides: TxOverrides,
}

impl TransactionOverlay {
    /// Build an overlay over `target`.
    ///
    /// A sender override is permitted only for unsigned targets: a signed
    /// transaction's sender is signature-derived and authoritative, and
    /// an overlay must never mask it. When a synthetic sender is
    /// supplied, placeholder signature components are synthesized for any
    /// the caller did not set, so signed-shaped consumers find them
    /// populated.
    pub fn new(target: impl Into<OverlayTarget>, overrides: TxOverrides) -> Result<Self> {
        let target = target.into();
        let mut overrides = overrides;

        if overrides.sender.is_some() {
            if let OverlayTarget::Signed(_) = target {
                return Err(ChainError::Conflict(
                    "A sender can only be overridden when the target does not already have \
                     a signature-derived sender"
                        .to_string(),
                ));
            }
            overrides.y_parity.get_or_insert(PLACEHOLDER_Y_PARITY);
            overrides.r.get_or_insert(PLACEHOLDER_R);
            overrides.s.get_or_insert(PLACEHOLDER_S);
        }

        Ok(TransactionOverlay { target, overrides })
    }

    pub fn target(&self) -> &OverlayTarget {
        &self.target
    }

    pub fn nonce(&self) -> u64 {
        self.overrides.nonce.unwrap_or(match &self.target {
            OverlayTarget::Unsigned(tx) => tx.nonce,
            OverlayTarget::Signed(tx) => tx.nonce,
        })
    }

    pub fn to(&self) -> TxDestination {
        self.overrides.to.clone().unwrap_or_else(|| match &self.target {
            OverlayTarget::Unsigned(tx) => tx.to.clone(),
            OverlayTarget::Signed(tx) => tx.to.clone(),
        })
    }

    pub fn value(&self) -> u128 {
        self.overrides.value.unwrap_or(match &self.target {
            OverlayTarget::Unsigned(tx) => tx.value,
            OverlayTarget::Signed(tx) => tx.value,
        })
    }

    pub fn payload(&self) -> &[u8] {
        match &self.overrides.payload {
            Some(payload) => payload,
            None => match &self.target {
                OverlayTarget::Unsigned(tx) => &tx.payload,
                OverlayTarget::Signed(tx) => &tx.payload,
            },
        }
    }

    /// Resolve the sender: the override if present, otherwise the signed
    /// target's recovered sender. An unsigned target without an override
    /// has no sender to report.
    pub fn sender(&self) -> Result<Address> {
        if let Some(sender) = self.overrides.sender {
            return Ok(sender);
        }
        match &self.target {
            OverlayTarget::Signed(tx) => tx.sender(),
            OverlayTarget::Unsigned(_) => Err(ChainError::InvalidArgument(
                "Unsigned base transaction has no sender and no override was supplied".to_string(),
            )),
        }
    }

    pub fn y_parity(&self) -> Option<u8> {
        self.overrides.y_parity.or(match &self.target {
            OverlayTarget::Signed(tx) => Some(tx.y_parity),
            OverlayTarget::Unsigned(_) => None,
        })
    }

    pub fn r(&self) -> Option<[u8; 32]> {
        self.overrides.r.or(match &self.target {
            OverlayTarget::Signed(tx) => Some(tx.r),
            OverlayTarget::Unsigned(_) => None,
        })
    }

    pub fn s(&self) -> Option<[u8; 32]> {
        self.overrides.s.or(match &self.target {
            OverlayTarget::Signed(tx) => Some(tx.s),
            OverlayTarget::Unsigned(_) => None,
        })
    }

    /// Produce a new overlay over a copy of the base target, merging the
    /// existing overrides with `new_overrides` (new values win).
    pub fn copy(&self, new_overrides: TxOverrides) -> Result<TransactionOverlay> {
        TransactionOverlay::new(self.target.clone(), self.overrides.merged(&new_overrides))
    }
}
