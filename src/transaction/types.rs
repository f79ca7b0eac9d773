/// Transaction types for emberchain
use crate::crypto::{self, Address, KeyPair};
use crate::error::Result;
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};

/// Where a transaction's value and payload are directed: an existing
/// account, or the contract-creation sentinel.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TxDestination {
    Create,
    Call(Address),
}

impl TxDestination {
    pub fn is_create(&self) -> bool {
        matches!(self, TxDestination::Create)
    }
}

/// A transaction before signing. Carries everything the signing message
/// covers and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UnsignedTransaction {
    pub nonce: u64,
    pub to: TxDestination,
    pub value: u128,
    #[serde(with = "serde_bytes")]
    pub payload: Vec<u8>,
}

fn assemble_signing_message(
    nonce: u64,
    to: &TxDestination,
    value: u128,
    payload: &[u8],
) -> Vec<u8> {
    let mut message = Vec::new();
    message.extend_from_slice("EMBERTX:".as_bytes());
    message.extend_from_slice(&nonce.to_le_bytes());
    match to {
        TxDestination::Create => message.push(0x00),
        TxDestination::Call(address) => {
            message.push(0x01);
            message.extend_from_slice(address);
        }
    }
    message.extend_from_slice(&value.to_le_bytes());
    message.extend_from_slice(payload);
    message
}

impl UnsignedTransaction {
    pub fn new(nonce: u64, to: TxDestination, value: u128, payload: Vec<u8>) -> Self {
        UnsignedTransaction {
            nonce,
            to,
            value,
            payload,
        }
    }

    /// The exact byte string this transaction type signs over.
    pub fn signing_message(&self) -> Vec<u8> {
        assemble_signing_message(self.nonce, &self.to, self.value, &self.payload)
    }

    /// SHA-256 digest of the signing message.
    pub fn signing_digest(&self) -> [u8; 32] {
        Sha256::digest(self.signing_message()).into()
    }

    /// Sign with the given keypair, producing a signed transaction whose
    /// sender is recoverable from the signature alone.
    pub fn sign(&self, keypair: &KeyPair) -> Result<SignedTransaction> {
        let (y_parity, r, s) = keypair.sign_recoverable(&self.signing_digest())?;
        Ok(SignedTransaction {
            nonce: self.nonce,
            to: self.to.clone(),
            value: self.value,
            payload: self.payload.clone(),
            y_parity,
            r,
            s,
            sender: OnceCell::new(),
        })
    }
}

/// A signed transaction: the unsigned fields plus the (y_parity, r, s)
/// signature triple and a lazily recovered, cached sender address.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SignedTransaction {
    pub nonce: u64,
    pub to: TxDestination,
    pub value: u128,
    #[serde(with = "serde_bytes")]
    pub payload: Vec<u8>,
    pub y_parity: u8,
    pub r: [u8; 32],
    pub s: [u8; 32],
    // Recovery is an elliptic-curve operation and typically requested more
    // than once per transaction; the cell makes it at-most-once per instance.
    #[serde(skip)]
    sender: OnceCell<Address>,
}

impl SignedTransaction {
    pub fn new(
        nonce: u64,
        to: TxDestination,
        value: u128,
        payload: Vec<u8>,
        y_parity: u8,
        r: [u8; 32],
        s: [u8; 32],
    ) -> Self {
        SignedTransaction {
            nonce,
            to,
            value,
            payload,
            y_parity,
            r,
            s,
            sender: OnceCell::new(),
        }
    }

    /// The exact byte string this transaction type signs over.
    pub fn signing_message(&self) -> Vec<u8> {
        assemble_signing_message(self.nonce, &self.to, self.value, &self.payload)
    }

    /// SHA-256 digest of the signing message.
    pub fn signing_digest(&self) -> [u8; 32] {
        Sha256::digest(self.signing_message()).into()
    }

    /// The canonical address that produced this transaction's signature,
    /// recovered on first call and cached for the lifetime of this value.
    pub fn sender(&self) -> Result<Address> {
        self.sender
            .get_or_try_init(|| super::sender::recover_sender(self))
            .copied()
    }

    /// The unsigned fields of this transaction.
    pub fn as_unsigned(&self) -> UnsignedTransaction {
        UnsignedTransaction {
            nonce: self.nonce,
            to: self.to.clone(),
            value: self.value,
            payload: self.payload.clone(),
        }
    }

    pub fn hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.signing_message());
        hasher.update([self.y_parity]);
        hasher.update(self.r);
        hasher.update(self.s);
        hasher.finalize().into()
    }

    /// Signer address as hex, for display and logs.
    pub fn sender_hex(&self) -> Result<String> {
        Ok(crypto::address_to_hex(&self.sender()?))
    }
}

// The cached sender is derived state; equality is over the signed content.
impl PartialEq for SignedTransaction {
    fn eq(&self, other: &Self) -> bool {
        self.nonce == other.nonce
            && self.to == other.to
            && self.value == other.value
            && self.payload == other.payload
            && self.y_parity == other.y_parity
            && self.r == other.r
            && self.s == other.s
    }
}

impl Eq for SignedTransaction {}
