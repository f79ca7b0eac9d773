//! Cryptographic primitives for emberchain
//!
//! Wraps the secp256k1 signing and recovery machinery behind the small
//! surface the consensus rules need: keypairs, recoverable signatures in
//! (y_parity, r, s) form, canonical low-s enforcement, and the reduction
//! of a public key to its 20-byte address.

use crate::error::{ChainError, Result};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use secp256k1::{
    constants::{CURVE_ORDER, SECRET_KEY_SIZE},
    ecdsa::{RecoverableSignature, RecoveryId},
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use sha2::{Digest, Sha256};

/// A thread-safe, lazily initialized Secp256k1 context.
/// This prevents repeated, unnecessary context creation.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Size of a canonical address in bytes.
pub const ADDRESS_SIZE: usize = 20;

/// The canonical 20-byte address derived from a public key.
pub type Address = [u8; ADDRESS_SIZE];

/// The all-zero address. Never a valid recovery result.
pub const ZERO_ADDRESS: Address = [0u8; ADDRESS_SIZE];

/// Half the secp256k1 group order, big-endian. A signature whose `s`
/// exceeds this value is malleable and must be rejected as non-canonical.
const CURVE_ORDER_HALF: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b,
    0x20, 0xa0,
];

/// Convert an address to a hex string for display.
pub fn address_to_hex(addr: &Address) -> String {
    hex::encode(addr)
}

/// Convert a hex string to an address.
pub fn address_from_hex(hex_str: &str) -> Result<Address> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| ChainError::InvalidArgument(format!("Invalid hex address: {}", e)))?;
    if bytes.len() != ADDRESS_SIZE {
        return Err(ChainError::InvalidArgument(format!(
            "Address must be {} bytes, got {}",
            ADDRESS_SIZE,
            bytes.len()
        )));
    }
    bytes.try_into().map_err(|_| {
        ChainError::InvalidArgument("Failed to convert bytes into address".to_string())
    })
}

/// Reduce a public key to its canonical address: the trailing 20 bytes of
/// the SHA-256 digest of the 64-byte uncompressed point.
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    // Skip the 0x04 tag byte; only the point coordinates are hashed.
    let digest = Sha256::digest(&uncompressed[1..]);
    let mut address = ZERO_ADDRESS;
    address.copy_from_slice(&digest[digest.len() - ADDRESS_SIZE..]);
    address
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generates a new random KeyPair using the OS random number generator.
    pub fn generate() -> Result<Self> {
        let secret_key = SecretKey::new(&mut OsRng);
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);

        Ok(KeyPair {
            secret_key,
            public_key,
        })
    }

    /// Creates a KeyPair from an existing SecretKey.
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        KeyPair {
            secret_key,
            public_key,
        }
    }

    /// Creates a KeyPair from raw secret key bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|e| {
            if bytes.len() != SECRET_KEY_SIZE {
                ChainError::InvalidArgument(format!(
                    "Secret key must be {} bytes, got {}",
                    SECRET_KEY_SIZE,
                    bytes.len()
                ))
            } else {
                ChainError::InvalidArgument(format!("Invalid secret key bytes: {}", e))
            }
        })?;

        Ok(Self::from_secret_key(secret_key))
    }

    /// The canonical address of this keypair's public key.
    pub fn address(&self) -> Address {
        public_key_to_address(&self.public_key)
    }

    /// Signs a 32-byte digest, returning the recoverable signature as a
    /// (y_parity, r, s) triple. libsecp always emits low-s signatures, so
    /// the result is canonical by construction.
    pub fn sign_recoverable(&self, digest: &[u8; 32]) -> Result<(u8, [u8; 32], [u8; 32])> {
        let message = Message::from_digest_slice(digest)
            .map_err(|e| ChainError::InvalidArgument(format!("Failed to create message: {}", e)))?;

        let signature = SECP256K1_CONTEXT.sign_ecdsa_recoverable(&message, &self.secret_key);
        let (recovery_id, compact) = signature.serialize_compact();

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);
        Ok((recovery_id.to_i32() as u8, r, s))
    }
}

/// Check that a (r, s) pair is a canonical secp256k1 scalar pair:
/// both nonzero, both below the group order, and `s` in the low half.
pub fn check_signature_canonical(r: &[u8; 32], s: &[u8; 32]) -> Result<()> {
    if *r == [0u8; 32] {
        return Err(ChainError::InvalidSignature("r is zero".to_string()));
    }
    if *s == [0u8; 32] {
        return Err(ChainError::InvalidSignature("s is zero".to_string()));
    }
    // Big-endian fixed-width bytes compare like the integers they encode.
    if *r >= CURVE_ORDER {
        return Err(ChainError::InvalidSignature(
            "r exceeds the curve order".to_string(),
        ));
    }
    if *s >= CURVE_ORDER {
        return Err(ChainError::InvalidSignature(
            "s exceeds the curve order".to_string(),
        ));
    }
    if *s > CURVE_ORDER_HALF {
        return Err(ChainError::InvalidSignature(
            "s is in the upper half of the curve order".to_string(),
        ));
    }
    Ok(())
}

/// Recover the public key that produced a (y_parity, r, s) signature over
/// the given 32-byte digest. Fails with `InvalidSignature` for malformed
/// components or when recovery yields no valid curve point.
pub fn recover_public_key(
    digest: &[u8; 32],
    y_parity: u8,
    r: &[u8; 32],
    s: &[u8; 32],
) -> Result<PublicKey> {
    check_signature_canonical(r, s)?;

    if y_parity > 1 {
        return Err(ChainError::InvalidSignature(format!(
            "y_parity must be 0 or 1, got {}",
            y_parity
        )));
    }
    let recovery_id = RecoveryId::from_i32(i32::from(y_parity))
        .map_err(|e| ChainError::InvalidSignature(format!("Invalid recovery id: {}", e)))?;

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(r);
    compact[32..].copy_from_slice(s);
    let signature = RecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|e| ChainError::InvalidSignature(format!("Invalid signature bytes: {}", e)))?;

    let message = Message::from_digest_slice(digest)
        .map_err(|e| ChainError::InvalidSignature(format!("Failed to create message: {}", e)))?;

    SECP256K1_CONTEXT
        .recover_ecdsa(&message, &signature)
        .map_err(|_| ChainError::InvalidSignature("Public key recovery failed".to_string()))
}
