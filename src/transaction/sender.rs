/// Sender recovery separated from type definitions
use crate::crypto::{self, Address};
use crate::error::Result;
use tracing::trace;

use super::types::SignedTransaction;

/// Recover the canonical address that produced a signed transaction's
/// signature. Pure: identical inputs always yield identical output.
///
/// Builds the signature from the transaction's (y_parity, r, s) triple,
/// derives the signing-message digest the transaction type defines, and
/// reduces the recovered public key to its address. Fails with
/// `InvalidSignature` when r or s is zero, out of curve-order range, or
/// recovery yields no valid point; never returns a zero address.
pub fn recover_sender(transaction: &SignedTransaction) -> Result<Address> {
    let digest = transaction.signing_digest();
    let public_key = crypto::recover_public_key(
        &digest,
        transaction.y_parity,
        &transaction.r,
        &transaction.s,
    )?;
    let sender = crypto::public_key_to_address(&public_key);
    trace!(sender = %crypto::address_to_hex(&sender), "recovered transaction sender");
    Ok(sender)
}
