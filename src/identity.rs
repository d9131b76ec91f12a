//! Type-identity derivation and verification.
//!
//! A type identity binds a logical contract slot to the one transaction that
//! minted it: the canonical value is a domain-separated hash of the first
//! input's reference and the index of the output carrying the script. Both
//! fields are committed, so a transaction author cannot steer the derivation
//! toward a pre-agreed value after the fact.

use blake2b_ref::Blake2bBuilder;
use thiserror::Error as ThisError;

use crate::constants::IDENTITY_LEN;
use crate::tx::{TransactionView, TxError};

/// Personalization of the ledger's canonical short hash. Protocol constant;
/// the derivation must match the deployed ecosystem bit for bit.
const HASH_PERSONALIZATION: &[u8] = b"ckb-default-hash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeIdentity([u8; IDENTITY_LEN]);

impl TypeIdentity {
    pub const fn from_bytes(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }
}

impl From<[u8; IDENTITY_LEN]> for TypeIdentity {
    fn from(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }
}

#[derive(ThisError, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("script args end before the identity at offset {offset} ({available} bytes available)")]
    ArgsTooShort { offset: usize, available: usize },

    #[error("transaction structure unavailable: {0}")]
    TransactionDataUnavailable(#[from] TxError),

    #[error("type identity mismatch")]
    Mismatch,
}

/// Canonical identity minted by a transaction for one of its outputs.
pub fn derive(first_input_reference: &[u8], output_index: u64) -> TypeIdentity {
    let mut blake2b = Blake2bBuilder::new(IDENTITY_LEN)
        .personal(HASH_PERSONALIZATION)
        .build();
    blake2b.update(first_input_reference);
    blake2b.update(&output_index.to_le_bytes());
    let mut hash = [0u8; IDENTITY_LEN];
    blake2b.finalize(&mut hash);
    TypeIdentity(hash)
}

/// Recompute the canonical identity for the currently executing deployment.
pub fn canonical(tx: &impl TransactionView) -> Result<TypeIdentity, Error> {
    let first_input = tx.first_input_reference()?;
    let output_index = tx.script_output_index()?;
    Ok(derive(first_input, output_index))
}

/// Read the expected identity this deployment carries in its script args.
pub fn expected_from_args(
    tx: &impl TransactionView,
    arg_offset: usize,
) -> Result<TypeIdentity, Error> {
    let args = tx.script_args();
    let too_short = Error::ArgsTooShort {
        offset: arg_offset,
        available: args.len(),
    };
    let end = arg_offset
        .checked_add(IDENTITY_LEN)
        .filter(|end| *end <= args.len())
        .ok_or(too_short)?;

    let mut bytes = [0u8; IDENTITY_LEN];
    bytes.copy_from_slice(&args[arg_offset..end]);
    Ok(TypeIdentity(bytes))
}

/// Check that `candidate` is the one identity this transaction could mint.
///
/// Inequality is a deliberate, reportable failure: it is the check that keeps
/// a forged or duplicated deployment from impersonating the genuine occupant
/// of the slot.
pub fn verify(tx: &impl TransactionView, candidate: &TypeIdentity) -> Result<(), Error> {
    if canonical(tx)? != *candidate {
        return Err(Error::Mismatch);
    }
    Ok(())
}
