//! Whole-envelope verification.
//!
//! [`verify_signed_transaction`] answers one question: does this envelope
//! carry valid authority for the address it claims? That address is the
//! `auth_addr` when present, otherwise the sender. Ledger-state checks
//! (balances, rekey records, round windows) are the network's business.

use thiserror::Error;
use tracing::debug;

use super::signed::{Authorization, SignedTransaction};
use crate::address::Address;
use crate::crypto::PublicKey;
use crate::logic::LogicSigError;
use crate::multisig::MultisigError;

/// Why an envelope failed verification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("signature does not verify against {authorizer}")]
    InvalidSignature { authorizer: Address },

    #[error("multisig authorization failed: {0}")]
    Multisig(#[from] MultisigError),

    #[error("logic signature authorization failed: {0}")]
    LogicSig(#[from] LogicSigError),
}

/// Check that `stx`'s authorization is valid for its authorizer.
///
/// Checks are ordered from cheapest to most expensive: address derivation
/// comes before any Ed25519 work.
pub fn verify_signed_transaction(stx: &SignedTransaction) -> Result<(), VerificationError> {
    let authorizer = stx.authorizer();
    match &stx.auth {
        Authorization::Single(signature) => {
            let message = stx.txn.bytes_to_sign();
            if !PublicKey::from(authorizer).verify(&message, signature) {
                return Err(VerificationError::InvalidSignature { authorizer });
            }
        }
        Authorization::Multi(msig) => {
            msig.verify(&stx.txn.bytes_to_sign(), &authorizer)?;
        }
        Authorization::Logic(lsig) => {
            lsig.verify(&authorizer)?;
        }
    }
    debug!(tx_id = %stx.id(), %authorizer, "verified envelope");
    Ok(())
}

impl SignedTransaction {
    /// Shorthand for [`verify_signed_transaction`].
    pub fn verify(&self) -> Result<(), VerificationError> {
        verify_signed_transaction(self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
