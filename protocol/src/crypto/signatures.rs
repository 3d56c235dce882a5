//! # Digital Signatures
//!
//! Free-function Ed25519 signing and verification over raw bytes.
//!
//! Callers that work with protocol objects should use the transaction,
//! multisig and logic-signature APIs, which add the right domain prefix.
//! These functions add nothing: what you pass is what gets signed.
//!
//! ## Strictness
//!
//! `verify_raw` uses `ed25519-dalek`'s default verification. Small-order
//! public keys such as the all-zero point are rejected before the
//! signature is even looked at.

use ed25519_dalek::{Signature as DalekSignature, Verifier, VerifyingKey};
use thiserror::Error;

use super::keys::{Account, PublicKey, Signature};
use crate::address::Address;
use crate::config::{BYTES_PREFIX, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// Errors during signature operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid signature bytes: expected 64 bytes, got {got}")]
    InvalidSignatureBytes { got: usize },

    #[error("invalid public key")]
    InvalidPublicKey,
}

/// Sign a message with an account.
///
/// Ed25519 is deterministic (RFC 8032): the same key and message always
/// give the same signature.
///
/// # Example
///
/// ```
/// use ledger_protocol::crypto::{sign, verify, Account};
///
/// let account = Account::generate();
/// let message = b"send 100 units to alice";
/// let signature = sign(&account, message);
///
/// assert!(verify(&account.public_key(), message, &signature));
/// ```
pub fn sign(account: &Account, message: &[u8]) -> Signature {
    account.sign(message)
}

/// Verify a signature against a public key and message.
///
/// We don't distinguish between "invalid signature" and "wrong public key".
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    public_key.verify(message, signature)
}

/// Verify a signature from raw wire bytes.
pub fn verify_raw(
    public_key_bytes: &[u8; PUBLIC_KEY_LENGTH],
    message: &[u8],
    signature_bytes: &[u8; SIGNATURE_LENGTH],
) -> Result<(), SignatureError> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key_bytes).map_err(|_| SignatureError::InvalidPublicKey)?;

    let signature = DalekSignature::from_bytes(signature_bytes);

    verifying_key
        .verify(message, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

/// Verify a signature produced by [`Account::sign_bytes`].
///
/// The `MX` prefix is added here; pass the same `data` the signer passed.
pub fn verify_bytes(address: &Address, data: &[u8], signature: &Signature) -> bool {
    let mut message = Vec::with_capacity(BYTES_PREFIX.len() + data.len());
    message.extend_from_slice(BYTES_PREFIX);
    message.extend_from_slice(data);
    PublicKey::from(*address).verify(&message, signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let account = Account::generate();
        let msg = b"hello, world";
        let sig = sign(&account, msg);
        assert!(verify(&account.public_key(), msg, &sig));
    }

    #[test]
    fn test_deterministic_signatures() {
        let account = Account::from_seed(&[9u8; 32]);
        let msg = b"determinism is underrated";
        assert_eq!(sign(&account, msg), sign(&account, msg));
    }

    #[test]
    fn test_verify_raw_roundtrip() {
        let account = Account::generate();
        let msg = b"bytes off the wire";
        let sig = sign(&account, msg);
        assert!(verify_raw(account.public_key().as_bytes(), msg, sig.as_bytes()).is_ok());
        assert_eq!(
            verify_raw(account.public_key().as_bytes(), b"tampered", sig.as_bytes()),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn test_verify_raw_with_invalid_pubkey() {
        // The all-zero key is a small-order point.
        let bad_pk = [0u8; 32];
        let sig = [0u8; 64];
        assert!(verify_raw(&bad_pk, b"doesn't matter", &sig).is_err());
    }

    #[test]
    fn test_empty_message() {
        let account = Account::generate();
        let sig = sign(&account, b"");
        assert!(verify(&account.public_key(), b"", &sig));
    }

    #[test]
    fn verify_bytes_matches_sign_bytes() {
        let account = Account::generate();
        let sig = account.sign_bytes(b"login nonce 42");
        assert!(verify_bytes(&account.address(), b"login nonce 42", &sig));
        assert!(!verify_bytes(&account.address(), b"login nonce 43", &sig));

        // A raw signature over the same data is not accepted.
        let raw = account.sign(b"login nonce 42");
        assert!(!verify_bytes(&account.address(), b"login nonce 42", &raw));
    }
}
