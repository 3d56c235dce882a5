//! Single-key transaction signing.
//!
//! Signing is a separate step from building because the key may not be
//! available at construction time (hardware wallet, remote signer). The
//! signed message is always [`RawTransaction::bytes_to_sign`].

use tracing::debug;

use super::raw::RawTransaction;
use super::signed::SignedTransaction;
use crate::address::Address;
use crate::crypto::{Account, PublicKey, Signature};

/// Sign a transaction with one key.
///
/// If the account is not the sender (the sender was rekeyed to it), the
/// envelope records the account's address as `auth_addr`. The transaction
/// is not re-validated: it was validated when it was built.
///
/// # Example
///
/// ```
/// use ledger_protocol::crypto::Account;
/// use ledger_protocol::transaction::{sign_transaction, verify_signature, TransactionBuilder};
///
/// let account = Account::generate();
/// let tx = TransactionBuilder::payment(account.address(), 5_000)
///     .sender(account.address())
///     .first_valid(1)
///     .genesis_hash([1u8; 32])
///     .build()
///     .unwrap();
///
/// let signed = sign_transaction(&tx, &account);
/// # use ledger_protocol::transaction::Authorization;
/// # let Authorization::Single(sig) = signed.auth else { unreachable!() };
/// assert!(verify_signature(&tx, &sig, &account.address()));
/// ```
pub fn sign_transaction(tx: &RawTransaction, account: &Account) -> SignedTransaction {
    let signature = account.sign(&tx.bytes_to_sign());
    let signer = account.address();
    let auth_addr = (signer != tx.header.sender).then_some(signer);
    debug!(
        tx_id = %tx.id(),
        tx_type = %tx.tx_type(),
        rekeyed = auth_addr.is_some(),
        "signed transaction"
    );
    SignedTransaction::single(tx.clone(), signature, auth_addr)
}

/// Check a single-key signature over `tx` by `address`.
pub fn verify_signature(tx: &RawTransaction, signature: &Signature, address: &Address) -> bool {
    PublicKey::from(*address).verify(&tx.bytes_to_sign(), signature)
}

impl RawTransaction {
    /// Shorthand for [`sign_transaction`].
    pub fn sign(&self, account: &Account) -> SignedTransaction {
        sign_transaction(self, account)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::header::Header;
    use crate::transaction::raw::{Payment, TxBody};
    use crate::transaction::signed::Authorization;

    fn payment_from(sender: Address) -> RawTransaction {
        RawTransaction::new(
            Header {
                sender,
                fee: 1000,
                first_valid: 100,
                last_valid: 1100,
                genesis_hash: [8u8; 32],
                ..Default::default()
            },
            TxBody::Payment(Payment {
                receiver: Address::new([2u8; 32]),
                amount: 500,
                close_remainder_to: None,
            }),
        )
    }

    fn single(stx: &SignedTransaction) -> Signature {
        match &stx.auth {
            Authorization::Single(sig) => *sig,
            other => panic!("expected single signature, got {other:?}"),
        }
    }

    #[test]
    fn sign_then_verify() {
        let account = Account::generate();
        let tx = payment_from(account.address());
        let stx = sign_transaction(&tx, &account);
        assert!(verify_signature(&tx, &single(&stx), &account.address()));
        assert_eq!(stx.auth_addr, None);
    }

    #[test]
    fn signing_does_not_change_id() {
        let account = Account::generate();
        let tx = payment_from(account.address());
        let id_before = tx.id();
        let stx = tx.sign(&account);
        assert_eq!(stx.id(), id_before);
    }

    #[test]
    fn rekeyed_signer_is_recorded() {
        let original = Account::generate();
        let new_key = Account::generate();
        let tx = payment_from(original.address());
        let stx = sign_transaction(&tx, &new_key);
        assert_eq!(stx.auth_addr, Some(new_key.address()));
        assert!(verify_signature(&tx, &single(&stx), &new_key.address()));
        assert!(!verify_signature(&tx, &single(&stx), &original.address()));
    }

    #[test]
    fn tampered_transaction_fails_verification() {
        let account = Account::generate();
        let tx = payment_from(account.address());
        let sig = single(&sign_transaction(&tx, &account));
        let mut tampered = tx.clone();
        tampered.header.fee += 1;
        assert!(!verify_signature(&tampered, &sig, &account.address()));
    }

    #[test]
    fn signature_covers_the_tx_prefix() {
        let account = Account::generate();
        let tx = payment_from(account.address());
        let sig = single(&sign_transaction(&tx, &account));
        // The bare canonical bytes were not what got signed.
        assert!(!account.public_key().verify(&tx.canonical_bytes(), &sig));
    }
}
