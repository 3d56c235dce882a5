//! # Multisig
//!
//! Threshold (k-of-n) authorization over an ordered set of Ed25519 keys.
//!
//! A [`MultisigAddress`] is the tuple `(version, threshold, keys)`. Its
//! address is
//!
//! ```text
//! sha512_256("MultisigAddr" ‖ version ‖ threshold ‖ key_0 ‖ … ‖ key_n-1)
//! ```
//!
//! so key *order* matters: the same keys in another order form another
//! account.
//!
//! A [`MultiSignature`] has one subsig slot per key, in the same order.
//! Signers fill their own slot, and partial signatures are combined with
//! [`merge`]. Merging never overwrites a signature with a different one,
//! and either succeeds completely or leaves nothing changed.

use thiserror::Error;
use tracing::{debug, warn};

use crate::address::Address;
use crate::config::{MULTISIG_PREFIX, MULTISIG_VERSION, PUBLIC_KEY_LENGTH};
use crate::crypto::hash::sha512_256_multi;
use crate::crypto::{Account, PublicKey, Signature};
use crate::encoding::value::value_into_map;
use crate::encoding::{CodecError, FieldMap, Value};
use crate::transaction::{Authorization, RawTransaction, SignedTransaction};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MultisigError {
    #[error("unsupported multisig version {0}")]
    InvalidVersion(u8),

    #[error("threshold {threshold} is invalid for {keys} keys")]
    InvalidThreshold { threshold: u8, keys: usize },

    #[error("transaction sender {sender} is not the multisig address {expected}")]
    SenderMismatch { sender: Address, expected: Address },

    #[error("signing key is not part of the multisig")]
    KeyNotInSet,

    #[error("multisig version, threshold or key order differ")]
    IncompatibleMultisig,

    #[error("subsig {index} already holds a different signature")]
    ConflictingSignature { index: usize },

    #[error("merge needs at least two signed transactions, got {0}")]
    NotEnoughTransactions(usize),

    #[error("signed transactions wrap different transactions")]
    TransactionMismatch,

    #[error("signed transaction is not multisig-authorized")]
    NotMultisig,

    #[error("multisig derives address {derived}, expected {expected}")]
    AddressMismatch { derived: Address, expected: Address },

    #[error("subsig {index} signature does not verify")]
    InvalidSignature { index: usize },

    #[error("{have} of {need} required signatures present")]
    InsufficientSignatures { have: usize, need: usize },
}

// ---------------------------------------------------------------------------
// MultisigAddress
// ---------------------------------------------------------------------------

/// The ordered key set and threshold defining a multisig account.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MultisigAddress {
    version: u8,
    threshold: u8,
    public_keys: Vec<PublicKey>,
}

impl MultisigAddress {
    /// Define a multisig account. Version must be 1 and the threshold
    /// between 1 and the number of keys.
    ///
    /// # Example
    ///
    /// ```
    /// use ledger_protocol::crypto::Account;
    /// use ledger_protocol::multisig::MultisigAddress;
    ///
    /// let keys: Vec<_> = (0..3).map(|_| Account::generate().public_key()).collect();
    /// let msa = MultisigAddress::new(1, 2, keys).unwrap();
    /// assert_eq!(msa.address().to_string().len(), 58);
    /// ```
    pub fn new(
        version: u8,
        threshold: u8,
        public_keys: Vec<PublicKey>,
    ) -> Result<Self, MultisigError> {
        if version != MULTISIG_VERSION {
            return Err(MultisigError::InvalidVersion(version));
        }
        if threshold == 0 || usize::from(threshold) > public_keys.len() {
            return Err(MultisigError::InvalidThreshold {
                threshold,
                keys: public_keys.len(),
            });
        }
        Ok(Self {
            version,
            threshold,
            public_keys,
        })
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn public_keys(&self) -> &[PublicKey] {
        &self.public_keys
    }

    /// The account address derived from version, threshold and key order.
    pub fn address(&self) -> Address {
        let header = [self.version, self.threshold];
        let mut parts: Vec<&[u8]> = Vec::with_capacity(self.public_keys.len() + 2);
        parts.push(MULTISIG_PREFIX);
        parts.push(&header);
        parts.extend(self.public_keys.iter().map(|pk| pk.as_bytes().as_slice()));
        Address::new(sha512_256_multi(&parts))
    }

    /// A multisig with every slot present and unsigned.
    pub fn empty_signature(&self) -> MultiSignature {
        MultiSignature {
            version: self.version,
            threshold: self.threshold,
            subsigs: self
                .public_keys
                .iter()
                .map(|pk| Subsignature {
                    public_key: *pk,
                    signature: None,
                })
                .collect(),
        }
    }

    /// Sign `message` with `account`, filling its slot in a fresh multisig.
    pub(crate) fn sign_message(
        &self,
        account: &Account,
        message: &[u8],
    ) -> Result<MultiSignature, MultisigError> {
        let public_key = account.public_key();
        let index = self
            .public_keys
            .iter()
            .position(|pk| *pk == public_key)
            .ok_or(MultisigError::KeyNotInSet)?;
        let mut msig = self.empty_signature();
        msig.subsigs[index].signature = Some(account.sign(message));
        Ok(msig)
    }

    /// Start a multisig authorization for `tx` with one signer.
    ///
    /// The transaction's sender must be this multisig account.
    pub fn sign_transaction(
        &self,
        tx: &RawTransaction,
        account: &Account,
    ) -> Result<SignedTransaction, MultisigError> {
        let expected = self.address();
        if tx.header.sender != expected {
            return Err(MultisigError::SenderMismatch {
                sender: tx.header.sender,
                expected,
            });
        }
        let msig = self.sign_message(account, &tx.bytes_to_sign())?;
        debug!(tx_id = %tx.id(), multisig = %expected, "added multisig subsignature");
        Ok(SignedTransaction::multi(tx.clone(), msig, None))
    }

    /// Sign the transaction inside `partial` with `account` and merge the
    /// new subsig into it.
    pub fn append(
        &self,
        partial: &SignedTransaction,
        account: &Account,
    ) -> Result<SignedTransaction, MultisigError> {
        let mut fresh = self.sign_transaction(&partial.txn, account)?;
        fresh.auth_addr = partial.auth_addr;
        merge(&[partial.clone(), fresh])
    }
}

impl From<&MultiSignature> for MultisigAddress {
    fn from(msig: &MultiSignature) -> Self {
        Self {
            version: msig.version,
            threshold: msig.threshold,
            public_keys: msig.subsigs.iter().map(|s| s.public_key).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// MultiSignature
// ---------------------------------------------------------------------------

/// One slot of a multisig: a key and, once it has signed, its signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subsignature {
    pub public_key: PublicKey,
    pub signature: Option<Signature>,
}

/// Partial or complete threshold signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSignature {
    pub version: u8,
    pub threshold: u8,
    pub subsigs: Vec<Subsignature>,
}

impl MultiSignature {
    /// The address these subsig keys derive.
    pub fn address(&self) -> Address {
        MultisigAddress::from(self).address()
    }

    /// Number of filled slots.
    pub fn signature_count(&self) -> usize {
        self.subsigs.iter().filter(|s| s.signature.is_some()).count()
    }

    fn compatible_with(&self, other: &Self) -> bool {
        self.version == other.version
            && self.threshold == other.threshold
            && self.subsigs.len() == other.subsigs.len()
            && self
                .subsigs
                .iter()
                .zip(&other.subsigs)
                .all(|(a, b)| a.public_key == b.public_key)
    }

    /// Fold `other`'s signatures into a copy of `self`.
    ///
    /// Works on a copy so a conflict in a late slot leaves `self` untouched.
    pub fn merged_with(&self, other: &Self) -> Result<Self, MultisigError> {
        if !self.compatible_with(other) {
            return Err(MultisigError::IncompatibleMultisig);
        }
        let mut merged = self.clone();
        for (index, (slot, incoming)) in merged.subsigs.iter_mut().zip(&other.subsigs).enumerate() {
            match (slot.signature, incoming.signature) {
                (None, Some(sig)) => slot.signature = Some(sig),
                (Some(have), Some(sig)) if have != sig => {
                    return Err(MultisigError::ConflictingSignature { index });
                }
                _ => {}
            }
        }
        Ok(merged)
    }

    /// Verify this multisig over `message` for `address`.
    ///
    /// The keys must derive `address`, at least `threshold` slots must be
    /// signed and every signed slot must verify.
    pub fn verify(&self, message: &[u8], address: &Address) -> Result<(), MultisigError> {
        if self.version != MULTISIG_VERSION {
            return Err(MultisigError::InvalidVersion(self.version));
        }
        if self.threshold == 0 || usize::from(self.threshold) > self.subsigs.len() {
            return Err(MultisigError::InvalidThreshold {
                threshold: self.threshold,
                keys: self.subsigs.len(),
            });
        }
        let derived = self.address();
        if derived != *address {
            return Err(MultisigError::AddressMismatch {
                derived,
                expected: *address,
            });
        }
        let have = self.signature_count();
        let need = usize::from(self.threshold);
        if have < need {
            return Err(MultisigError::InsufficientSignatures { have, need });
        }
        for (index, sub) in self.subsigs.iter().enumerate() {
            if let Some(sig) = &sub.signature {
                if !sub.public_key.verify(message, sig) {
                    return Err(MultisigError::InvalidSignature { index });
                }
            }
        }
        Ok(())
    }

    pub fn to_fields(&self) -> FieldMap {
        let subsigs: Vec<Value> = self
            .subsigs
            .iter()
            .map(|sub| {
                Value::Map(
                    FieldMap::new()
                        .with("pk", *sub.public_key.as_bytes())
                        .with("s", sub.signature.map(|s| *s.as_bytes())),
                )
            })
            .collect();
        FieldMap::new()
            .with("subsig", subsigs)
            .with("thr", self.threshold)
            .with("v", self.version)
    }

    pub fn from_fields(mut fields: FieldMap) -> Result<Self, CodecError> {
        let subsigs = fields
            .take_array("subsig")?
            .into_iter()
            .map(|value| {
                let mut sub = value_into_map("subsig", value)?;
                let public_key = PublicKey::from_bytes(sub.take_fixed::<PUBLIC_KEY_LENGTH>("pk")?);
                let signature = sub.take_optional_fixed::<64>("s")?.map(Signature::from_bytes);
                sub.finish()?;
                Ok(Subsignature {
                    public_key,
                    signature,
                })
            })
            .collect::<Result<Vec<_>, CodecError>>()?;
        let msig = Self {
            version: fields.take_u8("v")?,
            threshold: fields.take_u8("thr")?,
            subsigs,
        };
        fields.finish()?;
        Ok(msig)
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Combine partially signed copies of the same multisig transaction.
///
/// Needs at least two inputs wrapping the same transaction, each
/// multisig-authorized by the same `(version, threshold, keys)`. Slots are
/// filled from whichever input has a signature; two different signatures
/// for one slot are a conflict. The result does not depend on input order.
///
/// # Example
///
/// ```
/// use ledger_protocol::crypto::Account;
/// use ledger_protocol::multisig::{merge, MultisigAddress};
/// use ledger_protocol::transaction::TransactionBuilder;
///
/// let signers: Vec<Account> = (0..3).map(|_| Account::generate()).collect();
/// let keys = signers.iter().map(Account::public_key).collect();
/// let msa = MultisigAddress::new(1, 2, keys).unwrap();
/// let tx = TransactionBuilder::payment(signers[0].address(), 10)
///     .sender(msa.address())
///     .first_valid(1)
///     .genesis_hash([1u8; 32])
///     .build()
///     .unwrap();
///
/// let a = msa.sign_transaction(&tx, &signers[0]).unwrap();
/// let b = msa.sign_transaction(&tx, &signers[1]).unwrap();
/// let merged = merge(&[a, b]).unwrap();
/// assert!(merged.verify().is_ok());
/// ```
pub fn merge(transactions: &[SignedTransaction]) -> Result<SignedTransaction, MultisigError> {
    let (first, rest) = match transactions {
        [first, rest @ ..] if !rest.is_empty() => (first, rest),
        _ => return Err(MultisigError::NotEnoughTransactions(transactions.len())),
    };
    let mut merged = first
        .auth
        .as_multisig()
        .cloned()
        .ok_or(MultisigError::NotMultisig)?;

    for stx in rest {
        if stx.txn != first.txn || stx.auth_addr != first.auth_addr {
            warn!(tx_id = %first.id(), "refusing to merge different transactions");
            return Err(MultisigError::TransactionMismatch);
        }
        let msig = stx.auth.as_multisig().ok_or(MultisigError::NotMultisig)?;
        merged = merged.merged_with(msig).map_err(|e| {
            warn!(tx_id = %first.id(), error = %e, "multisig merge rejected");
            e
        })?;
    }

    debug!(
        tx_id = %first.id(),
        inputs = transactions.len(),
        signatures = merged.signature_count(),
        "merged multisig"
    );
    Ok(SignedTransaction {
        txn: first.txn.clone(),
        auth: Authorization::Multi(merged),
        auth_addr: first.auth_addr,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
