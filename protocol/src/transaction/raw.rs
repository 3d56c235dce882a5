//! The unsigned transaction and its identity.
//!
//! A [`RawTransaction`] is a [`Header`] plus one [`TxBody`] variant. Its
//! identity is derived from its canonical bytes:
//!
//! ```text
//! canonical = msgpack(fields)          sorted keys, zeros omitted
//! signed    = "TX" ‖ canonical         what Ed25519 signs
//! raw id    = sha512_256(signed)       what groups hash over
//! id        = base32(raw id)           what humans see
//! ```

use super::header::Header;
use super::types::{AssetParams, OnCompletion, StateSchema, TxType};
use crate::address::Address;
use crate::config::{DIGEST_LENGTH, STATE_PROOF_KEY_LENGTH, TX_PREFIX};
use crate::crypto::hash::sha512_256_multi;
use crate::crypto::Account;
use crate::encoding::{self, base32, CodecError};

// ---------------------------------------------------------------------------
// Variant bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payment {
    pub receiver: Address,
    pub amount: u64,
    /// Close the sender's account and send the remaining balance here.
    pub close_remainder_to: Option<Address>,
}

/// Participation key registration. All keys absent and `non_participation`
/// false takes the account offline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyRegistration {
    pub vote_pk: Option<[u8; 32]>,
    pub selection_pk: Option<[u8; 32]>,
    pub state_proof_pk: Option<[u8; STATE_PROOF_KEY_LENGTH]>,
    pub vote_first: u64,
    pub vote_last: u64,
    pub vote_key_dilution: u64,
    /// Marks the account as never participating again.
    pub non_participation: bool,
}

/// Asset creation (`asset_id == 0`, params set), reconfiguration (both set)
/// or destruction (id set, no params).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetConfig {
    pub asset_id: u64,
    pub params: Option<AssetParams>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetTransfer {
    pub asset_id: u64,
    pub amount: u64,
    pub receiver: Address,
    /// The account units are revoked from. Set only by the clawback account.
    pub revocation_target: Option<Address>,
    /// Close the sender's holding and send the remainder here.
    pub close_to: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetFreeze {
    pub asset_id: u64,
    pub account: Address,
    pub frozen: bool,
}

/// Application create (`app_id == 0`), update (`UpdateApplication` with new
/// programs) or a plain call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplicationCall {
    pub app_id: u64,
    pub on_complete: OnCompletion,
    pub args: Vec<Vec<u8>>,
    pub accounts: Vec<Address>,
    pub foreign_apps: Vec<u64>,
    pub foreign_assets: Vec<u64>,
    pub approval_program: Vec<u8>,
    pub clear_program: Vec<u8>,
    pub global_schema: StateSchema,
    pub local_schema: StateSchema,
    pub extra_pages: u32,
}

/// The type-specific part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxBody {
    Payment(Payment),
    KeyRegistration(KeyRegistration),
    AssetConfig(AssetConfig),
    AssetTransfer(AssetTransfer),
    AssetFreeze(AssetFreeze),
    ApplicationCall(ApplicationCall),
}

impl TxBody {
    pub fn tx_type(&self) -> TxType {
        match self {
            Self::Payment(_) => TxType::Payment,
            Self::KeyRegistration(_) => TxType::KeyRegistration,
            Self::AssetConfig(_) => TxType::AssetConfig,
            Self::AssetTransfer(_) => TxType::AssetTransfer,
            Self::AssetFreeze(_) => TxType::AssetFreeze,
            Self::ApplicationCall(_) => TxType::ApplicationCall,
        }
    }
}

// ---------------------------------------------------------------------------
// RawTransaction
// ---------------------------------------------------------------------------

/// An unsigned transaction.
///
/// Built by [`super::TransactionBuilder`], stamped with a group id by
/// [`crate::group::assign_group_id`], and consumed by signing. Nothing else
/// mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    pub header: Header,
    pub body: TxBody,
}

impl RawTransaction {
    pub fn new(header: Header, body: TxBody) -> Self {
        Self { header, body }
    }

    pub fn tx_type(&self) -> TxType {
        self.body.tx_type()
    }

    pub fn sender(&self) -> &Address {
        &self.header.sender
    }

    /// The canonical msgpack encoding.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        encoding::encode_map(&self.to_fields())
    }

    /// `"TX" ‖ canonical_bytes`. Signatures and ids are computed over this.
    pub fn bytes_to_sign(&self) -> Vec<u8> {
        let canonical = self.canonical_bytes();
        let mut out = Vec::with_capacity(TX_PREFIX.len() + canonical.len());
        out.extend_from_slice(TX_PREFIX);
        out.extend_from_slice(&canonical);
        out
    }

    /// The 32-byte transaction id.
    pub fn raw_id(&self) -> [u8; DIGEST_LENGTH] {
        sha512_256_multi(&[TX_PREFIX, &self.canonical_bytes()])
    }

    /// The transaction id as unpadded base32, with no checksum.
    pub fn id(&self) -> String {
        base32::encode(&self.raw_id())
    }

    /// Decode canonical bytes. Unknown fields are rejected.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::from_fields(encoding::decode_map(bytes)?)
    }

    /// Length of this transaction once signed by a single key.
    ///
    /// Signs a copy with a throwaway key: the signature is always 64 bytes,
    /// so the length is exact for single-key signing. An `auth_addr` would
    /// appear only when the real signer differs from the sender, and the
    /// throwaway key never equals the sender, so the estimate measures the
    /// envelope without it.
    pub fn estimate_size(&self) -> usize {
        let throwaway = Account::generate();
        let signature = throwaway.sign(&self.bytes_to_sign());
        super::SignedTransaction::single(self.clone(), signature, None)
            .encode()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_payment() -> RawTransaction {
        RawTransaction::new(
            Header {
                sender: "DPLD3RTSWC5STVBPZL5DIIVE2OC4BSAWTOYBLFN2X6EFLT2ZNF4SMX64UA"
                    .parse()
                    .unwrap(),
                fee: 1000,
                first_valid: 106_575,
                last_valid: 107_575,
                ..Default::default()
            },
            TxBody::Payment(Payment {
                receiver: "PU7ZTZJ5GSXET2ZPIWDWDT2TQQEP7WXOGXDQ3ARUCZW6PK7D4ULSE6NYCE"
                    .parse()
                    .unwrap(),
                amount: 1234,
                close_remainder_to: None,
            }),
        )
    }

    #[test]
    fn fixture_transaction_id() {
        let tx = fixture_payment();
        assert_eq!(tx.id(), "BXSNCHKYEXB4AQXFRROUJGZ4ZWD7WL2F5D27YUPFR7ONDK5TMN5Q");
        assert_eq!(tx.id().len(), 52);
    }

    #[test]
    fn bytes_to_sign_has_tx_prefix() {
        let tx = fixture_payment();
        let signed = tx.bytes_to_sign();
        assert_eq!(&signed[..2], b"TX");
        assert_eq!(&signed[2..], tx.canonical_bytes().as_slice());
    }

    #[test]
    fn zero_amount_is_omitted() {
        let mut tx = fixture_payment();
        if let TxBody::Payment(p) = &mut tx.body {
            p.amount = 0;
        }
        assert!(!tx.to_fields().contains_key("amt"));
        // "amt" as a msgpack fixstr.
        let needle = [0xa3, b'a', b'm', b't'];
        assert!(!tx
            .canonical_bytes()
            .windows(needle.len())
            .any(|w| w == needle));
    }

    #[test]
    fn decode_inverts_canonical_bytes() {
        let tx = fixture_payment();
        assert_eq!(RawTransaction::decode(&tx.canonical_bytes()).unwrap(), tx);
    }

    #[test]
    fn id_changes_with_any_field() {
        let a = fixture_payment();
        let mut b = a.clone();
        b.header.note = b"x".to_vec();
        assert_ne!(a.raw_id(), b.raw_id());
    }

    #[test]
    fn estimate_matches_a_real_single_signature() {
        let tx = fixture_payment();
        let account = Account::generate();
        let signature = account.sign(&tx.bytes_to_sign());
        let real = super::super::SignedTransaction::single(tx.clone(), signature, None);
        assert_eq!(tx.estimate_size(), real.encode().len());
    }
}
