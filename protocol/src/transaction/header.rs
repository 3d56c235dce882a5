//! The header every transaction variant shares, and the network
//! parameters builders fill it from.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::config::DIGEST_LENGTH;
use crate::encoding::{CodecError, FieldMap};

/// Fields common to all transaction types.
///
/// A header is plain data. The builders enforce what must be set; decoding
/// accepts whatever the bytes say.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    /// Account paying the fee and, for most types, the funds.
    pub sender: Address,
    /// Fee in microunits.
    pub fee: u64,
    /// First round the transaction may be confirmed in.
    pub first_valid: u64,
    /// Last round the transaction may be confirmed in.
    pub last_valid: u64,
    /// Human-readable network identifier, e.g. `"mainnet-v1.0"`.
    pub genesis_id: String,
    /// Hash of the network's genesis block. All zeros means unset.
    pub genesis_hash: [u8; DIGEST_LENGTH],
    /// Arbitrary data, at most 1000 bytes.
    pub note: Vec<u8>,
    /// While this transaction is valid, no other transaction from the
    /// same sender with the same lease can be confirmed.
    pub lease: Option<[u8; DIGEST_LENGTH]>,
    /// Atomic group id. Set only by [`crate::group::assign_group_id`].
    pub group: Option<[u8; DIGEST_LENGTH]>,
    /// Hands signing authority for `sender` to another address.
    pub rekey_to: Option<Address>,
}

impl Header {
    pub(crate) fn write_fields(&self, fields: &mut FieldMap) {
        fields
            .insert("fee", self.fee)
            .insert("fv", self.first_valid)
            .insert("gen", self.genesis_id.as_str())
            .insert("gh", self.genesis_hash)
            .insert("grp", self.group)
            .insert("lv", self.last_valid)
            .insert("lx", self.lease)
            .insert("note", self.note.as_slice())
            .insert("rekey", self.rekey_to)
            .insert("snd", self.sender);
    }

    pub(crate) fn read_fields(fields: &mut FieldMap) -> Result<Self, CodecError> {
        Ok(Self {
            sender: Address::new(fields.take_fixed("snd")?),
            fee: fields.take_u64("fee")?,
            first_valid: fields.take_u64("fv")?,
            last_valid: fields.take_u64("lv")?,
            genesis_id: fields.take_string("gen")?,
            genesis_hash: fields.take_fixed("gh")?,
            note: fields.take_bytes("note")?,
            lease: fields.take_optional_fixed("lx")?,
            group: fields.take_optional_fixed("grp")?,
            rekey_to: fields.take_optional_fixed("rekey")?.map(Address::new),
        })
    }
}

/// Network parameters for a new transaction, as a node suggests them.
///
/// `fee` is a per-byte rate unless `flat_fee` is set, in which case it is
/// the whole fee.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuggestedParams {
    pub fee: u64,
    pub flat_fee: bool,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; DIGEST_LENGTH],
}
