//! The signed envelope: one transaction plus exactly one authorization.
//!
//! Wire layout:
//!
//! ```text
//! { "lsig" | "msig" | "sig": <authorization>,
//!   "sgnr": <signer address, only when it differs from the sender>,
//!   "txn":  <transaction fields> }
//! ```

use super::raw::RawTransaction;
use crate::address::Address;
use crate::crypto::Signature;
use crate::encoding::{self, CodecError, FieldMap};
use crate::logic::LogicSig;
use crate::multisig::MultiSignature;

/// How a transaction is authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// One Ed25519 signature over the transaction.
    Single(Signature),
    /// Threshold signatures from an ordered key set.
    Multi(MultiSignature),
    /// A logic program, optionally delegated by a signature over it.
    Logic(LogicSig),
}

impl Authorization {
    pub fn as_multisig(&self) -> Option<&MultiSignature> {
        match self {
            Self::Multi(msig) => Some(msig),
            _ => None,
        }
    }
}

/// A transaction ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub txn: RawTransaction,
    pub auth: Authorization,
    /// The authorizing address when it is not the sender (rekeyed accounts).
    pub auth_addr: Option<Address>,
}

impl SignedTransaction {
    pub fn single(txn: RawTransaction, signature: Signature, auth_addr: Option<Address>) -> Self {
        Self {
            txn,
            auth: Authorization::Single(signature),
            auth_addr,
        }
    }

    pub fn multi(txn: RawTransaction, msig: MultiSignature, auth_addr: Option<Address>) -> Self {
        Self {
            txn,
            auth: Authorization::Multi(msig),
            auth_addr,
        }
    }

    pub fn logic(txn: RawTransaction, lsig: LogicSig, auth_addr: Option<Address>) -> Self {
        Self {
            txn,
            auth: Authorization::Logic(lsig),
            auth_addr,
        }
    }

    /// The id of the wrapped transaction. Signing never changes it.
    pub fn id(&self) -> String {
        self.txn.id()
    }

    /// The address whose authority this envelope claims.
    pub fn authorizer(&self) -> Address {
        self.auth_addr.unwrap_or(self.txn.header.sender)
    }

    pub fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        match &self.auth {
            Authorization::Single(sig) => fields.insert("sig", *sig.as_bytes()),
            Authorization::Multi(msig) => fields.insert("msig", msig.to_fields()),
            Authorization::Logic(lsig) => fields.insert("lsig", lsig.to_fields()),
        };
        fields
            .insert("sgnr", self.auth_addr)
            .insert("txn", self.txn.to_fields());
        fields
    }

    /// Canonical envelope bytes, as submitted to the network.
    pub fn encode(&self) -> Vec<u8> {
        encoding::encode_map(&self.to_fields())
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::from_fields(encoding::decode_map(bytes)?)
    }

    pub fn from_fields(mut fields: FieldMap) -> Result<Self, CodecError> {
        let sig = fields.take_optional_fixed::<64>("sig")?;
        let msig = fields.take_optional_map("msig")?;
        let lsig = fields.take_optional_map("lsig")?;

        let auth = match (sig, msig, lsig) {
            (Some(sig), None, None) => Authorization::Single(Signature::from_bytes(sig)),
            (None, Some(msig), None) => Authorization::Multi(MultiSignature::from_fields(msig)?),
            (None, None, Some(lsig)) => Authorization::Logic(LogicSig::from_fields(lsig)?),
            (None, None, None) => return Err(CodecError::MissingField("sig")),
            _ => return Err(CodecError::AmbiguousSignature),
        };

        let auth_addr = fields.take_optional_fixed("sgnr")?.map(Address::new);
        let txn = match fields.take_optional_map("txn")? {
            Some(txn) => RawTransaction::from_fields(txn)?,
            None => return Err(CodecError::MissingField("txn")),
        };
        fields.finish()?;

        Ok(Self {
            txn,
            auth,
            auth_addr,
        })
    }
}

/// Concatenate envelopes for submitting an atomic group in one request.
pub fn encode_signed_group(transactions: &[SignedTransaction]) -> Vec<u8> {
    transactions.iter().flat_map(SignedTransaction::encode).collect()
}

/// Split a concatenation produced by [`encode_signed_group`].
pub fn decode_signed_group(mut bytes: &[u8]) -> Result<Vec<SignedTransaction>, CodecError> {
    let mut out = Vec::new();
    while !bytes.is_empty() {
        match encoding::decode_next(&mut bytes)? {
            encoding::Value::Map(fields) => out.push(SignedTransaction::from_fields(fields)?),
            _ => {
                return Err(CodecError::TypeMismatch {
                    field: "<envelope>".into(),
                    expected: "map",
                })
            }
        }
    }
    Ok(out)
}
