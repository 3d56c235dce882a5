//! Lowering transactions to wire fields and back.
//!
//! One function per direction, dispatching on the variant (encode) or on
//! the `type` tag (decode). Wire names are fixed by the network.

use super::header::Header;
use super::raw::{
    ApplicationCall, AssetConfig, AssetFreeze, AssetTransfer, KeyRegistration, Payment,
    RawTransaction, TxBody,
};
use super::types::{AssetParams, OnCompletion, StateSchema, TxType};
use crate::address::Address;
use crate::encoding::value::{value_into_bytes, value_into_u64};
use crate::encoding::{CodecError, FieldMap, Value};

impl RawTransaction {
    /// The transaction as a canonical field map.
    pub fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        self.header.write_fields(&mut fields);
        fields.insert("type", self.tx_type().tag());

        match &self.body {
            TxBody::Payment(p) => {
                fields
                    .insert("amt", p.amount)
                    .insert("close", p.close_remainder_to)
                    .insert("rcv", p.receiver);
            }
            TxBody::KeyRegistration(k) => {
                fields
                    .insert("nonpart", k.non_participation)
                    .insert("selkey", k.selection_pk)
                    .insert("sprfkey", k.state_proof_pk)
                    .insert("votefst", k.vote_first)
                    .insert("votekd", k.vote_key_dilution)
                    .insert("votekey", k.vote_pk)
                    .insert("votelst", k.vote_last);
            }
            TxBody::AssetConfig(c) => {
                fields
                    .insert("apar", c.params.as_ref().map(AssetParams::to_fields))
                    .insert("caid", c.asset_id);
            }
            TxBody::AssetTransfer(t) => {
                fields
                    .insert("aamt", t.amount)
                    .insert("aclose", t.close_to)
                    .insert("arcv", t.receiver)
                    .insert("asnd", t.revocation_target)
                    .insert("xaid", t.asset_id);
            }
            TxBody::AssetFreeze(f) => {
                fields
                    .insert("afrz", f.frozen)
                    .insert("fadd", f.account)
                    .insert("faid", f.asset_id);
            }
            TxBody::ApplicationCall(a) => {
                fields
                    .insert("apaa", bytes_array(&a.args))
                    .insert("apan", a.on_complete.as_u64())
                    .insert("apap", a.approval_program.as_slice())
                    .insert("apas", uint_array(&a.foreign_assets))
                    .insert("apat", address_array(&a.accounts))
                    .insert("apep", a.extra_pages)
                    .insert("apfa", uint_array(&a.foreign_apps))
                    .insert("apgs", a.global_schema.to_fields())
                    .insert("apid", a.app_id)
                    .insert("apls", a.local_schema.to_fields())
                    .insert("apsu", a.clear_program.as_slice());
            }
        }
        fields
    }

    /// Rebuild a transaction from decoded fields.
    ///
    /// Every key must be understood for the declared type; a `pay`
    /// transaction carrying `xaid` is an error, not a silently dropped field.
    pub fn from_fields(mut fields: FieldMap) -> Result<Self, CodecError> {
        let tag = fields.take_string("type")?;
        if tag.is_empty() {
            return Err(CodecError::MissingField("type"));
        }
        let tx_type = TxType::from_tag(&tag).ok_or(CodecError::UnknownTransactionType(tag))?;
        let header = Header::read_fields(&mut fields)?;

        let body = match tx_type {
            TxType::Payment => TxBody::Payment(Payment {
                receiver: address(&mut fields, "rcv")?,
                amount: fields.take_u64("amt")?,
                close_remainder_to: optional_address(&mut fields, "close")?,
            }),
            TxType::KeyRegistration => TxBody::KeyRegistration(KeyRegistration {
                vote_pk: fields.take_optional_fixed("votekey")?,
                selection_pk: fields.take_optional_fixed("selkey")?,
                state_proof_pk: fields.take_optional_fixed("sprfkey")?,
                vote_first: fields.take_u64("votefst")?,
                vote_last: fields.take_u64("votelst")?,
                vote_key_dilution: fields.take_u64("votekd")?,
                non_participation: fields.take_bool("nonpart")?,
            }),
            TxType::AssetConfig => TxBody::AssetConfig(AssetConfig {
                asset_id: fields.take_u64("caid")?,
                params: fields
                    .take_optional_map("apar")?
                    .map(AssetParams::from_fields)
                    .transpose()?,
            }),
            TxType::AssetTransfer => TxBody::AssetTransfer(AssetTransfer {
                asset_id: fields.take_u64("xaid")?,
                amount: fields.take_u64("aamt")?,
                receiver: address(&mut fields, "arcv")?,
                revocation_target: optional_address(&mut fields, "asnd")?,
                close_to: optional_address(&mut fields, "aclose")?,
            }),
            TxType::AssetFreeze => TxBody::AssetFreeze(AssetFreeze {
                asset_id: fields.take_u64("faid")?,
                account: address(&mut fields, "fadd")?,
                frozen: fields.take_bool("afrz")?,
            }),
            TxType::ApplicationCall => {
                let on_complete = fields.take_u64("apan")?;
                TxBody::ApplicationCall(ApplicationCall {
                    app_id: fields.take_u64("apid")?,
                    on_complete: OnCompletion::from_u64(on_complete).ok_or(
                        CodecError::TypeMismatch {
                            field: "apan".into(),
                            expected: "on-completion code 0..=5",
                        },
                    )?,
                    args: fields
                        .take_array("apaa")?
                        .into_iter()
                        .map(|v| value_into_bytes("apaa", v))
                        .collect::<Result<_, _>>()?,
                    accounts: fields
                        .take_array("apat")?
                        .into_iter()
                        .map(|v| {
                            let bytes = value_into_bytes("apat", v)?;
                            Address::try_from_slice(&bytes).map_err(|_| {
                                CodecError::InvalidLength {
                                    field: "apat".into(),
                                    expected: 32,
                                    got: bytes.len(),
                                }
                            })
                        })
                        .collect::<Result<_, _>>()?,
                    foreign_apps: uints(&mut fields, "apfa")?,
                    foreign_assets: uints(&mut fields, "apas")?,
                    approval_program: fields.take_bytes("apap")?,
                    clear_program: fields.take_bytes("apsu")?,
                    global_schema: StateSchema::from_fields(fields.take_map("apgs")?)?,
                    local_schema: StateSchema::from_fields(fields.take_map("apls")?)?,
                    extra_pages: fields.take_u32("apep")?,
                })
            }
        };

        fields.finish()?;
        Ok(Self { header, body })
    }
}

fn address(fields: &mut FieldMap, key: &str) -> Result<Address, CodecError> {
    Ok(Address::new(fields.take_fixed(key)?))
}

fn optional_address(fields: &mut FieldMap, key: &str) -> Result<Option<Address>, CodecError> {
    Ok(fields.take_optional_fixed(key)?.map(Address::new))
}

fn uints(fields: &mut FieldMap, key: &str) -> Result<Vec<u64>, CodecError> {
    fields
        .take_array(key)?
        .into_iter()
        .map(|v| value_into_u64(key, v))
        .collect()
}

// Array elements are positional, so zero entries stay in place.

fn bytes_array(items: &[Vec<u8>]) -> Vec<Value> {
    items.iter().map(|b| Value::Bytes(b.clone())).collect()
}

fn uint_array(items: &[u64]) -> Vec<Value> {
    items.iter().map(|n| Value::Uint(*n)).collect()
}

fn address_array(items: &[Address]) -> Vec<Value> {
    items
        .iter()
        .map(|a| Value::Bytes(a.as_bytes().to_vec()))
        .collect()
}
