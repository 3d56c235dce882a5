//! Core type definitions for ledger transactions.
//!
//! The vocabulary shared by every variant: the type tag, application
//! on-completion actions, state schemas and asset parameters. The wire
//! names of nested fields live next to the types that own them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;
use crate::encoding::{CodecError, FieldMap};

// ---------------------------------------------------------------------------
// TxType
// ---------------------------------------------------------------------------

/// Discriminant for the operation a transaction represents.
///
/// Encoded on the wire as the `type` field using the short tags below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    /// Move the native currency between accounts.
    Payment,
    /// Register or deregister participation keys.
    KeyRegistration,
    /// Create, reconfigure or destroy an asset.
    AssetConfig,
    /// Move units of an asset, opt in to one, or claw units back.
    AssetTransfer,
    /// Freeze or unfreeze an account's holding of an asset.
    AssetFreeze,
    /// Create, update or call an application.
    ApplicationCall,
}

impl TxType {
    /// Every transaction type.
    pub const ALL: [TxType; 6] = [
        TxType::Payment,
        TxType::KeyRegistration,
        TxType::AssetConfig,
        TxType::AssetTransfer,
        TxType::AssetFreeze,
        TxType::ApplicationCall,
    ];

    /// The wire tag.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Payment => "pay",
            Self::KeyRegistration => "keyreg",
            Self::AssetConfig => "acfg",
            Self::AssetTransfer => "axfer",
            Self::AssetFreeze => "afrz",
            Self::ApplicationCall => "appl",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// OnCompletion
// ---------------------------------------------------------------------------

/// What happens to the sender's application state after an application
/// call succeeds. Encoded as the integer `apan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum OnCompletion {
    #[default]
    NoOp = 0,
    OptIn = 1,
    CloseOut = 2,
    ClearState = 3,
    UpdateApplication = 4,
    DeleteApplication = 5,
}

impl OnCompletion {
    pub fn as_u64(self) -> u64 {
        self as u64
    }

    pub fn from_u64(value: u64) -> Option<Self> {
        Some(match value {
            0 => Self::NoOp,
            1 => Self::OptIn,
            2 => Self::CloseOut,
            3 => Self::ClearState,
            4 => Self::UpdateApplication,
            5 => Self::DeleteApplication,
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// StateSchema
// ---------------------------------------------------------------------------

/// Storage an application reserves, globally or per opted-in account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StateSchema {
    pub num_uint: u64,
    pub num_byte_slice: u64,
}

impl StateSchema {
    pub fn new(num_uint: u64, num_byte_slice: u64) -> Self {
        Self {
            num_uint,
            num_byte_slice,
        }
    }

    pub(crate) fn to_fields(self) -> FieldMap {
        FieldMap::new()
            .with("nbs", self.num_byte_slice)
            .with("nui", self.num_uint)
    }

    pub(crate) fn from_fields(mut fields: FieldMap) -> Result<Self, CodecError> {
        let schema = Self {
            num_uint: fields.take_u64("nui")?,
            num_byte_slice: fields.take_u64("nbs")?,
        };
        fields.finish()?;
        Ok(schema)
    }
}

// ---------------------------------------------------------------------------
// AssetParams
// ---------------------------------------------------------------------------

/// Parameters of an asset, set at creation and partly reconfigurable.
///
/// The four management addresses use [`Address::ZERO`] for "no one". Once
/// cleared, a role can never be assigned again.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssetParams {
    /// Total number of base units. Fixed at creation.
    pub total: u64,
    /// Digits after the decimal point when displaying base units.
    pub decimals: u32,
    /// Whether new holdings start frozen.
    pub default_frozen: bool,
    pub unit_name: String,
    pub asset_name: String,
    pub url: String,
    /// 32-byte commitment to off-chain metadata.
    pub metadata_hash: Option<[u8; 32]>,
    /// May reconfigure or destroy the asset.
    pub manager: Address,
    /// Holds non-minted units (informational).
    pub reserve: Address,
    /// May freeze and unfreeze holdings.
    pub freeze: Address,
    /// May revoke units from any holder.
    pub clawback: Address,
}

impl AssetParams {
    pub(crate) fn to_fields(&self) -> FieldMap {
        FieldMap::new()
            .with("am", self.metadata_hash)
            .with("an", self.asset_name.as_str())
            .with("au", self.url.as_str())
            .with("c", self.clawback)
            .with("dc", self.decimals)
            .with("df", self.default_frozen)
            .with("f", self.freeze)
            .with("m", self.manager)
            .with("r", self.reserve)
            .with("t", self.total)
            .with("un", self.unit_name.as_str())
    }

    pub(crate) fn from_fields(mut fields: FieldMap) -> Result<Self, CodecError> {
        let params = Self {
            total: fields.take_u64("t")?,
            decimals: fields.take_u32("dc")?,
            default_frozen: fields.take_bool("df")?,
            unit_name: fields.take_string("un")?,
            asset_name: fields.take_string("an")?,
            url: fields.take_string("au")?,
            metadata_hash: fields.take_optional_fixed("am")?,
            manager: Address::new(fields.take_fixed("m")?),
            reserve: Address::new(fields.take_fixed("r")?),
            freeze: Address::new(fields.take_fixed("f")?),
            clawback: Address::new(fields.take_fixed("c")?),
        };
        fields.finish()?;
        Ok(params)
    }
}
