//! # Addresses
//!
//! An address is 32 bytes: an Ed25519 public key for keyed accounts, or a
//! SHA-512/256 digest for accounts derived from something else (a program,
//! an application id, a multisig key set). The on-chain form is always the
//! raw 32 bytes.
//!
//! The human form is base32 of `bytes ‖ checksum`, where the checksum is the
//! last four bytes of `sha512_256(bytes)`. Typos are caught at parse time:
//! a string whose checksum does not match is rejected, never silently
//! accepted as some other account.
//!
//! ```text
//! DPLD3RTSWC5STVBPZL5DIIVE2OC4BSAWTOYBLFN2X6EFLT2ZNF4SMX64UA
//! └──────────── 32-byte key ──────────────┘└─ checksum ─┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::{APP_ID_PREFIX, CHECKSUM_LENGTH, PROGRAM_PREFIX, PUBLIC_KEY_LENGTH};
use crate::crypto::hash::{checksum, sha512_256_multi};
use crate::crypto::PublicKey;
use crate::encoding::{base32, Value};

/// Errors when parsing an address string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is not valid base32")]
    InvalidEncoding,

    #[error("address decodes to {0} bytes, expected 36")]
    InvalidLength(usize),

    #[error("address checksum mismatch")]
    ChecksumMismatch,
}

/// A 32-byte account address.
///
/// # Examples
///
/// ```
/// use ledger_protocol::address::Address;
///
/// let addr: Address = "DPLD3RTSWC5STVBPZL5DIIVE2OC4BSAWTOYBLFN2X6EFLT2ZNF4SMX64UA"
///     .parse()
///     .unwrap();
/// assert_eq!(addr.to_string(), "DPLD3RTSWC5STVBPZL5DIIVE2OC4BSAWTOYBLFN2X6EFLT2ZNF4SMX64UA");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; PUBLIC_KEY_LENGTH]);

impl Address {
    /// The all-zero address. Encodes as an omitted field.
    pub const ZERO: Address = Address([0u8; PUBLIC_KEY_LENGTH]);

    /// Length of the human-readable form.
    pub const ENCODED_LENGTH: usize = 58;

    pub const fn new(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// The address controlled by `public_key`: the key bytes themselves.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self(*public_key.as_bytes())
    }

    /// The escrow address of a logic program: `sha512_256("Program" ‖ program)`.
    pub fn for_program(program: &[u8]) -> Self {
        Self(sha512_256_multi(&[PROGRAM_PREFIX, program]))
    }

    /// The account an application controls:
    /// `sha512_256("appID" ‖ big-endian app id)`.
    pub fn for_application(app_id: u64) -> Self {
        Self(sha512_256_multi(&[APP_ID_PREFIX, &app_id.to_be_bytes()]))
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; PUBLIC_KEY_LENGTH]
    }

    /// Rebuild from a slice of exactly 32 bytes.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, AddressError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] = slice
            .try_into()
            .map_err(|_| AddressError::InvalidLength(slice.len()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = [0u8; PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH];
        raw[..PUBLIC_KEY_LENGTH].copy_from_slice(&self.0);
        raw[PUBLIC_KEY_LENGTH..].copy_from_slice(&checksum(&self.0));
        f.write_str(&base32::encode(&raw))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = base32::decode(s).ok_or(AddressError::InvalidEncoding)?;
        if raw.len() != PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH {
            return Err(AddressError::InvalidLength(raw.len()));
        }
        let (key, sum) = raw.split_at(PUBLIC_KEY_LENGTH);
        if checksum(key) != sum {
            return Err(AddressError::ChecksumMismatch);
        }
        Self::try_from_slice(key)
    }
}

impl From<[u8; PUBLIC_KEY_LENGTH]> for Address {
    fn from(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }
}

/// On the wire an address is its raw bytes; the zero address is omitted.
impl From<Address> for Value {
    fn from(address: Address) -> Self {
        Value::from(address.0)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
