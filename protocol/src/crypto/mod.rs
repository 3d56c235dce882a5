//! # Cryptographic Primitives
//!
//! Two primitives, both boring and well-audited:
//!
//! - **Ed25519** for every signature: transactions, multisig subsignatures,
//!   program delegations and arbitrary signed bytes.
//! - **SHA-512/256** for every digest: transaction and group ids, address
//!   checksums, escrow and multisig addresses.
//!
//! Everything here is a thin, type-safe wrapper around `ed25519-dalek` and
//! `sha2`.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{checksum, sha512_256, sha512_256_multi};
pub use keys::{Account, KeyError, PublicKey, Signature};
pub use signatures::{sign, verify, verify_bytes, verify_raw, SignatureError};
