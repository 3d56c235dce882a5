//! # Transaction Module
//!
//! Construction, canonical encoding, signing and verification of ledger
//! transactions. Every operation on the network (payments, key
//! registration, assets, applications) is a [`RawTransaction`]: one shared
//! [`Header`] plus a [`TxBody`] variant.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        TxType tags, OnCompletion, StateSchema, AssetParams
//! header.rs       Header shared by every variant, SuggestedParams
//! raw.rs          RawTransaction, variant bodies, ids, size estimation
//! fields.rs       lowering to canonical field maps and back
//! builder.rs      TransactionBuilder: validation and fee resolution
//! signed.rs       SignedTransaction envelope and its codec
//! signing.rs      single-key signing
//! verification.rs whole-envelope verification
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build** with [`TransactionBuilder`]; nothing is observable until
//!    `build()` succeeds.
//! 2. **Group** (optional) with [`crate::group::assign_group_id`].
//! 3. **Sign** with [`sign_transaction`], a [`crate::multisig::MultisigAddress`]
//!    or a [`crate::logic::LogicSig`].
//! 4. **Encode** with [`SignedTransaction::encode`] and submit.
//!
//! ## Identity
//!
//! A transaction's id is the base32 SHA-512/256 of `"TX"` followed by its
//! canonical encoding. Any field change, including the group id, changes
//! the id. Signing never does.

pub mod builder;
pub mod fields;
pub mod header;
pub mod raw;
pub mod signed;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::{AssetConfigDraft, BodyDraft, BuildError, TransactionBuilder};
pub use header::{Header, SuggestedParams};
pub use raw::{
    ApplicationCall, AssetConfig, AssetFreeze, AssetTransfer, KeyRegistration, Payment,
    RawTransaction, TxBody,
};
pub use signed::{decode_signed_group, encode_signed_group, Authorization, SignedTransaction};
pub use signing::{sign_transaction, verify_signature};
pub use types::{AssetParams, OnCompletion, StateSchema, TxType};
pub use verification::{verify_signed_transaction, VerificationError};
