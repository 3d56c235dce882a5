// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ledger Protocol: Core Library
//!
//! Client-side core of a ledger transaction protocol: build transactions,
//! encode them canonically, sign them three ways, bind them into atomic
//! groups, and read the bytecode of delegated programs.
//!
//! Nothing here talks to a node. Every operation is a pure, synchronous
//! computation over values the caller owns, so a wallet, an indexer or a
//! signing service can use the same code.
//!
//! ## Architecture
//!
//! - **config**: Protocol constants (fees, limits, domain prefixes).
//! - **crypto**: SHA-512/256, Ed25519 accounts and signatures.
//! - **encoding**: Canonical msgpack and base32. The bytes *are* the identity.
//! - **address**: 32-byte account addresses with a checksummed text form.
//! - **transaction**: The data model, builders, envelopes, single-key signing.
//! - **multisig**: k-of-n signing and partial-signature merging.
//! - **logic**: Escrow and delegated program authorization.
//! - **program**: Structural reader for program bytecode.
//! - **group**: Atomic group ids.
//! - **logging**: `tracing` subscriber setup for binaries and tests.
//!
//! ## Design Philosophy
//!
//! 1. Bit-exact or nothing. A wrong byte is a different transaction.
//! 2. Build, then sign. A transaction is only observable once it validates.
//! 3. Failures are typed and leave inputs untouched.
//! 4. If it touches signatures, it has tests. Plural.

pub mod address;
pub mod config;
pub mod crypto;
pub mod encoding;
pub mod group;
pub mod logging;
pub mod logic;
pub mod multisig;
pub mod program;
pub mod transaction;

pub use address::Address;
pub use crypto::{Account, PublicKey, Signature};
pub use transaction::{RawTransaction, SignedTransaction, TransactionBuilder};
