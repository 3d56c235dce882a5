//! # Protocol Configuration & Constants
//!
//! Every magic number the transaction layer depends on lives here. These
//! values are fixed by the network: change one and your transactions stop
//! hashing to the ids everyone else computes.

// ---------------------------------------------------------------------------
// Domain Prefixes
// ---------------------------------------------------------------------------

/// Prepended to canonical transaction bytes before hashing or signing.
pub const TX_PREFIX: &[u8] = b"TX";

/// Prepended to the encoded id list when computing an atomic group id.
pub const GROUP_PREFIX: &[u8] = b"TG";

/// Prepended to program bytes for escrow addresses and delegation signatures.
pub const PROGRAM_PREFIX: &[u8] = b"Program";

/// Prepended to `version ‖ threshold ‖ keys` when deriving a multisig address.
pub const MULTISIG_PREFIX: &[u8] = b"MultisigAddr";

/// Prepended to arbitrary data signed with [`crate::crypto::Account::sign_bytes`].
pub const BYTES_PREFIX: &[u8] = b"MX";

/// Prepended to the big-endian application id for application escrow addresses.
pub const APP_ID_PREFIX: &[u8] = b"appID";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 public key length. An address is exactly one public key.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Output length of the SHA-512/256 digest used for every protocol hash.
pub const DIGEST_LENGTH: usize = 32;

/// Number of trailing digest bytes appended to an address as its checksum.
pub const CHECKSUM_LENGTH: usize = 4;

/// Length of the state-proof key registered by key registration transactions.
pub const STATE_PROOF_KEY_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Fee Parameters
// ---------------------------------------------------------------------------

/// Minimum transaction fee in microunits. Per-byte fees that compute to less
/// than this are raised to it.
pub const MIN_TX_FEE: u64 = 1_000;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Maximum note length in bytes.
pub const MAX_NOTE_LENGTH: usize = 1_000;

/// Number of rounds a builder adds to `first_valid` when no `last_valid` is given.
pub const DEFAULT_VALIDITY_WINDOW: u64 = 1_000;

/// Maximum number of transactions in one atomic group.
pub const MAX_GROUP_SIZE: usize = 16;

/// Maximum number of decimal places an asset may declare.
pub const MAX_ASSET_DECIMALS: u32 = 19;

/// Longest asset unit name, in bytes.
pub const MAX_UNIT_NAME_LENGTH: usize = 8;

/// Longest asset name, in bytes.
pub const MAX_ASSET_NAME_LENGTH: usize = 32;

/// Longest asset URL, in bytes.
pub const MAX_ASSET_URL_LENGTH: usize = 96;

/// Extra 2 KiB program pages an application may reserve at creation.
pub const MAX_EXTRA_PROGRAM_PAGES: u32 = 3;

/// Only multisig version the network accepts.
pub const MULTISIG_VERSION: u8 = 1;

// ---------------------------------------------------------------------------
// Program Limits
// ---------------------------------------------------------------------------

/// Maximum combined length of a logic program and its arguments.
pub const MAX_PROGRAM_LENGTH: usize = 1_000;

/// Static cost budget for programs below version 4. From version 4 on the
/// network meters cost dynamically and this limit no longer applies.
pub const MAX_PROGRAM_COST: u64 = 20_000;

/// First program version exempt from the static cost check.
pub const DYNAMIC_COST_VERSION: u64 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_prefixes_are_distinct() {
        // A collision here would let a signature in one context be replayed
        // in another.
        let prefixes = [
            TX_PREFIX,
            GROUP_PREFIX,
            PROGRAM_PREFIX,
            MULTISIG_PREFIX,
            BYTES_PREFIX,
            APP_ID_PREFIX,
        ];
        for (i, a) in prefixes.iter().enumerate() {
            for b in &prefixes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_crypto_parameter_sizes() {
        assert_eq!(PUBLIC_KEY_LENGTH, 32);
        assert_eq!(SIGNATURE_LENGTH, 64);
        assert_eq!(DIGEST_LENGTH, 32);
        assert_eq!(CHECKSUM_LENGTH, 4);
    }

    #[test]
    fn test_limit_sanity() {
        assert!(MIN_TX_FEE > 0);
        assert!(MAX_GROUP_SIZE > 1);
        assert!(DEFAULT_VALIDITY_WINDOW > 0);
        assert!(MAX_PROGRAM_COST > 0);
    }
}
