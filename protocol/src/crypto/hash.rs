//! # Hashing Utilities
//!
//! The protocol uses exactly one hash function: SHA-512/256, the SHA-512
//! compression function with its own IV, truncated to 32 bytes. Transaction
//! ids, group ids, address checksums, escrow addresses and multisig
//! addresses are all SHA-512/256 digests.
//!
//! Context separation is done the boring way: every caller prepends a short
//! domain prefix (see [`crate::config`]) before hashing. [`sha512_256_multi`]
//! feeds the prefix and the payload into the hasher without concatenating
//! them first.

use sha2::{Digest, Sha512_256};

use crate::config::{CHECKSUM_LENGTH, DIGEST_LENGTH};

/// Compute the SHA-512/256 digest of `data`.
///
/// # Example
///
/// ```
/// use ledger_protocol::crypto::sha512_256;
///
/// let digest = sha512_256(b"ledger");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn sha512_256(data: &[u8]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Sha512_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash multiple byte slices as if they were concatenated.
///
/// This is how domain-prefixed digests are computed:
/// `sha512_256_multi(&[b"TX", &canonical])`.
pub fn sha512_256_multi(parts: &[&[u8]]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Sha512_256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// The address checksum: the last four bytes of the digest of `data`.
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let digest = sha512_256(data);
    let mut out = [0u8; CHECKSUM_LENGTH];
    out.copy_from_slice(&digest[DIGEST_LENGTH - CHECKSUM_LENGTH..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha512_256_known_vector() {
        // FIPS 180-4 SHA-512/256 of the empty string.
        let expected =
            hex::decode("c672b8d1ef56ed28ab87c3622c5114069bdd3ad7b8f9737498d0c01ecef0967a")
                .unwrap();
        assert_eq!(sha512_256(b"").to_vec(), expected);
    }

    #[test]
    fn test_sha512_256_abc_vector() {
        let expected =
            hex::decode("53048e2681941ef99b2e29b76b4c7dabe4c2d0c634fc6d46e0e2f13107e7af23")
                .unwrap();
        assert_eq!(sha512_256(b"abc").to_vec(), expected);
    }

    #[test]
    fn test_multi_equals_concatenation() {
        let multi = sha512_256_multi(&[b"TX", b"payload"]);
        let single = sha512_256(b"TXpayload");
        assert_eq!(multi, single);
    }

    #[test]
    fn test_prefix_changes_digest() {
        let data = b"same data";
        assert_ne!(
            sha512_256_multi(&[b"TX", data]),
            sha512_256_multi(&[b"TG", data])
        );
    }

    #[test]
    fn checksum_is_digest_tail() {
        let digest = sha512_256(b"key material");
        assert_eq!(checksum(b"key material"), digest[28..]);
    }
}
