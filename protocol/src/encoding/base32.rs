//! RFC 4648 base32, upper-case, without padding.
//!
//! Both public text forms use it: addresses (with checksum) and transaction
//! ids (without).

use base32::Alphabet;

const ALPHABET: Alphabet = Alphabet::Rfc4648 { padding: false };

pub fn encode(data: &[u8]) -> String {
    base32::encode(ALPHABET, data)
}

/// Decode strictly: the input must be exactly what [`encode`] would emit
/// for the decoded bytes. Lower-case input, padding and non-zero trailing
/// bits are all rejected.
pub fn decode(text: &str) -> Option<Vec<u8>> {
    let bytes = base32::decode(ALPHABET, text)?;
    (encode(&bytes) == text).then_some(bytes)
}
