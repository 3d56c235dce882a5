//! # Canonical Encoding
//!
//! One binary format serves both the wire and the hash: msgpack with
//! sorted map keys, zero values omitted, minimal-width integers and
//! distinct text and binary strings. Two implementations that agree on these
//! rules produce byte-identical output, and therefore identical transaction
//! ids and signatures.
//!
//! ```text
//! value.rs   : Value tree and the sorted, zero-filtering FieldMap
//! msgpack.rs : canonical writer and strict reader (rmp)
//! base32.rs  : unpadded RFC 4648 text form for ids and addresses
//! ```

pub mod base32;
pub mod msgpack;
pub mod value;

use thiserror::Error;

pub use msgpack::{decode, decode_map, decode_next, encode, encode_map};
pub use value::{FieldMap, Value};

/// Errors raised while decoding canonical bytes into protocol objects.
///
/// Encoding is infallible.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    #[error("unsupported msgpack marker 0x{0:02x}")]
    UnsupportedMarker(u8),

    #[error("nesting too deep")]
    TooDeep,

    #[error("invalid UTF-8 in text string")]
    InvalidUtf8,

    #[error("field `{field}`: expected {expected}")]
    TypeMismatch { field: String, expected: &'static str },

    #[error("field `{field}`: expected {expected} bytes, got {got}")]
    InvalidLength {
        field: String,
        expected: usize,
        got: usize,
    },

    #[error("duplicate field `{0}`")]
    DuplicateField(String),

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unknown transaction type `{0}`")]
    UnknownTransactionType(String),

    #[error("envelope carries more than one kind of signature")]
    AmbiguousSignature,
}
