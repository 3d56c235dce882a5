//! The dynamic value tree that sits between typed protocol objects and the
//! wire.
//!
//! Typed structs lower themselves into a [`FieldMap`] and are rebuilt from
//! one. The map owns the two canonical rules that do not depend on the byte
//! format: keys are kept sorted, and zero values never get in.

use std::collections::btree_map::{self, BTreeMap};

use super::CodecError;

/// A msgpack value as the protocol uses it.
///
/// Text and binary strings are distinct variants and never convert into
/// one another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Nil,
    Bool(bool),
    Uint(u64),
    /// Only produced when decoding a negative integer. Protocol fields are
    /// all unsigned.
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Map(FieldMap),
}

impl Value {
    /// `true` for the zero value of the variant's type.
    ///
    /// Zero-valued map entries are omitted from the canonical encoding.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Nil => true,
            Value::Bool(b) => !b,
            Value::Uint(n) => *n == 0,
            Value::Int(n) => *n == 0,
            Value::Str(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
        }
    }

    /// Human-readable type name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Uint(_) | Value::Int(_) => "integer",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Uint(u64::from(v))
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Uint(u64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

/// Fixed-size byte arrays (hashes, keys, leases) are zero when every byte
/// is zero, not only when empty.
impl<const N: usize> From<[u8; N]> for Value {
    fn from(v: [u8; N]) -> Self {
        if v.iter().all(|b| *b == 0) {
            Value::Nil
        } else {
            Value::Bytes(v.to_vec())
        }
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<FieldMap> for Value {
    fn from(v: FieldMap) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

// ---------------------------------------------------------------------------
// FieldMap
// ---------------------------------------------------------------------------

/// A string-keyed map in canonical order with zero values filtered out.
///
/// On the decode side the `take_*` accessors remove entries as they are
/// consumed; [`FieldMap::finish`] then rejects anything left over. A missing
/// key reads as the zero value, mirroring omission on the encode side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: BTreeMap<String, Value>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key` unless it is a zero value.
    ///
    /// Inserting a zero value removes any previous entry for `key`.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        if value.is_zero() {
            self.entries.remove(key);
        } else {
            self.entries.insert(key.to_owned(), value);
        }
        self
    }

    /// Consuming form of [`insert`](Self::insert) for building maps inline.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert without zero filtering. Only the decoder uses this, so a
    /// non-canonical input can be detected and reported as such.
    pub(crate) fn insert_raw(&mut self, key: String, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in canonical (lexicographic) key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    // -----------------------------------------------------------------------
    // Decode-side accessors
    // -----------------------------------------------------------------------

    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn take_u64(&mut self, key: &str) -> Result<u64, CodecError> {
        match self.take(key) {
            None | Some(Value::Nil) => Ok(0),
            Some(Value::Uint(n)) => Ok(n),
            Some(Value::Int(n)) if n >= 0 => Ok(n as u64),
            Some(other) => Err(mismatch(key, "unsigned integer", &other)),
        }
    }

    pub fn take_u32(&mut self, key: &str) -> Result<u32, CodecError> {
        let n = self.take_u64(key)?;
        u32::try_from(n).map_err(|_| CodecError::TypeMismatch {
            field: key.to_owned(),
            expected: "32-bit unsigned integer",
        })
    }

    pub fn take_u8(&mut self, key: &str) -> Result<u8, CodecError> {
        let n = self.take_u64(key)?;
        u8::try_from(n).map_err(|_| CodecError::TypeMismatch {
            field: key.to_owned(),
            expected: "8-bit unsigned integer",
        })
    }

    pub fn take_bool(&mut self, key: &str) -> Result<bool, CodecError> {
        match self.take(key) {
            None | Some(Value::Nil) => Ok(false),
            Some(Value::Bool(b)) => Ok(b),
            Some(other) => Err(mismatch(key, "bool", &other)),
        }
    }

    pub fn take_string(&mut self, key: &str) -> Result<String, CodecError> {
        match self.take(key) {
            None | Some(Value::Nil) => Ok(String::new()),
            Some(Value::Str(s)) => Ok(s),
            Some(other) => Err(mismatch(key, "string", &other)),
        }
    }

    pub fn take_bytes(&mut self, key: &str) -> Result<Vec<u8>, CodecError> {
        match self.take(key) {
            None | Some(Value::Nil) => Ok(Vec::new()),
            Some(Value::Bytes(b)) => Ok(b),
            Some(other) => Err(mismatch(key, "bytes", &other)),
        }
    }

    /// A fixed-width byte field. Absent reads as all zeros.
    pub fn take_fixed<const N: usize>(&mut self, key: &str) -> Result<[u8; N], CodecError> {
        Ok(self.take_optional_fixed(key)?.unwrap_or([0u8; N]))
    }

    /// A fixed-width byte field where absence is meaningful.
    pub fn take_optional_fixed<const N: usize>(
        &mut self,
        key: &str,
    ) -> Result<Option<[u8; N]>, CodecError> {
        let bytes = self.take_bytes(key)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let got = bytes.len();
        let fixed: [u8; N] = bytes.try_into().map_err(|_| CodecError::InvalidLength {
            field: key.to_owned(),
            expected: N,
            got,
        })?;
        Ok(Some(fixed))
    }

    pub fn take_array(&mut self, key: &str) -> Result<Vec<Value>, CodecError> {
        match self.take(key) {
            None | Some(Value::Nil) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(mismatch(key, "array", &other)),
        }
    }

    pub fn take_map(&mut self, key: &str) -> Result<FieldMap, CodecError> {
        Ok(self.take_optional_map(key)?.unwrap_or_default())
    }

    pub fn take_optional_map(&mut self, key: &str) -> Result<Option<FieldMap>, CodecError> {
        match self.take(key) {
            None | Some(Value::Nil) => Ok(None),
            Some(Value::Map(map)) => Ok(Some(map)),
            Some(other) => Err(mismatch(key, "map", &other)),
        }
    }

    /// Reject any entry no accessor consumed.
    pub fn finish(self) -> Result<(), CodecError> {
        match self.entries.into_keys().next() {
            Some(key) => Err(CodecError::UnknownField(key)),
            None => Ok(()),
        }
    }
}

impl<'a> IntoIterator for &'a FieldMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn mismatch(field: &str, expected: &'static str, got: &Value) -> CodecError {
    tracing::trace!(field, expected, got = got.kind(), "field type mismatch");
    CodecError::TypeMismatch {
        field: field.to_owned(),
        expected,
    }
}

/// Array element accessors shared by the transaction and envelope decoders.
pub(crate) fn value_into_bytes(field: &str, value: Value) -> Result<Vec<u8>, CodecError> {
    match value {
        Value::Bytes(b) => Ok(b),
        Value::Nil => Ok(Vec::new()),
        other => Err(mismatch(field, "bytes", &other)),
    }
}

pub(crate) fn value_into_u64(field: &str, value: Value) -> Result<u64, CodecError> {
    match value {
        Value::Uint(n) => Ok(n),
        Value::Int(n) if n >= 0 => Ok(n as u64),
        Value::Nil => Ok(0),
        other => Err(mismatch(field, "unsigned integer", &other)),
    }
}

pub(crate) fn value_into_map(field: &str, value: Value) -> Result<FieldMap, CodecError> {
    match value {
        Value::Map(map) => Ok(map),
        Value::Nil => Ok(FieldMap::new()),
        other => Err(mismatch(field, "map", &other)),
    }
}
