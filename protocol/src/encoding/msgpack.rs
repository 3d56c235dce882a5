//! Canonical msgpack writer and a strict reader.
//!
//! Writing goes through `rmp`'s marker-level encoders into an in-memory
//! [`ByteBuf`], whose error type is uninhabited, so encoding cannot fail.
//! `rmp` already picks the smallest representation for every integer and
//! length prefix.
//!
//! Reading uses `rmp` to classify markers and slices the input directly for
//! the payloads. Floats and extension types have
//! no place in the protocol and are rejected.

use std::convert::Infallible;

use rmp::encode::{self, ByteBuf, ValueWriteError};
use rmp::Marker;

use super::value::{FieldMap, Value};
use super::CodecError;

/// Nesting deeper than this is rejected while decoding. Protocol objects
/// nest at most four levels (envelope, lsig, msig, subsig).
const MAX_DEPTH: usize = 16;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a value canonically.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = ByteBuf::with_capacity(256);
    write_value(&mut buf, value);
    buf.into_vec()
}

/// Encode a field map canonically. This is what hashing and signing see.
pub fn encode_map(map: &FieldMap) -> Vec<u8> {
    let mut buf = ByteBuf::with_capacity(256);
    write_map(&mut buf, map);
    buf.into_vec()
}

fn infallible<T>(result: Result<T, ValueWriteError<Infallible>>) -> T {
    match result {
        Ok(v) => v,
        Err(ValueWriteError::InvalidMarkerWrite(e) | ValueWriteError::InvalidDataWrite(e)) => {
            match e {}
        }
    }
}

fn marker_only(result: Result<(), Infallible>) {
    if let Err(e) = result {
        match e {}
    }
}

fn write_value(buf: &mut ByteBuf, value: &Value) {
    match value {
        Value::Nil => marker_only(encode::write_nil(buf)),
        Value::Bool(b) => marker_only(encode::write_bool(buf, *b)),
        Value::Uint(n) => {
            infallible(encode::write_uint(buf, *n));
        }
        Value::Int(n) => {
            infallible(encode::write_sint(buf, *n));
        }
        Value::Str(s) => infallible(encode::write_str(buf, s)),
        Value::Bytes(b) => infallible(encode::write_bin(buf, b)),
        Value::Array(items) => {
            infallible(encode::write_array_len(buf, len_u32(items.len())));
            // Array elements are positional and never omitted.
            for item in items {
                write_value(buf, item);
            }
        }
        Value::Map(map) => write_map(buf, map),
    }
}

fn write_map(buf: &mut ByteBuf, map: &FieldMap) {
    // A decoded map may still hold zero entries; they are dropped here.
    let live = map.iter().filter(|(_, v)| !v.is_zero()).count();
    infallible(encode::write_map_len(buf, len_u32(live)));
    for (key, value) in map.iter().filter(|(_, v)| !v.is_zero()) {
        infallible(encode::write_str(buf, key));
        write_value(buf, value);
    }
}

fn len_u32(len: usize) -> u32 {
    // Protocol objects are a few kilobytes at most.
    u32::try_from(len).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode exactly one value; trailing bytes are an error.
pub fn decode(bytes: &[u8]) -> Result<Value, CodecError> {
    let mut input = bytes;
    let value = decode_next(&mut input)?;
    if !input.is_empty() {
        return Err(CodecError::TrailingBytes(input.len()));
    }
    Ok(value)
}

/// Decode exactly one top-level map.
pub fn decode_map(bytes: &[u8]) -> Result<FieldMap, CodecError> {
    match decode(bytes)? {
        Value::Map(map) => Ok(map),
        other => {
            tracing::trace!(got = other.kind(), "top-level value is not a map");
            Err(CodecError::TypeMismatch {
                field: "<root>".into(),
                expected: "map",
            })
        }
    }
}

/// Decode one value from the front of `input`, advancing it. Used to walk a
/// concatenation of envelopes.
pub fn decode_next(input: &mut &[u8]) -> Result<Value, CodecError> {
    read_value(input, 0)
}

fn read_value(input: &mut &[u8], depth: usize) -> Result<Value, CodecError> {
    if depth > MAX_DEPTH {
        return Err(CodecError::TooDeep);
    }
    let marker = rmp::decode::read_marker(input).map_err(|_| CodecError::UnexpectedEof)?;
    let value = match marker {
        Marker::Null => Value::Nil,
        Marker::True => Value::Bool(true),
        Marker::False => Value::Bool(false),
        Marker::FixPos(n) => Value::Uint(u64::from(n)),
        Marker::U8 => Value::Uint(u64::from(be::<1>(input)?[0])),
        Marker::U16 => Value::Uint(u64::from(u16::from_be_bytes(be(input)?))),
        Marker::U32 => Value::Uint(u64::from(u32::from_be_bytes(be(input)?))),
        Marker::U64 => Value::Uint(u64::from_be_bytes(be(input)?)),
        Marker::FixNeg(n) => Value::Int(i64::from(n)),
        Marker::I8 => Value::Int(i64::from(i8::from_be_bytes(be(input)?))),
        Marker::I16 => Value::Int(i64::from(i16::from_be_bytes(be(input)?))),
        Marker::I32 => Value::Int(i64::from(i32::from_be_bytes(be(input)?))),
        Marker::I64 => Value::Int(i64::from_be_bytes(be(input)?)),
        Marker::FixStr(len) => read_str(input, usize::from(len))?,
        Marker::Str8 => {
            let len = usize::from(be::<1>(input)?[0]);
            read_str(input, len)?
        }
        Marker::Str16 => {
            let len = usize::from(u16::from_be_bytes(be(input)?));
            read_str(input, len)?
        }
        Marker::Str32 => {
            let len = u32::from_be_bytes(be(input)?) as usize;
            read_str(input, len)?
        }
        Marker::Bin8 => {
            let len = usize::from(be::<1>(input)?[0]);
            Value::Bytes(take(input, len)?.to_vec())
        }
        Marker::Bin16 => {
            let len = usize::from(u16::from_be_bytes(be(input)?));
            Value::Bytes(take(input, len)?.to_vec())
        }
        Marker::Bin32 => {
            let len = u32::from_be_bytes(be(input)?) as usize;
            Value::Bytes(take(input, len)?.to_vec())
        }
        Marker::FixArray(len) => read_array(input, usize::from(len), depth)?,
        Marker::Array16 => {
            let len = usize::from(u16::from_be_bytes(be(input)?));
            read_array(input, len, depth)?
        }
        Marker::Array32 => {
            let len = u32::from_be_bytes(be(input)?) as usize;
            read_array(input, len, depth)?
        }
        Marker::FixMap(len) => read_map(input, usize::from(len), depth)?,
        Marker::Map16 => {
            let len = usize::from(u16::from_be_bytes(be(input)?));
            read_map(input, len, depth)?
        }
        Marker::Map32 => {
            let len = u32::from_be_bytes(be(input)?) as usize;
            read_map(input, len, depth)?
        }
        other => return Err(CodecError::UnsupportedMarker(other.to_u8())),
    };
    Ok(value)
}

/// Fixed-width big-endian payload following a marker.
fn be<const N: usize>(input: &mut &[u8]) -> Result<[u8; N], CodecError> {
    let mut out = [0u8; N];
    out.copy_from_slice(take(input, N)?);
    Ok(out)
}

fn take<'a>(input: &mut &'a [u8], len: usize) -> Result<&'a [u8], CodecError> {
    if input.len() < len {
        return Err(CodecError::UnexpectedEof);
    }
    let (head, tail) = input.split_at(len);
    *input = tail;
    Ok(head)
}

fn read_str(input: &mut &[u8], len: usize) -> Result<Value, CodecError> {
    let raw = take(input, len)?;
    let s = std::str::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8)?;
    Ok(Value::Str(s.to_owned()))
}

fn read_array(input: &mut &[u8], len: usize, depth: usize) -> Result<Value, CodecError> {
    // Every element takes at least one byte; refuse to preallocate for a
    // length prefix the input cannot possibly satisfy.
    if len > input.len() {
        return Err(CodecError::UnexpectedEof);
    }
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(read_value(input, depth + 1)?);
    }
    Ok(Value::Array(items))
}

fn read_map(input: &mut &[u8], len: usize, depth: usize) -> Result<Value, CodecError> {
    if len > input.len() {
        return Err(CodecError::UnexpectedEof);
    }
    let mut map = FieldMap::new();
    for _ in 0..len {
        let key = match read_value(input, depth + 1)? {
            Value::Str(key) => key,
            other => {
                return Err(CodecError::TypeMismatch {
                    field: format!("<{} key>", other.kind()),
                    expected: "string key",
                })
            }
        };
        let value = read_value(input, depth + 1)?;
        if let Some(_previous) = map.insert_raw(key.clone(), value) {
            return Err(CodecError::DuplicateField(key));
        }
    }
    Ok(Value::Map(map))
}
