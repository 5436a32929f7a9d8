//! Length-prefixed, order-preserving tuple encoding.
//!
//! This is the `pack`/`unpack` codec referenced throughout spec §6. Each
//! element is encoded as a big-endian `u32` length followed by its raw
//! bytes; big-endian lengths keep the encoding order-preserving for the
//! common case of a single variable-length string element (the forward
//! subspace's key), which is what the allocator and forward store range
//! scan over.
//!
//! This is deliberately simple (no varint, no escaping) — the resolver
//! never needs to compare packed tuples of mixed arity against each
//! other, only within one subspace at a time.

use crate::error::{Error, Result};

/// One packed element, in the order it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// UTF-8 string (a key).
    Str(String),
    /// Big-endian u64 (a value, version, or window bound).
    U64(u64),
    /// Raw bytes (metadata, or an opaque tail).
    Bytes(Vec<u8>),
}

/// Append one packed element to `out`.
fn write_elem(out: &mut Vec<u8>, tag: u8, bytes: &[u8]) {
    out.push(tag);
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

/// Pack a sequence of elements into a single byte string.
pub fn pack(elements: &[Element]) -> Vec<u8> {
    let mut out = Vec::new();
    for elem in elements {
        match elem {
            Element::Str(s) => write_elem(&mut out, 0x01, s.as_bytes()),
            Element::U64(v) => write_elem(&mut out, 0x02, &v.to_be_bytes()),
            Element::Bytes(b) => write_elem(&mut out, 0x03, b),
        }
    }
    out
}

/// Pack a single string key — the common case for the forward/reverse subspaces.
pub fn pack_str(s: &str) -> Vec<u8> {
    pack(&[Element::Str(s.to_string())])
}

/// Pack a single `u64` value.
pub fn pack_u64(v: u64) -> Vec<u8> {
    pack(&[Element::U64(v)])
}

/// Decode a packed byte string back into its elements.
///
/// Returns `Error::Corrupt` if the buffer is truncated or carries an
/// unrecognized tag — this is the fatal "undecodable state record" path
/// spec §4.2 calls out.
pub fn unpack(buf: &[u8]) -> Result<Vec<Element>> {
    let mut elements = Vec::new();
    let mut pos = 0usize;
    while pos < buf.len() {
        if pos + 5 > buf.len() {
            return Err(Error::Corrupt(buf.to_vec(), "truncated element header".into()));
        }
        let tag = buf[pos];
        let len = u32::from_be_bytes(buf[pos + 1..pos + 5].try_into().unwrap()) as usize;
        pos += 5;
        if pos + len > buf.len() {
            return Err(Error::Corrupt(buf.to_vec(), "truncated element body".into()));
        }
        let body = &buf[pos..pos + len];
        pos += len;
        let elem = match tag {
            0x01 => Element::Str(
                String::from_utf8(body.to_vec())
                    .map_err(|e| Error::Corrupt(buf.to_vec(), e.to_string()))?,
            ),
            0x02 => {
                if body.len() != 8 {
                    return Err(Error::Corrupt(buf.to_vec(), "bad u64 width".into()));
                }
                Element::U64(u64::from_be_bytes(body.try_into().unwrap()))
            }
            0x03 => Element::Bytes(body.to_vec()),
            other => return Err(Error::Corrupt(buf.to_vec(), format!("unknown tag {other}"))),
        };
        elements.push(elem);
    }
    Ok(elements)
}

/// Unpack a single string element (the forward/reverse subspace's key half).
pub fn unpack_str(buf: &[u8]) -> Result<String> {
    match unpack(buf)?.into_iter().next() {
        Some(Element::Str(s)) => Ok(s),
        _ => Err(Error::Corrupt(buf.to_vec(), "expected single string element".into())),
    }
}

/// Unpack a single `u64` element.
pub fn unpack_u64(buf: &[u8]) -> Result<u64> {
    match unpack(buf)?.into_iter().next() {
        Some(Element::U64(v)) => Ok(v),
        _ => Err(Error::Corrupt(buf.to_vec(), "expected single u64 element".into())),
    }
}
