//! Byte-length computation over buffer-like values.
//!
//! Three shapes of contents flow through the load/save helpers: text, raw
//! bytes, and opaque binary buffers (for example a serialized engine). Typed
//! code expresses "is bytes-like" as the [`ByteBuffer`] capability. Untyped
//! values arriving as JSON go through [`Payload::from_value`], which is where
//! non-bytes-like input is rejected.

use crate::error::{LockfileError, Result};
use serde_json::Value;

/// A value that exposes a contiguous byte view.
pub trait ByteBuffer {
    /// Borrow the contents as bytes.
    fn as_bytes(&self) -> &[u8];

    /// Number of bytes in the contents.
    fn num_bytes(&self) -> usize {
        self.as_bytes().len()
    }
}

impl ByteBuffer for str {
    fn as_bytes(&self) -> &[u8] {
        str::as_bytes(self)
    }
}

impl ByteBuffer for String {
    fn as_bytes(&self) -> &[u8] {
        self.as_str().as_bytes()
    }
}

impl ByteBuffer for [u8] {
    fn as_bytes(&self) -> &[u8] {
        self
    }
}

impl ByteBuffer for Vec<u8> {
    fn as_bytes(&self) -> &[u8] {
        self.as_slice()
    }
}

impl<const N: usize> ByteBuffer for [u8; N] {
    fn as_bytes(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Number of bytes in `contents`.
///
/// Text is measured by its UTF-8 encoding, so `"hello"` and `b"hello"` both
/// report 5.
pub fn num_bytes<B: ByteBuffer + ?Sized>(contents: &B) -> usize {
    contents.num_bytes()
}

/// Number of bytes in an untyped value.
///
/// # Errors
///
/// Returns [`LockfileError::NotBytesLike`] when the value is not a string,
/// a byte array, or a `{"buffer": [...]}` object.
pub fn num_bytes_of_value(value: &Value) -> Result<usize> {
    Payload::from_value(value).map(|payload| payload.num_bytes())
}

/// An owned, opaque binary buffer.
///
/// Stands in for handles such as serialized engines: callers only get a
/// length and a byte view, never a text interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostBuffer {
    data: Box<[u8]>,
}

impl HostBuffer {
    /// Take ownership of `data` as the buffer's contents.
    pub fn new(data: impl Into<Box<[u8]>>) -> Self {
        Self { data: data.into() }
    }

    /// Length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for HostBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl ByteBuffer for HostBuffer {
    fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// The closed set of contents the save helpers accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
    Buffer(HostBuffer),
}

impl Payload {
    /// Interpret an untyped JSON value as contents.
    ///
    /// - a string is text
    /// - an array of integers in `0..=255` is raw bytes
    /// - an object `{"buffer": [...]}` holding such an array is a binary buffer
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(Payload::Text(text.clone())),
            Value::Array(items) => byte_array(items)
                .map(Payload::Bytes)
                .ok_or_else(|| not_bytes_like(value)),
            Value::Object(map) if map.len() == 1 => match map.get("buffer") {
                Some(Value::Array(items)) => byte_array(items)
                    .map(|data| Payload::Buffer(HostBuffer::from(data)))
                    .ok_or_else(|| not_bytes_like(value)),
                _ => Err(not_bytes_like(value)),
            },
            _ => Err(not_bytes_like(value)),
        }
    }
}

impl ByteBuffer for Payload {
    fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Bytes(bytes) => bytes.as_slice(),
            Payload::Buffer(buffer) => buffer.as_bytes(),
        }
    }
}

fn byte_array(items: &[Value]) -> Option<Vec<u8>> {
    items
        .iter()
        .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect()
}

fn not_bytes_like(value: &Value) -> LockfileError {
    LockfileError::NotBytesLike(value.to_string())
}

/// Format a byte count for log lines.
pub fn format_bytes(n: usize) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let size = n as f64;
    if size >= GIB {
        format!("{:.2} GiB", size / GIB)
    } else if size >= MIB {
        format!("{:.2} MiB", size / MIB)
    } else if size >= KIB {
        format!("{:.2} KiB", size / KIB)
    } else {
        format!("{} bytes", n)
    }
}
