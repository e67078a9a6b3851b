//! # Scalar codecs
//!
//! Leaf encodings. None of them knows anything about schemas; each only reads
//! and writes itself within the slice it is handed.
//!
//! | Codec | Bytes |
//! |-------|-------|
//! | `Number(kind)` | `kind.width()` bytes, little-endian |
//! | `Text` | raw UTF-8, unterminated, trailing bytes of a fixed slot zero-filled |
//! | `Binary` | raw bytes, trailing bytes of a fixed slot zero-filled |

use crate::codec::Encoding;
use num_traits::ToPrimitive;
use std::cmp;
use std::str;
use tessera_types::{Datum, ScalarKind};

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum ScalarCodec {
    Number(ScalarKind),

    /// A UTF-8 string. With `max_len`, it occupies exactly `max_len` bytes in a fixed slot.
    Text { max_len: Option<usize> },

    /// A byte blob, sized like [`ScalarCodec::Text`].
    Binary { max_len: Option<usize> },
}

impl ScalarCodec {
    fn content<'d>(&self, dat: &'d Datum) -> &'d [u8] {
        dat.as_bytes().unwrap_or_default()
    }

    fn capped(&self, len: usize) -> usize {
        match self {
            Self::Number(kind) => kind.width(),
            Self::Text { max_len } | Self::Binary { max_len } => {
                max_len.map_or(len, |max_len| cmp::min(len, max_len))
            }
        }
    }
}

impl Encoding for ScalarCodec {
    fn fixed_len(&self) -> Option<usize> {
        match self {
            Self::Number(kind) => Some(kind.width()),
            Self::Text { max_len } | Self::Binary { max_len } => *max_len,
        }
    }

    fn encoded_len(&self, dat: &Datum) -> usize {
        self.capped(self.content(dat).len())
    }

    fn decode(&self, bytes: &[u8]) -> Datum {
        match self {
            Self::Number(kind) => read_number(*kind, bytes),
            Self::Text { .. } => Datum::Str(decode_text(bytes)),
            Self::Binary { .. } => {
                let len = self.fixed_len().map_or(bytes.len(), |len| cmp::min(len, bytes.len()));
                Datum::Bytes(bytes[..len].to_vec())
            }
        }
    }

    fn encode(&self, dat: &Datum, bytes: &mut [u8]) -> usize {
        match self {
            Self::Number(kind) => match bytes.get_mut(..kind.width()) {
                None => 0,
                Some(out) => {
                    write_number(*kind, dat, out);
                    out.len()
                }
            },
            Self::Text { .. } | Self::Binary { .. } => {
                let src = self.content(dat);
                let content_len = cmp::min(self.capped(src.len()), bytes.len());
                let dest_len = self
                    .fixed_len()
                    .map_or(content_len, |len| cmp::min(len, bytes.len()));
                bytes[..content_len].copy_from_slice(&src[..content_len]);
                bytes[content_len..dest_len].fill(0);
                dest_len
            }
        }
    }
}

/// Content ends at the first zero byte, which is where zero-filling starts.
/// A code point split by truncation decodes lossily instead of failing.
fn decode_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    let content = &bytes[..end];
    match str::from_utf8(content) {
        Ok(s) => s.to_owned(),
        Err(_) => String::from_utf8_lossy(content).into_owned(),
    }
}

pub fn read_number(kind: ScalarKind, bytes: &[u8]) -> Datum {
    let mut buf = [0u8; 8];
    let width = cmp::min(kind.width(), bytes.len());
    buf[..width].copy_from_slice(&bytes[..width]);
    match kind {
        ScalarKind::Bool => Datum::Bool(buf[0] != 0),
        ScalarKind::Int8 => Datum::Int(i64::from(buf[0] as i8)),
        ScalarKind::Uint8 => Datum::Int(i64::from(buf[0])),
        ScalarKind::Int16 => Datum::Int(i64::from(i16::from_le_bytes([buf[0], buf[1]]))),
        ScalarKind::Uint16 => Datum::Int(i64::from(u16::from_le_bytes([buf[0], buf[1]]))),
        ScalarKind::Int32 => Datum::Int(i64::from(i32::from_le_bytes([
            buf[0], buf[1], buf[2], buf[3],
        ]))),
        ScalarKind::Uint32 => Datum::Int(i64::from(u32::from_le_bytes([
            buf[0], buf[1], buf[2], buf[3],
        ]))),
        ScalarKind::Float32 => Datum::Float(f64::from(f32::from_le_bytes([
            buf[0], buf[1], buf[2], buf[3],
        ]))),
        ScalarKind::BigInt64 => Datum::Int(i64::from_le_bytes(buf)),
        ScalarKind::BigUint64 => Datum::UInt(u64::from_le_bytes(buf)),
        ScalarKind::Float64 => Datum::Float(f64::from_le_bytes(buf)),
    }
}

/// Writes `kind.width()` bytes. Integers wrap to the width. Non-numeric data writes zero.
pub fn write_number(kind: ScalarKind, dat: &Datum, out: &mut [u8]) {
    let int = || dat.to_i64().unwrap_or_default();
    let float = || dat.to_f64().unwrap_or_default();
    match kind {
        ScalarKind::Bool => out[0] = u8::from(int() != 0),
        ScalarKind::Int8 | ScalarKind::Uint8 => out[0] = int() as u8,
        ScalarKind::Int16 | ScalarKind::Uint16 => {
            out[..2].copy_from_slice(&(int() as u16).to_le_bytes())
        }
        ScalarKind::Int32 | ScalarKind::Uint32 => {
            out[..4].copy_from_slice(&(int() as u32).to_le_bytes())
        }
        ScalarKind::Float32 => out[..4].copy_from_slice(&(float() as f32).to_le_bytes()),
        ScalarKind::BigInt64 => out[..8].copy_from_slice(&int().to_le_bytes()),
        ScalarKind::BigUint64 => {
            let uint = dat.to_u64().unwrap_or_default();
            out[..8].copy_from_slice(&uint.to_le_bytes())
        }
        ScalarKind::Float64 => out[..8].copy_from_slice(&float().to_le_bytes()),
    }
}
