//! # Open-key record
//!
//! ```text
//! +----------------------------+--------------------+-------------------------+
//! | values (a vector region)   | keys offset (u32)  | keys [key; count]       |
//! +----------------------------+--------------------+-------------------------+
//! ```
//!
//! Key `i` pairs with value `i`. The value vector carries the count and ends at
//! its own last table entry, so the keys can be found without decoding any value.
//! Keys need be neither unique nor ordered.
//!
//! Natively a dict is a [`Datum::Record`], whose keys are strings. Numeric keys are
//! parsed on the way in and printed on the way out.

use crate::codec::{Codec, CodecRef, Encoding};
use crate::lengths::{HeaderInt, HEADER_INT_LEN};
use crate::scalar::ScalarCodec;
use crate::vector::VectorCodec;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Range;
use tessera_types::{Datum, ScalarKind};

#[derive(Debug)]
pub struct DictCodec {
    key: CodecRef,
    key_len: usize,
    values: VectorCodec,
}

impl DictCodec {
    /// @arg `key` must have a fixed length of `key_len`.
    pub fn new(key: CodecRef, key_len: usize, value: CodecRef) -> Self {
        Self {
            key,
            key_len,
            values: VectorCodec::new(value, None),
        }
    }

    pub fn key(&self) -> &CodecRef {
        &self.key
    }

    pub fn value(&self) -> &CodecRef {
        self.values.item()
    }

    pub fn values(&self) -> &VectorCodec {
        &self.values
    }

    /// The smallest dict: an empty value vector and the keys offset.
    fn min_len() -> usize {
        VectorCodec::header_len(0) + HEADER_INT_LEN
    }

    fn overhead_len(&self, count: usize) -> usize {
        VectorCodec::header_len(count) + HEADER_INT_LEN + count * self.key_len
    }

    pub fn count(&self, bytes: &[u8]) -> usize {
        self.values.count(bytes)
    }

    fn keys_offset(&self, bytes: &[u8]) -> usize {
        HeaderInt::read_len(bytes, self.values.used_len(bytes))
    }

    pub fn used_len(&self, bytes: &[u8]) -> usize {
        self.keys_offset(bytes) + self.count(bytes) * self.key_len
    }

    fn key_range(&self, bytes: &[u8], index: usize) -> Option<Range<usize>> {
        let start = self.keys_offset(bytes) + index * self.key_len;
        let end = start + self.key_len;
        (index < self.count(bytes) && end <= bytes.len()).then_some(start..end)
    }

    fn is_numeric_key(&self) -> bool {
        matches!(&*self.key, Codec::Scalar(ScalarCodec::Number(_)))
    }

    /// Turns a lookup key into what the key codec expects.
    fn normalize_key<'k>(&self, key: &'k Datum) -> Cow<'k, Datum> {
        match key {
            Datum::Str(s) if self.is_numeric_key() => Cow::Owned(parse_key(s)),
            _ => Cow::Borrowed(key),
        }
    }

    /// Prints a decoded key back as a record key. A `float32` key prints at its own
    /// precision, so `"0.1"` comes back as `"0.1"`.
    fn key_string(&self, dat: &Datum) -> String {
        match (&*self.key, dat) {
            (Codec::Scalar(ScalarCodec::Number(ScalarKind::Float32)), Datum::Float(f)) => {
                (*f as f32).to_string()
            }
            _ => key_string(dat),
        }
    }

    /// Linear scan over the raw key bytes.
    pub fn key_index(&self, bytes: &[u8], key: &Datum, from: usize) -> Option<usize> {
        let mut needle = vec![0u8; self.key_len];
        self.key.encode(&self.normalize_key(key), &mut needle);
        (from..self.count(bytes)).find(|i| {
            self.key_range(bytes, *i)
                .map_or(false, |range| bytes[range] == needle[..])
        })
    }

    /// The value range of the first entry under `key`. `None` if absent or a hole.
    pub fn entry_range(&self, bytes: &[u8], key: &Datum) -> Option<Range<usize>> {
        let index = self.key_index(bytes, key, 0)?;
        self.values.item_range(bytes, index)
    }
}

impl Encoding for DictCodec {
    fn fixed_len(&self) -> Option<usize> {
        None
    }

    fn encoded_len(&self, dat: &Datum) -> usize {
        let Some(entries) = dat.as_record() else {
            return Self::min_len();
        };
        let values_len = self.values.items_len(entries.values());
        values_len + HEADER_INT_LEN + entries.len() * self.key_len
    }

    fn decode(&self, bytes: &[u8]) -> Datum {
        let mut out = BTreeMap::new();
        let values = self.values.decode_items(bytes);
        for (i, value) in values.into_iter().enumerate() {
            let Some(range) = self.key_range(bytes, i) else {
                break;
            };
            let key = self.key_string(&self.key.decode(&bytes[range]));
            out.entry(key).or_insert(value);
        }
        Datum::Record(out)
    }

    /// Trailing entries are dropped until the table and the keys fit,
    /// then values that do not fit become holes.
    ///
    /// @return Bytes written. `0` iff not even an empty dict fit.
    fn encode(&self, dat: &Datum, bytes: &mut [u8]) -> usize {
        if bytes.len() < Self::min_len() {
            return 0;
        }
        let empty = BTreeMap::new();
        let entries = dat.as_record().unwrap_or(&empty);
        let mut count = entries.len();
        while self.overhead_len(count) > bytes.len() {
            count -= 1;
        }

        let values_room = bytes.len() - HEADER_INT_LEN - count * self.key_len;
        let values_len = self
            .values
            .encode_items(entries.values().take(count), &mut bytes[..values_room]);
        let keys_offset = values_len + HEADER_INT_LEN;
        HeaderInt::from_len(keys_offset).write(bytes, values_len);

        for (i, key) in entries.keys().take(count).enumerate() {
            let start = keys_offset + i * self.key_len;
            let key_dat = if self.is_numeric_key() {
                parse_key(key)
            } else {
                Datum::from(key.as_str())
            };
            self.key.encode(&key_dat, &mut bytes[start..start + self.key_len]);
        }
        keys_offset + count * self.key_len
    }
}

/// Unparseable numeric keys become [`Datum::Null`], which encodes as zero.
fn parse_key(key: &str) -> Datum {
    if let Ok(i) = key.parse::<i64>() {
        Datum::Int(i)
    } else if let Ok(u) = key.parse::<u64>() {
        Datum::UInt(u)
    } else if let Ok(f) = key.parse::<f64>() {
        Datum::Float(f)
    } else if let Ok(b) = key.parse::<bool>() {
        Datum::Bool(b)
    } else {
        Datum::Null
    }
}

fn key_string(dat: &Datum) -> String {
    match dat {
        Datum::Str(s) => s.clone(),
        Datum::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        Datum::Bool(b) => b.to_string(),
        Datum::Int(i) => i.to_string(),
        Datum::UInt(u) => u.to_string(),
        Datum::Float(f) => f.to_string(),
        Datum::Null | Datum::List(_) | Datum::Record(_) => String::new(),
    }
}
