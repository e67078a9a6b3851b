//! # Fixed-item containers
//!
//! `capacity × item_len` bytes, no header. Item `i` lives at `item_offset(i)`:
//!
//! - [`ArrayCodec`]: `i * item_len`, for any fixed-size item.
//! - [`TypedArrayCodec`]: `i << log2(width)`, for numeric scalars.
//!
//! Encoding more items than the capacity truncates. Encoding fewer zero-pads the rest.

use crate::codec::{CodecRef, Encoding};
use crate::scalar::{read_number, write_number};
use std::cmp;
use std::ops::Range;
use tessera_types::{Datum, ScalarKind};

/// The access contract shared by containers of fixed-size items.
pub trait FixedItems {
    fn item(&self) -> &CodecRef;
    fn capacity(&self) -> usize;
    fn item_len(&self) -> usize;

    fn item_offset(&self, index: usize) -> usize {
        index * self.item_len()
    }

    /// The number of whole items `bytes` holds, up to the capacity.
    fn count(&self, bytes: &[u8]) -> usize {
        match self.item_len() {
            0 => self.capacity(),
            item_len => cmp::min(self.capacity(), bytes.len() / item_len),
        }
    }

    fn item_range(&self, bytes: &[u8], index: usize) -> Option<Range<usize>> {
        if index >= self.count(bytes) {
            return None;
        }
        let start = self.item_offset(index);
        Some(start..start + self.item_len())
    }

    /// Compares raw bytes, so no candidate is ever decoded.
    fn index_of(&self, bytes: &[u8], dat: &Datum, from: usize) -> Option<usize> {
        let mut needle = vec![0u8; self.item_len()];
        self.item().encode(dat, &mut needle);
        (from..self.count(bytes)).find(|i| {
            let start = self.item_offset(*i);
            bytes[start..start + needle.len()] == needle[..]
        })
    }

    fn decode_items(&self, bytes: &[u8]) -> Vec<Datum> {
        (0..self.count(bytes))
            .filter_map(|i| self.item_range(bytes, i))
            .map(|range| self.item().decode(&bytes[range]))
            .collect()
    }
}

#[derive(Debug)]
pub struct ArrayCodec {
    item: CodecRef,
    item_len: usize,
    len: usize,
}

impl ArrayCodec {
    /// @arg `item` must have a fixed length.
    pub fn new(item: CodecRef, item_len: usize, len: usize) -> Self {
        Self {
            item,
            item_len,
            len,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.len * self.item_len
    }

    pub fn write_template(&self, bytes: &mut [u8]) {
        let count = self.count(bytes);
        for i in 0..count {
            let start = self.item_offset(i);
            self.item.write_template(&mut bytes[start..start + self.item_len]);
        }
    }

    pub fn encode_into(&self, dat: &Datum, bytes: &mut [u8], amend: bool) -> usize {
        let region_len = cmp::min(self.byte_len(), bytes.len());
        let region = &mut bytes[..region_len];
        if !amend {
            region.fill(0);
        }

        let items = dat.as_list().unwrap_or_default();
        let count = self.count(region);
        for (i, item) in items.iter().take(count).enumerate() {
            if item.is_null() {
                continue;
            }
            let start = self.item_offset(i);
            let slot = &mut region[start..start + self.item_len];
            if amend {
                self.item.encode_amend(item, slot);
            } else {
                self.item.encode(item, slot);
            }
        }
        region_len
    }
}

impl FixedItems for ArrayCodec {
    fn item(&self) -> &CodecRef {
        &self.item
    }
    fn capacity(&self) -> usize {
        self.len
    }
    fn item_len(&self) -> usize {
        self.item_len
    }
}

impl Encoding for ArrayCodec {
    fn fixed_len(&self) -> Option<usize> {
        Some(self.byte_len())
    }
    fn encoded_len(&self, _dat: &Datum) -> usize {
        self.byte_len()
    }
    fn decode(&self, bytes: &[u8]) -> Datum {
        Datum::List(self.decode_items(bytes))
    }
    fn encode(&self, dat: &Datum, bytes: &mut [u8]) -> usize {
        self.encode_into(dat, bytes, false)
    }
}

#[derive(Debug)]
pub struct TypedArrayCodec {
    item: CodecRef,
    kind: ScalarKind,
    len: usize,
}

impl TypedArrayCodec {
    /// @arg `item` must be the scalar codec of `kind`.
    pub fn new(item: CodecRef, kind: ScalarKind, len: usize) -> Self {
        Self { item, kind, len }
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    fn byte_len(&self) -> usize {
        self.len << self.kind.shift()
    }
}

impl FixedItems for TypedArrayCodec {
    fn item(&self) -> &CodecRef {
        &self.item
    }
    fn capacity(&self) -> usize {
        self.len
    }
    fn item_len(&self) -> usize {
        self.kind.width()
    }
    fn item_offset(&self, index: usize) -> usize {
        index << self.kind.shift()
    }
    fn decode_items(&self, bytes: &[u8]) -> Vec<Datum> {
        (0..self.count(bytes))
            .map(|i| read_number(self.kind, &bytes[self.item_offset(i)..]))
            .collect()
    }
}

impl Encoding for TypedArrayCodec {
    fn fixed_len(&self) -> Option<usize> {
        Some(self.byte_len())
    }
    fn encoded_len(&self, _dat: &Datum) -> usize {
        self.byte_len()
    }
    fn decode(&self, bytes: &[u8]) -> Datum {
        Datum::List(self.decode_items(bytes))
    }
    fn encode(&self, dat: &Datum, bytes: &mut [u8]) -> usize {
        let region_len = cmp::min(self.byte_len(), bytes.len());
        let region = &mut bytes[..region_len];
        region.fill(0);

        let items = dat.as_list().unwrap_or_default();
        let count = self.count(region);
        let width = self.kind.width();
        for (i, item) in items.iter().take(count).enumerate() {
            let start = self.item_offset(i);
            write_number(self.kind, item, &mut region[start..start + width]);
        }
        region_len
    }
}
