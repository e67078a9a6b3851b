//! # Variable-item container
//!
//! ```text
//! +-------------+------------------------------+---------------------------+
//! | count (u32) | entries [u32; count + 1]     | item bytes, contiguous    |
//! +-------------+------------------------------+---------------------------+
//! ```
//!
//! Offsets are relative to the start of the vector. `entries[0]` is the end of the
//! table, and `entries[i + 1]` is the end of item `i`, so item `i` spans
//! `entries[i]..entries[i + 1]` and `entries[count]` is the total length.
//!
//! A hole is a zero-length span. There is no other null marker, so an item that
//! encodes to zero bytes reads back as a hole too.

use crate::codec::{CodecRef, Encoding};
use crate::lengths::{HeaderInt, HEADER_INT_LEN};
use std::ops::Range;
use tessera_types::Datum;

#[derive(Debug)]
pub struct VectorCodec {
    item: CodecRef,
    max_items: Option<usize>,
}

impl VectorCodec {
    pub fn new(item: CodecRef, max_items: Option<usize>) -> Self {
        Self { item, max_items }
    }

    pub fn item(&self) -> &CodecRef {
        &self.item
    }

    pub fn header_len(count: usize) -> usize {
        HEADER_INT_LEN + (count + 1) * HEADER_INT_LEN
    }

    fn entry_at(index: usize) -> usize {
        HEADER_INT_LEN + index * HEADER_INT_LEN
    }

    fn capped<'d>(&self, items: &'d [Datum]) -> &'d [Datum] {
        match self.max_items {
            Some(max_items) if max_items < items.len() => &items[..max_items],
            _ => items,
        }
    }

    pub fn count(&self, bytes: &[u8]) -> usize {
        HeaderInt::read_len(bytes, 0)
    }

    pub fn used_len(&self, bytes: &[u8]) -> usize {
        let count = self.count(bytes);
        HeaderInt::read_len(bytes, Self::entry_at(count))
    }

    /// @return `None` for a hole, or an index past the count.
    pub fn item_range(&self, bytes: &[u8], index: usize) -> Option<Range<usize>> {
        if index >= self.count(bytes) {
            return None;
        }
        let start = HeaderInt::read(bytes, Self::entry_at(index))?.as_usize();
        let end = HeaderInt::read(bytes, Self::entry_at(index + 1))?.as_usize();
        if end <= start || end > bytes.len() {
            return None;
        }
        Some(start..end)
    }

    /// Exact size of the given items, table included.
    pub fn items_len<'d>(&self, items: impl ExactSizeIterator<Item = &'d Datum>) -> usize {
        let header_len = Self::header_len(items.len());
        let data_len = items
            .filter(|item| !item.is_null())
            .map(|item| self.item.encoded_len(item))
            .sum::<usize>();
        header_len + data_len
    }

    /// Items are written over their codec's default template. Items that would
    /// overflow `bytes` are dropped and recorded as holes,
    /// so the count and the table always agree with what was written.
    ///
    /// @return Bytes written. `0` iff not even the table fit.
    pub fn encode_items<'d>(
        &self,
        items: impl ExactSizeIterator<Item = &'d Datum>,
        bytes: &mut [u8],
    ) -> usize {
        let mut count = items.len();
        if bytes.len() < Self::header_len(0) {
            return 0;
        }
        while Self::header_len(count) > bytes.len() {
            count -= 1;
        }

        HeaderInt::from_len(count).write(bytes, 0);
        let mut cursor = Self::header_len(count);
        HeaderInt::from_len(cursor).write(bytes, Self::entry_at(0));

        for (i, item) in items.take(count).enumerate() {
            if !item.is_null() {
                let item_len = self.item.encoded_len(item);
                if cursor + item_len <= bytes.len() {
                    let slot = &mut bytes[cursor..cursor + item_len];
                    let w_len = self.item.encode_fresh(item, slot);
                    cursor += w_len;
                }
            }
            HeaderInt::from_len(cursor).write(bytes, Self::entry_at(i + 1));
        }
        cursor
    }

    pub fn decode_items(&self, bytes: &[u8]) -> Vec<Datum> {
        (0..self.count(bytes))
            .map(|i| match self.item_range(bytes, i) {
                None => Datum::Null,
                Some(range) => self.item.decode(&bytes[range]),
            })
            .collect()
    }
}

impl Encoding for VectorCodec {
    fn fixed_len(&self) -> Option<usize> {
        None
    }
    fn encoded_len(&self, dat: &Datum) -> usize {
        let items = self.capped(dat.as_list().unwrap_or_default());
        self.items_len(items.iter())
    }
    fn decode(&self, bytes: &[u8]) -> Datum {
        Datum::List(self.decode_items(bytes))
    }
    fn encode(&self, dat: &Datum, bytes: &mut [u8]) -> usize {
        let items = self.capped(dat.as_list().unwrap_or_default());
        self.encode_items(items.iter(), bytes)
    }
}
