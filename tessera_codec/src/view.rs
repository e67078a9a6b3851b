//! # Zero-copy access
//!
//! A [`View`] pairs a compiled codec with the bytes of one encoded value. Reading
//! a field or an item resolves its byte range through the layout and hands back a
//! narrower view, so nothing is decoded until [`View::to_datum`] is called on the
//! part actually wanted.
//!
//! ```ignore
//! let view = registry.view(&buf)?;
//! let name = view.field("name")?.to_datum();
//! let third = view.field("members")?.at(-1)?.get("name");
//! ```

use crate::codec::{Codec, Encoding};
use crate::record::FieldIdx;
use anyhow::Result;
use std::ops::Range;
use tessera_types::Datum;

#[derive(Clone, Copy, Debug)]
pub struct View<'a> {
    codec: &'a Codec,
    bytes: &'a [u8],
}

impl<'a> View<'a> {
    /// @arg `bytes` starts at the value. Trailing bytes past the value are ignored.
    pub fn new(codec: &'a Codec, bytes: &'a [u8]) -> Self {
        Self { codec, bytes }
    }

    pub fn codec(&self) -> &'a Codec {
        self.codec
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    fn narrow(&self, codec: &'a Codec, range: Range<usize>) -> Option<View<'a>> {
        let bytes = self.bytes.get(range)?;
        Some(View::new(codec, bytes))
    }

    pub fn to_datum(&self) -> Datum {
        self.codec.decode(self.bytes)
    }

    /// Decodes into a native type instead of a [`Datum`].
    pub fn decode_as<T>(&self) -> Result<T>
    where
        T: TryFrom<Datum, Error = anyhow::Error>,
    {
        T::try_from(self.to_datum())
    }

    /* Records */

    pub fn field_idx(&self, name: &str) -> Option<FieldIdx> {
        self.codec.fields()?.idx(name)
    }

    /// @return `None` for an unknown field, or an optional field that is absent.
    pub fn field_at(&self, idx: FieldIdx) -> Option<View<'a>> {
        let (codec, range) = self.codec.field_range(self.bytes, idx)?;
        self.narrow(codec, range)
    }

    pub fn field(&self, name: &str) -> Option<View<'a>> {
        self.field_at(self.field_idx(name)?)
    }

    pub fn get(&self, name: &str) -> Option<Datum> {
        Some(self.field(name)?.to_datum())
    }

    /* Containers */

    pub fn len(&self) -> usize {
        self.codec.item_count(self.bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// @return `None` for a hole, or an index past the end.
    pub fn item(&self, index: usize) -> Option<View<'a>> {
        let (codec, range) = self.codec.item_range(self.bytes, index)?;
        self.narrow(codec, range)
    }

    pub fn get_item(&self, index: usize) -> Option<Datum> {
        Some(self.item(index)?.to_datum())
    }

    /// Like [`Self::item`], with negative indices counting back from the end.
    pub fn at(&self, index: isize) -> Option<View<'a>> {
        let index = match usize::try_from(index) {
            Ok(index) => index,
            Err(_) => self.len().checked_sub(index.unsigned_abs())?,
        };
        self.item(index)
    }

    pub fn index_of(&self, dat: &Datum, from: usize) -> Option<usize> {
        self.codec.index_of(self.bytes, dat, from)
    }

    /* Dicts */

    pub fn entry(&self, key: &Datum) -> Option<View<'a>> {
        let (codec, range) = self.codec.entry_range(self.bytes, key)?;
        self.narrow(codec, range)
    }

    pub fn get_key(&self, key: &Datum) -> Option<Datum> {
        Some(self.entry(key)?.to_datum())
    }
}

/// In-place writes into an encoded value.
///
/// A slot is only ever overwritten within its existing bounds. Fixed slots always
/// fit. A variable slot (an optional map field, a vector item, a dict value) takes
/// the new value only if its encoding is no longer than the old one, since growing
/// it would shift everything after it. A blob in a variable slot must keep its length.
#[derive(Debug)]
pub struct ViewMut<'a> {
    codec: &'a Codec,
    bytes: &'a mut [u8],
}

impl<'a> ViewMut<'a> {
    pub fn new(codec: &'a Codec, bytes: &'a mut [u8]) -> Self {
        Self { codec, bytes }
    }

    pub fn as_view(&self) -> View<'_> {
        View::new(self.codec, self.bytes)
    }

    fn narrow_mut(&mut self, codec: &'a Codec, range: Range<usize>) -> Option<ViewMut<'_>> {
        let bytes = self.bytes.get_mut(range)?;
        Some(ViewMut::new(codec, bytes))
    }

    /// Overwrites the whole value, within the current bounds.
    pub fn write(&mut self, dat: &Datum) -> bool {
        if !self.codec.fits_slot(dat, self.bytes.len()) {
            return false;
        }
        self.bytes.fill(0);
        self.codec.encode_fresh(dat, self.bytes);
        true
    }

    pub fn field_mut(&mut self, name: &str) -> Option<ViewMut<'_>> {
        let idx = self.codec.fields()?.idx(name)?;
        let (codec, range) = self.codec.field_range(self.bytes, idx)?;
        self.narrow_mut(codec, range)
    }

    /// @return Whether the field was written. `false` for an unknown field, an
    /// absent optional field, or a value too long for its slot.
    pub fn set(&mut self, name: &str, dat: &Datum) -> bool {
        self.field_mut(name).map_or(false, |mut field| field.write(dat))
    }

    pub fn item_mut(&mut self, index: usize) -> Option<ViewMut<'_>> {
        let (codec, range) = self.codec.item_range(self.bytes, index)?;
        self.narrow_mut(codec, range)
    }

    pub fn set_item(&mut self, index: usize, dat: &Datum) -> bool {
        self.item_mut(index).map_or(false, |mut item| item.write(dat))
    }

    pub fn entry_mut(&mut self, key: &Datum) -> Option<ViewMut<'_>> {
        let (codec, range) = self.codec.entry_range(self.bytes, key)?;
        self.narrow_mut(codec, range)
    }

    pub fn set_key(&mut self, key: &Datum, dat: &Datum) -> bool {
        self.entry_mut(key).map_or(false, |mut entry| entry.write(dat))
    }
}
