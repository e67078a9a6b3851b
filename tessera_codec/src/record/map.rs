//! # Mixed-layout record
//!
//! ```text
//! +-----------------+---------------------------------+------------------+----------------+
//! | required fields | optional end offsets [u32; n]   | used length u32  | optional bytes |
//! +-----------------+---------------------------------+------------------+----------------+
//! ```
//!
//! End offsets are relative to the start of the map. The first optional field starts
//! right after the used-length slot, every later one where its predecessor ended.

use super::{
    decode_fixed_fields, encode_fixed_fields, fixed_region_len, write_fixed_defaults, FieldIdx,
    FieldLayout, Fields, Slot,
};
use crate::codec::{CodecRef, Encoding};
use crate::lengths::{HeaderInt, HEADER_INT_LEN};
use std::cmp;
use std::collections::BTreeMap;
use std::ops::Range;
use tessera_types::Datum;

#[derive(Debug)]
pub struct MapCodec {
    fields: Fields,
    prefix_len: usize,
    optional_count: usize,
    template: Vec<u8>,
}

impl MapCodec {
    /// @arg `fields` Required fields as [`Slot::Fixed`] packed from offset 0,
    /// optional ones as [`Slot::Optional`] numbered from 0 in declaration order.
    pub fn new(fields: Fields) -> Self {
        let prefix_len = fixed_region_len(&fields);
        let optional_count = fields
            .iter()
            .filter(|layout| matches!(layout.slot, Slot::Optional { .. }))
            .count();
        let mut template = vec![0u8; prefix_len];
        write_fixed_defaults(&fields, &mut template);
        Self {
            fields,
            prefix_len,
            optional_count,
            template,
        }
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    fn entry_at(&self, ordinal: usize) -> usize {
        self.prefix_len + ordinal * HEADER_INT_LEN
    }

    fn used_len_at(&self) -> usize {
        self.entry_at(self.optional_count)
    }

    /// Where optional bytes begin. Also the size of a map with every optional field absent.
    pub fn data_start(&self) -> usize {
        self.used_len_at() + HEADER_INT_LEN
    }

    pub fn used_len(&self, bytes: &[u8]) -> usize {
        HeaderInt::read_len(bytes, self.used_len_at())
    }

    fn optional_fields(&self) -> impl Iterator<Item = (&FieldLayout, usize)> {
        self.fields.iter().filter_map(|layout| match layout.slot {
            Slot::Optional { ordinal } => Some((layout, ordinal)),
            Slot::Fixed { .. } => None,
        })
    }

    /// The most an optional field may take: its natural size, capped by `maxLength`.
    fn optional_len(layout: &FieldLayout, dat: &Datum) -> usize {
        let natural = layout.codec.encoded_len(dat);
        layout.max_len.map_or(natural, |max_len| cmp::min(natural, max_len))
    }

    fn optional_range(&self, bytes: &[u8], ordinal: usize) -> Option<Range<usize>> {
        let start = match ordinal {
            0 => self.data_start(),
            _ => HeaderInt::read(bytes, self.entry_at(ordinal - 1))?.as_usize(),
        };
        let end = HeaderInt::read(bytes, self.entry_at(ordinal))?.as_usize();
        if end <= start || end > bytes.len() {
            return None;
        }
        Some(start..end)
    }

    pub fn field_range(&self, bytes: &[u8], idx: FieldIdx) -> Option<(&CodecRef, Range<usize>)> {
        let layout = self.fields.get(idx)?;
        let range = match layout.slot {
            Slot::Fixed { start, len } => start..start + len,
            Slot::Optional { ordinal } => self.optional_range(bytes, ordinal)?,
        };
        Some((&layout.codec, range))
    }

    pub fn write_template(&self, bytes: &mut [u8]) {
        let len = cmp::min(self.prefix_len, bytes.len());
        bytes[..len].copy_from_slice(&self.template[..len]);
    }

    /// Optional fields are written in declaration order, each into whatever room
    /// its predecessors left. One that does not fit becomes a hole.
    ///
    /// @return Bytes written, equal to the stored used length. `0` iff the
    /// required prefix and the table did not fit.
    pub fn encode_into(&self, dat: &Datum, bytes: &mut [u8], amend: bool) -> usize {
        let data_start = self.data_start();
        if bytes.len() < data_start {
            return 0;
        }
        let prefix = &mut bytes[..self.prefix_len];
        if !amend {
            prefix.fill(0);
        }
        encode_fixed_fields(&self.fields, dat, prefix);

        let mut cursor = data_start;
        for (layout, ordinal) in self.optional_fields() {
            if let Some(field_dat) = layout.pick(dat) {
                let field_len = Self::optional_len(layout, field_dat);
                if field_len > 0 && cursor + field_len <= bytes.len() {
                    let slot = &mut bytes[cursor..cursor + field_len];
                    cursor += layout.codec.encode_fresh(field_dat, slot);
                }
            }
            HeaderInt::from_len(cursor).write(bytes, self.entry_at(ordinal));
        }
        HeaderInt::from_len(cursor).write(bytes, self.used_len_at());
        cursor
    }
}

impl Encoding for MapCodec {
    fn fixed_len(&self) -> Option<usize> {
        None
    }

    fn encoded_len(&self, dat: &Datum) -> usize {
        let data_len = self
            .optional_fields()
            .filter_map(|(layout, _)| Some(Self::optional_len(layout, layout.pick(dat)?)))
            .sum::<usize>();
        self.data_start() + data_len
    }

    fn decode(&self, bytes: &[u8]) -> Datum {
        let mut out = BTreeMap::new();
        decode_fixed_fields(&self.fields, bytes, &mut out);
        for (layout, ordinal) in self.optional_fields() {
            if let Some(range) = self.optional_range(bytes, ordinal) {
                out.insert(layout.name.clone(), layout.codec.decode(&bytes[range]));
            }
        }
        Datum::Record(out)
    }

    fn encode(&self, dat: &Datum, bytes: &mut [u8]) -> usize {
        self.encode_into(dat, bytes, false)
    }
}
