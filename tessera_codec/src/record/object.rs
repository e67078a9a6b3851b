use super::{
    decode_fixed_fields, encode_fixed_fields, fixed_region_len, write_fixed_defaults, FieldIdx,
    Fields, Slot,
};
use crate::codec::{CodecRef, Encoding};
use std::cmp;
use std::collections::BTreeMap;
use std::ops::Range;
use tessera_types::Datum;

/// A fixed-layout record: every field at a compile-time offset, no header.
///
/// The default template is the record's bytes with nothing supplied. Encoding
/// over it (rather than over zeros) is what makes unsupplied fields read back
/// as their defaults.
#[derive(Debug)]
pub struct ObjectCodec {
    fields: Fields,
    len: usize,
    template: Vec<u8>,
}

impl ObjectCodec {
    /// @arg `fields` must all be [`Slot::Fixed`], packed contiguously in declaration order.
    pub fn new(fields: Fields) -> Self {
        let len = fixed_region_len(&fields);
        let mut template = vec![0u8; len];
        write_fixed_defaults(&fields, &mut template);
        Self {
            fields,
            len,
            template,
        }
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn template(&self) -> &[u8] {
        &self.template
    }

    pub fn write_template(&self, bytes: &mut [u8]) {
        let len = cmp::min(self.len, bytes.len());
        bytes[..len].copy_from_slice(&self.template[..len]);
    }

    pub fn field_range(&self, idx: FieldIdx) -> Option<(&CodecRef, Range<usize>)> {
        let layout = self.fields.get(idx)?;
        match layout.slot {
            Slot::Fixed { start, len } => Some((&layout.codec, start..start + len)),
            Slot::Optional { .. } => None,
        }
    }

    /// @arg `amend` When set, the region is not zeroed first, so fields absent
    /// from `dat` keep the bytes already there.
    pub fn encode_into(&self, dat: &Datum, bytes: &mut [u8], amend: bool) -> usize {
        let Some(region) = bytes.get_mut(..self.len) else {
            return 0;
        };
        if !amend {
            region.fill(0);
        }
        encode_fixed_fields(&self.fields, dat, region);
        self.len
    }
}

impl Encoding for ObjectCodec {
    fn fixed_len(&self) -> Option<usize> {
        Some(self.len)
    }
    fn encoded_len(&self, _dat: &Datum) -> usize {
        self.len
    }
    fn decode(&self, bytes: &[u8]) -> Datum {
        let mut out = BTreeMap::new();
        decode_fixed_fields(&self.fields, bytes, &mut out);
        Datum::Record(out)
    }
    fn encode(&self, dat: &Datum, bytes: &mut [u8]) -> usize {
        self.encode_into(dat, bytes, false)
    }
}
