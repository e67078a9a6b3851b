use crate::array::{ArrayCodec, FixedItems, TypedArrayCodec};
use crate::dict::DictCodec;
use crate::record::{FieldIdx, Fields, MapCodec, ObjectCodec};
use crate::scalar::ScalarCodec;
use crate::vector::VectorCodec;
use std::ops::Range;
use std::sync::Arc;
use tessera_types::Datum;

/// The contract every codec family fulfills.
///
/// Every method works on a slice that starts where the value starts.
/// Nothing ever reads or writes past the end of the slice it is handed.
pub trait Encoding {
    /// `Some` iff every value occupies the same number of bytes.
    fn fixed_len(&self) -> Option<usize>;

    /// Bytes needed to hold `dat` in full, as an item of a variable-length container.
    /// Strings and blobs report their content length, capped at `maxLength`. Every
    /// other fixed-length codec reports [`Self::fixed_len`].
    fn encoded_len(&self, dat: &Datum) -> usize;

    fn decode(&self, bytes: &[u8]) -> Datum;

    /// Overwrites the value's region, zeroing whatever `dat` leaves unset.
    ///
    /// @return Bytes written. Less than [`Self::encoded_len`] when `bytes` is too short,
    /// in which case the parts that did not fit were dropped.
    fn encode(&self, dat: &Datum, bytes: &mut [u8]) -> usize;
}

/// A compiled codec. One variant per layout strategy, with the layout held as data.
#[derive(Debug)]
pub enum Codec {
    Scalar(ScalarCodec),
    Array(ArrayCodec),
    TypedArray(TypedArrayCodec),
    Vector(VectorCodec),
    Object(ObjectCodec),
    Map(MapCodec),
    Dict(DictCodec),
}

/// Codecs are immutable once compiled, and shared by every schema that nests them.
pub type CodecRef = Arc<Codec>;

impl Codec {
    fn as_encoding(&self) -> &dyn Encoding {
        match self {
            Self::Scalar(c) => c,
            Self::Array(c) => c,
            Self::TypedArray(c) => c,
            Self::Vector(c) => c,
            Self::Object(c) => c,
            Self::Map(c) => c,
            Self::Dict(c) => c,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Array(_) => "array",
            Self::TypedArray(_) => "typed_array",
            Self::Vector(_) => "vector",
            Self::Object(_) => "object",
            Self::Map(_) => "map",
            Self::Dict(_) => "dict",
        }
    }

    /// Seeds a region with the baked-in defaults. Regions without defaults are zeroed.
    pub fn write_template(&self, bytes: &mut [u8]) {
        match self {
            Self::Object(c) => c.write_template(bytes),
            Self::Map(c) => c.write_template(bytes),
            Self::Array(c) => c.write_template(bytes),
            _ => {
                let len = self.fixed_len().unwrap_or(0).min(bytes.len());
                bytes[..len].fill(0);
            }
        }
    }

    /// Like [`Encoding::encode`], but fields absent from `dat` keep the bytes already there.
    pub fn encode_amend(&self, dat: &Datum, bytes: &mut [u8]) -> usize {
        match self {
            Self::Object(c) => c.encode_into(dat, bytes, true),
            Self::Map(c) => c.encode_into(dat, bytes, true),
            Self::Array(c) => c.encode_into(dat, bytes, true),
            _ => self.encode(dat, bytes),
        }
    }

    /// Encodes over the default template, so that unsupplied fields surface their defaults.
    pub fn encode_fresh(&self, dat: &Datum, bytes: &mut [u8]) -> usize {
        self.write_template(bytes);
        self.encode_amend(dat, bytes)
    }

    /// Encodes into a new buffer sized exactly to the content.
    pub fn from_datum(&self, dat: &Datum) -> Vec<u8> {
        let len = self.fixed_len().unwrap_or_else(|| self.encoded_len(dat));
        let mut buf = vec![0u8; len];
        let w_len = self.encode_fresh(dat, &mut buf);
        buf.truncate(w_len);
        buf
    }

    /// How many bytes of `bytes` the value actually occupies.
    pub fn used_len(&self, bytes: &[u8]) -> usize {
        let len = match self {
            Self::Vector(c) => c.used_len(bytes),
            Self::Map(c) => c.used_len(bytes),
            Self::Dict(c) => c.used_len(bytes),
            _ => self.fixed_len().unwrap_or(bytes.len()),
        };
        len.min(bytes.len())
    }

    /// Whether `dat` can overwrite a slot of `slot_len` bytes, zero-filling the rest,
    /// and still read back unchanged.
    ///
    /// Text stops at the first zero byte, and containers and records carry their own
    /// lengths, so any shorter encoding fits. A blob reads to the end of its slot, so it
    /// must fill the slot exactly, unless the slot is its own fixed length.
    pub fn fits_slot(&self, dat: &Datum, slot_len: usize) -> bool {
        let len = self.encoded_len(dat);
        match self {
            Self::Scalar(ScalarCodec::Binary { .. }) => {
                len == slot_len || (len < slot_len && self.fixed_len() == Some(slot_len))
            }
            _ => len <= slot_len,
        }
    }

    pub fn fields(&self) -> Option<&Fields> {
        match self {
            Self::Object(c) => Some(c.fields()),
            Self::Map(c) => Some(c.fields()),
            _ => None,
        }
    }

    /// The codec and byte range of a record field. `None` for an absent optional field.
    pub fn field_range(&self, bytes: &[u8], idx: FieldIdx) -> Option<(&CodecRef, Range<usize>)> {
        match self {
            Self::Object(c) => c.field_range(idx),
            Self::Map(c) => c.field_range(bytes, idx),
            _ => None,
        }
    }

    /// Item count of a container, or entry count of a dict.
    pub fn item_count(&self, bytes: &[u8]) -> usize {
        match self {
            Self::Array(c) => c.count(bytes),
            Self::TypedArray(c) => c.count(bytes),
            Self::Vector(c) => c.count(bytes),
            Self::Dict(c) => c.count(bytes),
            _ => 0,
        }
    }

    /// The codec and byte range of a container item. `None` for a hole or out of range.
    pub fn item_range(&self, bytes: &[u8], index: usize) -> Option<(&CodecRef, Range<usize>)> {
        match self {
            Self::Array(c) => Some((c.item(), c.item_range(bytes, index)?)),
            Self::TypedArray(c) => Some((c.item(), c.item_range(bytes, index)?)),
            Self::Vector(c) => Some((c.item(), c.item_range(bytes, index)?)),
            Self::Dict(c) => Some((c.value(), c.values().item_range(bytes, index)?)),
            _ => None,
        }
    }

    /// The codec and byte range of the dict value stored under `key`.
    pub fn entry_range(&self, bytes: &[u8], key: &Datum) -> Option<(&CodecRef, Range<usize>)> {
        match self {
            Self::Dict(c) => Some((c.value(), c.entry_range(bytes, key)?)),
            _ => None,
        }
    }

    /// First item at or after `from` whose encoded bytes equal those of `dat`.
    pub fn index_of(&self, bytes: &[u8], dat: &Datum, from: usize) -> Option<usize> {
        match self {
            Self::Array(c) => c.index_of(bytes, dat, from),
            Self::TypedArray(c) => c.index_of(bytes, dat, from),
            Self::Dict(c) => c.key_index(bytes, dat, from),
            _ => None,
        }
    }
}

impl Encoding for Codec {
    fn fixed_len(&self) -> Option<usize> {
        self.as_encoding().fixed_len()
    }
    fn encoded_len(&self, dat: &Datum) -> usize {
        self.as_encoding().encoded_len(dat)
    }
    fn decode(&self, bytes: &[u8]) -> Datum {
        self.as_encoding().decode(bytes)
    }
    fn encode(&self, dat: &Datum, bytes: &mut [u8]) -> usize {
        self.as_encoding().encode(dat, bytes)
    }
}
