//! # Records
//!
//! Heterogeneous values with named fields. A [`Fields`] table, built once at compile
//! time, maps each field name to a [`FieldIdx`] and each index to a [`FieldLayout`].

mod map;
mod object;

pub use map::*;
pub use object::*;

use crate::codec::{CodecRef, Encoding};
use derive_more::{Deref, From};
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use tessera_types::Datum;

/// Position of a field in declaration order.
#[derive(From, Deref, PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct FieldIdx(usize);

/// Where a field's bytes live.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Slot {
    /// At a compile-time offset, relative to the start of the record.
    Fixed { start: usize, len: usize },

    /// Addressed through the `ordinal`-th entry of a map's offset table.
    Optional { ordinal: usize },
}

#[derive(Debug)]
pub struct FieldLayout {
    pub name: String,
    pub codec: CodecRef,
    pub slot: Slot,
    pub default: Option<Datum>,
    /// The schema's `maxLength`. An optional field never takes more than this.
    pub max_len: Option<usize>,
}

impl FieldLayout {
    /// The value to write for this field: the supplied one, else the default.
    pub fn pick<'d>(&'d self, dat: &'d Datum) -> Option<&'d Datum> {
        dat.get(&self.name).or(self.default.as_ref())
    }
}

#[derive(Debug, Default)]
pub struct Fields {
    layouts: Vec<FieldLayout>,
    idx_by_name: HashMap<String, FieldIdx>,
}

impl Fields {
    pub fn push(&mut self, layout: FieldLayout) -> FieldIdx {
        let idx = FieldIdx(self.layouts.len());
        self.idx_by_name.insert(layout.name.clone(), idx);
        self.layouts.push(layout);
        idx
    }

    pub fn idx(&self, name: &str) -> Option<FieldIdx> {
        self.idx_by_name.get(name).copied()
    }

    pub fn get(&self, idx: FieldIdx) -> Option<&FieldLayout> {
        self.layouts.get(*idx)
    }

    pub fn by_name(&self, name: &str) -> Option<&FieldLayout> {
        self.get(self.idx(name)?)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldLayout> {
        self.layouts.iter()
    }
}

/* Fixed-slot helpers shared by objects and the required prefix of maps. */

fn fixed_fields(fields: &Fields) -> impl Iterator<Item = (&FieldLayout, Range<usize>)> {
    fields.iter().filter_map(|layout| match layout.slot {
        Slot::Fixed { start, len } => Some((layout, start..start + len)),
        Slot::Optional { .. } => None,
    })
}

fn fixed_region_len(fields: &Fields) -> usize {
    fixed_fields(fields)
        .map(|(_, range)| range.end)
        .max()
        .unwrap_or(0)
}

/// Nested templates first, then this record's own defaults over them.
fn write_fixed_defaults(fields: &Fields, bytes: &mut [u8]) {
    for (layout, range) in fixed_fields(fields) {
        let slot = &mut bytes[range];
        layout.codec.write_template(slot);
        if let Some(default) = &layout.default {
            layout.codec.encode_amend(default, slot);
        }
    }
}

/// Writes only the fields present in `dat`. The others keep their bytes.
fn encode_fixed_fields(fields: &Fields, dat: &Datum, bytes: &mut [u8]) {
    for (layout, range) in fixed_fields(fields) {
        if let Some(field_dat) = dat.get(&layout.name) {
            layout.codec.encode_amend(field_dat, &mut bytes[range]);
        }
    }
}

fn decode_fixed_fields(fields: &Fields, bytes: &[u8], out: &mut BTreeMap<String, Datum>) {
    for (layout, range) in fixed_fields(fields) {
        let field_dat = match bytes.get(range) {
            None => Datum::Null,
            Some(field_bytes) => layout.codec.decode(field_bytes),
        };
        out.insert(layout.name.clone(), field_dat);
    }
}
