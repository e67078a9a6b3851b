use serde::{Deserialize, Serialize};
use std::mem;

/// The coarse, JSON-schema `type` of a node.
#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Number,
    Integer,
    String,
    Boolean,
    Object,
    Array,
}

/// The finer `btype` of a node, choosing an encoding strategy.
#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[serde(rename_all = "lowercase")]
pub enum BinaryKind {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    BigInt64,
    BigUint64,
    Float32,
    Float64,
    Binary,
    Vector,
    Map,
    Dict,
}

/// A fixed-width scalar encoding.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum ScalarKind {
    Bool,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    BigInt64,
    BigUint64,
    Float32,
    Float64,
}

impl ScalarKind {
    pub fn width(self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::Uint8 => mem::size_of::<u8>(),
            Self::Int16 | Self::Uint16 => mem::size_of::<u16>(),
            Self::Int32 | Self::Uint32 | Self::Float32 => mem::size_of::<u32>(),
            Self::BigInt64 | Self::BigUint64 | Self::Float64 => mem::size_of::<u64>(),
        }
    }

    /// `log2(width)`. Every scalar width is a power of two.
    pub fn shift(self) -> u32 {
        self.width().trailing_zeros()
    }

    pub fn is_numeric(self) -> bool {
        self != Self::Bool
    }

    /// Resolves the scalar a node denotes, if it denotes one at all.
    pub fn resolve(kind: SchemaKind, btype: Option<BinaryKind>) -> Option<Self> {
        let scalar = match (kind, btype) {
            (SchemaKind::Boolean, _) => Self::Bool,
            (SchemaKind::Integer | SchemaKind::Number, Some(btype)) => match btype {
                BinaryKind::Int8 => Self::Int8,
                BinaryKind::Uint8 => Self::Uint8,
                BinaryKind::Int16 => Self::Int16,
                BinaryKind::Uint16 => Self::Uint16,
                BinaryKind::Int32 => Self::Int32,
                BinaryKind::Uint32 => Self::Uint32,
                BinaryKind::BigInt64 => Self::BigInt64,
                BinaryKind::BigUint64 => Self::BigUint64,
                BinaryKind::Float32 => Self::Float32,
                BinaryKind::Float64 => Self::Float64,
                _ => return None,
            },
            (SchemaKind::Integer, None) => Self::Int32,
            (SchemaKind::Number, None) => Self::Float64,
            _ => return None,
        };
        Some(scalar)
    }
}
