use anyhow::{anyhow, Result};
use num_traits::ToPrimitive;
use std::any;
use std::collections::BTreeMap;

/// The native, untyped value every codec decodes into and encodes from.
///
/// [`Datum::Null`] doubles as the "hole" marker: an absent record field, or
/// a vector slot whose stored start equals its stored end.
#[derive(PartialEq, Clone, Debug, Default)]
pub enum Datum {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Datum>),
    Record(BTreeMap<String, Datum>),
}

impl Datum {
    pub fn record<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Datum>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::Record(fields)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Looks up a record field. A field holding [`Datum::Null`] counts as absent.
    pub fn get(&self, name: &str) -> Option<&Datum> {
        match self {
            Self::Record(fields) => fields.get(name).filter(|dat| !dat.is_null()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Raw bytes of a [`Datum::Bytes`] or the UTF-8 bytes of a [`Datum::Str`].
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            Self::Str(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Datum]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&BTreeMap<String, Datum>> {
        match self {
            Self::Record(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Numeric views of a datum. Conversions between widths wrap rather than
/// fail, the same way a fixed-width store truncates what it is handed.
impl ToPrimitive for Datum {
    fn to_i64(&self) -> Option<i64> {
        match self {
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Int(i) => Some(*i),
            Self::UInt(u) => Some(*u as i64),
            Self::Float(f) => Some(*f as i64),
            _ => None,
        }
    }
    fn to_u64(&self) -> Option<u64> {
        match self {
            Self::Bool(b) => Some(u64::from(*b)),
            Self::Int(i) => Some(*i as u64),
            Self::UInt(u) => Some(*u),
            Self::Float(f) => Some(*f as u64),
            _ => None,
        }
    }
    fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(f64::from(u8::from(*b))),
            Self::Int(i) => Some(*i as f64),
            Self::UInt(u) => Some(*u as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

macro_rules! datum_from {
    ($variant:ident, $($src:ty),+) => {
        $(
            impl From<$src> for Datum {
                fn from(v: $src) -> Self {
                    Self::$variant(v.into())
                }
            }
        )+
    };
}
datum_from!(Bool, bool);
datum_from!(Int, i8, u8, i16, u16, i32, u32, i64);
datum_from!(UInt, u64);
datum_from!(Float, f32, f64);
datum_from!(Str, &str, String);
datum_from!(List, Vec<Datum>);
datum_from!(Record, BTreeMap<String, Datum>);

impl<T: Into<Datum>> From<Option<T>> for Datum {
    fn from(opt: Option<T>) -> Self {
        match opt {
            None => Self::Null,
            Some(t) => t.into(),
        }
    }
}

impl From<serde_json::Value> for Datum {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value;
        match json {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or_default())
                }
            }
            Value::String(s) => Self::Str(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(fields) => Self::Record(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}
impl From<&serde_json::Value> for Datum {
    fn from(json: &serde_json::Value) -> Self {
        Self::from(json.clone())
    }
}

/* Extraction into native Rust types. */

fn mismatch<T>(dat: &Datum) -> anyhow::Error {
    anyhow!("Cannot read {} from {dat:?}", any::type_name::<T>())
}

impl TryFrom<Datum> for bool {
    type Error = anyhow::Error;
    fn try_from(dat: Datum) -> Result<Self> {
        match dat {
            Datum::Bool(b) => Ok(b),
            etc => Err(mismatch::<Self>(&etc)),
        }
    }
}
impl TryFrom<Datum> for i64 {
    type Error = anyhow::Error;
    fn try_from(dat: Datum) -> Result<Self> {
        match dat {
            Datum::Int(_) | Datum::UInt(_) => dat.to_i64().ok_or_else(|| mismatch::<Self>(&dat)),
            etc => Err(mismatch::<Self>(&etc)),
        }
    }
}
impl TryFrom<Datum> for u64 {
    type Error = anyhow::Error;
    fn try_from(dat: Datum) -> Result<Self> {
        match dat {
            Datum::Int(_) | Datum::UInt(_) => dat.to_u64().ok_or_else(|| mismatch::<Self>(&dat)),
            etc => Err(mismatch::<Self>(&etc)),
        }
    }
}
impl TryFrom<Datum> for f64 {
    type Error = anyhow::Error;
    fn try_from(dat: Datum) -> Result<Self> {
        match dat {
            Datum::Int(_) | Datum::UInt(_) | Datum::Float(_) => {
                dat.to_f64().ok_or_else(|| mismatch::<Self>(&dat))
            }
            etc => Err(mismatch::<Self>(&etc)),
        }
    }
}
impl TryFrom<Datum> for String {
    type Error = anyhow::Error;
    fn try_from(dat: Datum) -> Result<Self> {
        match dat {
            Datum::Str(s) => Ok(s),
            etc => Err(mismatch::<Self>(&etc)),
        }
    }
}
impl TryFrom<Datum> for Vec<u8> {
    type Error = anyhow::Error;
    fn try_from(dat: Datum) -> Result<Self> {
        match dat {
            Datum::Bytes(b) => Ok(b),
            Datum::Str(s) => Ok(s.into_bytes()),
            etc => Err(mismatch::<Self>(&etc)),
        }
    }
}
