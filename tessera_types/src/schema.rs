//! # Schema trees
//!
//! A [`Schema`] describes the shape of one value, in the vocabulary of JSON schema
//! plus a `btype` that picks the binary strategy:
//!
//! ```text
//! {
//!     "$id": "Person",
//!     "type": "object",
//!     "btype": "map",
//!     "properties": {
//!         "tag":     { "type": "integer", "btype": "uint8", "default": 1 },
//!         "name":    { "type": "string", "maxLength": 10 },
//!         "friends": { "type": "array", "btype": "vector", "items": { "$ref": "Person" } }
//!     },
//!     "required": ["tag", "name"]
//! }
//! ```
//!
//! Schemas are trusted inputs. Nothing here checks a value against a schema.

use crate::Datum;
use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

mod kind;

pub use kind::*;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub btype: Option<BinaryKind>,

    /// Record fields, in declaration order. The order decides the layout.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,

    /// Key schema of a dict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_names: Option<Box<Schema>>,

    /// Value schema of a dict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/* Parsing. */
impl Schema {
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        let schema = serde_json::from_value(json)?;
        Ok(schema)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let schema = serde_json::from_str(s)?;
        Ok(schema)
    }
}

/* Shorthand constructors. */
impl Schema {
    pub fn of_kind(kind: SchemaKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn scalar(kind: SchemaKind, btype: BinaryKind) -> Self {
        Self {
            kind: Some(kind),
            btype: Some(btype),
            ..Self::default()
        }
    }

    pub fn string(max_length: usize) -> Self {
        Self {
            kind: Some(SchemaKind::String),
            max_length: Some(max_length),
            ..Self::default()
        }
    }

    pub fn reference(id: impl Into<String>) -> Self {
        Self {
            reference: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }
}

/* Queries used by the compiler. */
impl Schema {
    /// Whether this node is a record: an object of any flavor.
    pub fn is_record(&self) -> bool {
        self.kind == Some(SchemaKind::Object)
    }

    pub fn is_required(&self, field_name: &str) -> bool {
        self.required.iter().any(|name| name == field_name)
    }

    pub fn default_datum(&self) -> Option<Datum> {
        self.default.as_ref().map(Datum::from)
    }

    /// The children of this node that the layout depends on, in declaration order.
    pub fn children(&self) -> impl Iterator<Item = &Schema> {
        self.properties
            .values()
            .chain(self.items.as_deref())
            .chain(self.property_names.as_deref())
            .chain(self.additional_properties.as_deref())
    }
}
