use super::graph::DependencyGraph;
use crate::array::{ArrayCodec, TypedArrayCodec};
use crate::codec::{Codec, CodecRef, Encoding};
use crate::dict::DictCodec;
use crate::error::CompileError;
use crate::record::{FieldLayout, Fields, MapCodec, ObjectCodec, Slot};
use crate::scalar::ScalarCodec;
use crate::vector::VectorCodec;
use indexmap::IndexMap;
use num_traits::ToPrimitive;
use std::collections::HashMap;
use std::sync::Arc;
use tessera_types::{BinaryKind, ScalarKind, Schema, SchemaKind};
use tracing::{debug, trace};

const TAG_FIELD_NAME: &str = "tag";

/// Everything one successful compile produced, not yet visible to the registry.
#[derive(Debug)]
pub struct Compiled {
    pub root: CodecRef,
    pub codecs: IndexMap<String, CodecRef>,
    pub tags: Vec<(u8, String, CodecRef)>,
}

/// Compiles one schema tree against the codecs registered so far.
///
/// Results are staged in the compiler. A failure anywhere drops the whole stage.
pub struct Compiler<'r> {
    registered: &'r HashMap<String, CodecRef>,
    staged: IndexMap<String, CodecRef>,
    tags: Vec<(u8, String, CodecRef)>,
}

impl<'r> Compiler<'r> {
    pub fn new(registered: &'r HashMap<String, CodecRef>) -> Self {
        Self {
            registered,
            staged: IndexMap::new(),
            tags: vec![],
        }
    }

    pub fn run(mut self, root: &Schema) -> Result<Compiled, CompileError> {
        let graph = DependencyGraph::build(root, self.registered)?;
        let order = graph.order()?;
        trace!(nodes = graph.len(), ?order, "Resolved compile order");

        for id in order {
            let Some(schema) = graph.node(id) else {
                continue;
            };
            let codec = self.compile_body(schema, id)?;
            debug!(
                id,
                kind = codec.kind_name(),
                fixed_len = ?codec.fixed_len(),
                "Compiled codec"
            );
            self.staged.insert(id.to_string(), codec);
        }

        let root_context = root.id.as_deref().unwrap_or("<root>");
        let root = self.resolve(root, root_context)?;
        Ok(Compiled {
            root,
            codecs: self.staged,
            tags: self.tags,
        })
    }

    fn lookup(&self, id: &str) -> Option<CodecRef> {
        self.staged
            .get(id)
            .or_else(|| self.registered.get(id))
            .map(Arc::clone)
    }

    /// A named or referenced node resolves to the codec compiled for it. Anything
    /// else is compiled in place.
    fn resolve(&mut self, schema: &Schema, context: &str) -> Result<CodecRef, CompileError> {
        if let Some(reference) = &schema.reference {
            return self
                .lookup(reference)
                .ok_or_else(|| CompileError::UnknownReference(reference.clone()));
        }
        if let Some(codec) = schema.id.as_deref().and_then(|id| self.lookup(id)) {
            return Ok(codec);
        }
        self.compile_body(schema, context)
    }

    fn compile_body(&mut self, schema: &Schema, context: &str) -> Result<CodecRef, CompileError> {
        let Some(kind) = schema.kind else {
            return Err(CompileError::MissingKind {
                context: context.into(),
            });
        };
        let codec = match kind {
            SchemaKind::Boolean | SchemaKind::Integer | SchemaKind::Number => {
                let scalar_kind = ScalarKind::resolve(kind, schema.btype).ok_or_else(|| {
                    CompileError::UnsupportedKind {
                        context: context.into(),
                    }
                })?;
                Codec::Scalar(ScalarCodec::Number(scalar_kind))
            }
            SchemaKind::String => {
                let max_len = schema.max_length;
                match schema.btype {
                    None => Codec::Scalar(ScalarCodec::Text { max_len }),
                    Some(BinaryKind::Binary) => Codec::Scalar(ScalarCodec::Binary { max_len }),
                    Some(_) => {
                        return Err(CompileError::UnsupportedKind {
                            context: context.into(),
                        })
                    }
                }
            }
            SchemaKind::Array => self.compile_array(schema, context)?,
            SchemaKind::Object => match schema.btype {
                None => self.compile_object(schema, context)?,
                Some(BinaryKind::Map) => self.compile_map(schema, context)?,
                Some(BinaryKind::Dict) => self.compile_dict(schema, context)?,
                Some(_) => {
                    return Err(CompileError::UnsupportedKind {
                        context: context.into(),
                    })
                }
            },
        };
        let codec = Arc::new(codec);
        self.stage_tag(&codec, context)?;
        Ok(codec)
    }

    /* Containers */

    fn compile_array(&mut self, schema: &Schema, context: &str) -> Result<Codec, CompileError> {
        let item_context = format!("{context}[]");
        let item_schema = schema
            .items
            .as_deref()
            .ok_or_else(|| CompileError::MissingKind {
                context: item_context.clone(),
            })?;
        let item = self.resolve(item_schema, &item_context)?;

        if schema.btype == Some(BinaryKind::Vector) {
            return Ok(Codec::Vector(VectorCodec::new(item, schema.max_items)));
        }
        if let Some(btype) = schema.btype {
            return Err(CompileError::UnsupportedKind {
                context: format!("{context} ({btype:?})"),
            });
        }

        let len = schema.max_items.ok_or_else(|| CompileError::UnboundedArray {
            context: context.into(),
        })?;
        if let Codec::Scalar(ScalarCodec::Number(kind)) = &*item {
            if kind.is_numeric() {
                let kind = *kind;
                return Ok(Codec::TypedArray(TypedArrayCodec::new(item, kind, len)));
            }
        }
        let item_len = fixed_slot_len(&item, &item_context)?;
        Ok(Codec::Array(ArrayCodec::new(item, item_len, len)))
    }

    /* Records */

    fn compile_object(&mut self, schema: &Schema, context: &str) -> Result<Codec, CompileError> {
        let mut fields = Fields::default();
        let mut cursor = 0;
        for (name, field_schema) in schema.properties.iter() {
            let field_context = format!("{context}.{name}");
            let codec = self.resolve(field_schema, &field_context)?;
            let len = fixed_slot_len(&codec, &field_context)?;
            let slot = Slot::Fixed { start: cursor, len };
            fields.push(field_layout(name, field_schema, codec, slot));
            cursor += len;
        }
        Ok(Codec::Object(ObjectCodec::new(fields)))
    }

    /// Required fields are packed first, in declaration order. Optional fields are
    /// numbered in declaration order too.
    fn compile_map(&mut self, schema: &Schema, context: &str) -> Result<Codec, CompileError> {
        let mut fields = Fields::default();
        let mut cursor = 0;
        let mut ordinal = 0;
        let (required, optional) = schema
            .properties
            .iter()
            .partition::<Vec<_>, _>(|(name, _)| schema.is_required(name));
        for (name, field_schema) in required {
            let field_context = format!("{context}.{name}");
            let codec = self.resolve(field_schema, &field_context)?;
            let len = fixed_slot_len(&codec, &field_context)?;
            let slot = Slot::Fixed { start: cursor, len };
            fields.push(field_layout(name, field_schema, codec, slot));
            cursor += len;
        }
        for (name, field_schema) in optional {
            let codec = self.resolve(field_schema, &format!("{context}.{name}"))?;
            let slot = Slot::Optional { ordinal };
            fields.push(field_layout(name, field_schema, codec, slot));
            ordinal += 1;
        }
        Ok(Codec::Map(MapCodec::new(fields)))
    }

    fn compile_dict(&mut self, schema: &Schema, context: &str) -> Result<Codec, CompileError> {
        let key_context = format!("{context}{{key}}");
        let key_schema = schema
            .property_names
            .as_deref()
            .ok_or_else(|| CompileError::MissingKind {
                context: key_context.clone(),
            })?;
        let key = self.resolve(key_schema, &key_context)?;
        let key_len = fixed_slot_len(&key, &key_context)?;

        let value_context = format!("{context}{{value}}");
        let value_schema = schema
            .additional_properties
            .as_deref()
            .ok_or_else(|| CompileError::MissingKind {
                context: value_context.clone(),
            })?;
        let value = self.resolve(value_schema, &value_context)?;
        Ok(Codec::Dict(DictCodec::new(key, key_len, value)))
    }

    /// A record whose `tag` field has a default is also registered under that
    /// default. Tags are read back from byte 0, so that is where the field must be.
    fn stage_tag(&mut self, codec: &CodecRef, context: &str) -> Result<(), CompileError> {
        let Some(layout) = codec.fields().and_then(|fields| fields.by_name(TAG_FIELD_NAME)) else {
            return Ok(());
        };
        let Some(default) = &layout.default else {
            return Ok(());
        };
        let tag = match (layout.slot, default.to_u64()) {
            (Slot::Fixed { start: 0, len: 1 }, Some(tag)) => u8::try_from(tag).ok(),
            _ => None,
        };
        let tag = tag.ok_or_else(|| CompileError::MisplacedTag(context.into()))?;
        self.tags.push((tag, context.into(), Arc::clone(codec)));
        Ok(())
    }
}

fn field_layout(name: &str, field_schema: &Schema, codec: CodecRef, slot: Slot) -> FieldLayout {
    FieldLayout {
        name: name.into(),
        codec,
        slot,
        default: field_schema.default_datum(),
        max_len: field_schema.max_length,
    }
}

/// The size a field or item occupies when it must sit at a fixed offset.
fn fixed_slot_len(codec: &Codec, context: &str) -> Result<usize, CompileError> {
    if let Some(len) = codec.fixed_len() {
        return Ok(len);
    }
    let context = context.to_string();
    match codec {
        Codec::Scalar(ScalarCodec::Text { .. } | ScalarCodec::Binary { .. }) => {
            Err(CompileError::UnboundedString { context })
        }
        _ => Err(CompileError::NotFixedSize { context }),
    }
}
