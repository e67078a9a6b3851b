//! # Registry
//!
//! Compiles schemas into codecs and remembers them, by `$id` and by tag.
//!
//! A tag is the literal default of a record's `tag` field, stored in byte 0 of every
//! encoded value of that record. Any buffer can therefore be viewed, decoded or
//! encoded without the caller naming its schema.

mod compile;
mod graph;
mod scratch;

pub use scratch::ScratchBuffer;

use crate::codec::{CodecRef, Encoding};
use crate::config::RegistryConfig;
use crate::view::View;
use anyhow::{Context, Result};
use compile::Compiler;
use num_traits::ToPrimitive;
use std::collections::HashMap;
use std::sync::Arc;
use tessera_types::{Datum, Schema};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Registry {
    codecs: HashMap<String, CodecRef>,
    tags: HashMap<u8, CodecRef>,
    scratch: ScratchBuffer,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_config(RegistryConfig::default())
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            codecs: HashMap::new(),
            tags: HashMap::new(),
            scratch: ScratchBuffer::new(config.scratch_capacity),
        }
    }

    /// Compiles `schema` and every named node it contains that is not registered yet.
    ///
    /// On failure nothing is registered. The error downcasts to
    /// [`crate::CompileError`].
    pub fn compile(&mut self, schema: &Schema) -> Result<CodecRef> {
        if let Some(id) = schema.id.as_deref() {
            if let Some(codec) = self.codecs.get(id) {
                debug!(id, "Reusing compiled codec");
                return Ok(Arc::clone(codec));
            }
        }

        let compiled = Compiler::new(&self.codecs)
            .run(schema)
            .with_context(|| {
                let id = schema.id.as_deref().unwrap_or("<anonymous>");
                format!("Compiling schema {id:?}")
            })?;

        self.codecs.extend(compiled.codecs);
        for (tag, context, codec) in compiled.tags {
            if self.tags.insert(tag, codec).is_some() {
                warn!(tag, context = %context, "Tag already registered; the newer codec replaces it");
            }
        }
        Ok(compiled.root)
    }

    pub fn get(&self, id: &str) -> Option<&CodecRef> {
        self.codecs.get(id)
    }

    pub fn by_tag(&self, tag: u8) -> Option<&CodecRef> {
        self.tags.get(&tag)
    }

    /// The number of named codecs.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /* Polymorphic access by tag */

    /// @return `None` if `bytes` is empty or its tag is unregistered.
    pub fn view<'a>(&'a self, bytes: &'a [u8]) -> Option<View<'a>> {
        let tag = *bytes.first()?;
        let codec = self.by_tag(tag)?;
        Some(View::new(codec, bytes))
    }

    pub fn decode(&self, bytes: &[u8]) -> Option<Datum> {
        Some(self.view(bytes)?.to_datum())
    }

    /// Encodes through the scratch buffer, using the codec registered under the
    /// datum's `tag` field.
    ///
    /// @return A buffer sized to its content, or `None` if the tag is missing or unregistered.
    pub fn encode(&mut self, dat: &Datum) -> Option<Vec<u8>> {
        let tag = dat.get("tag")?.to_u64()?;
        let codec = Arc::clone(self.by_tag(u8::try_from(tag).ok()?)?);
        Some(self.scratch.encode(&codec, dat))
    }

    /// Like [`Self::encode`], with the codec named by `$id` instead of by tag.
    pub fn encode_as(&mut self, id: &str, dat: &Datum) -> Option<Vec<u8>> {
        let codec = Arc::clone(self.get(id)?);
        Some(self.scratch.encode(&codec, dat))
    }

    /// Encoded size of `dat` under its tagged codec, for sizing a buffer ahead of time.
    pub fn encoded_len(&self, dat: &Datum) -> Option<usize> {
        let tag = u8::try_from(dat.get("tag")?.to_u64()?).ok()?;
        Some(self.by_tag(tag)?.encoded_len(dat))
    }
}
