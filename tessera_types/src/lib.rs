mod datum;
pub mod schema;

pub use datum::*;
pub use schema::{BinaryKind, ScalarKind, Schema, SchemaKind};
