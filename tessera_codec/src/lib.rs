mod array;
mod codec;
pub mod config;
mod dict;
mod error;
mod lengths;
pub mod record;
mod registry;
mod scalar;
mod vector;
mod view;

pub use array::{ArrayCodec, FixedItems, TypedArrayCodec};
pub use codec::*;
pub use config::RegistryConfig;
pub use dict::DictCodec;
pub use error::CompileError;
pub use lengths::{HeaderInt, HEADER_INT_LEN};
pub use record::FieldIdx;
pub use registry::*;
pub use scalar::ScalarCodec;
pub use vector::VectorCodec;
pub use view::*;
