use derive_more::Display;
use std::error::Error;

/// Why a schema could not be compiled.
///
/// Compilation either succeeds as a whole or registers nothing.
#[derive(Display, PartialEq, Eq, Clone, Debug)]
pub enum CompileError {
    #[display(fmt = "Reference to unregistered id {:?}", _0)]
    UnknownReference(String),

    #[display(fmt = "{} has no fixed size", context)]
    NotFixedSize { context: String },

    #[display(fmt = "{} is a string without maxLength", context)]
    UnboundedString { context: String },

    #[display(fmt = "{} is a fixed array without maxItems", context)]
    UnboundedArray { context: String },

    #[display(fmt = "Unresolvable cycle among {:?}", _0)]
    Cycle(Vec<String>),

    #[display(fmt = "Tag field of {:?} must be a one-byte integer at byte 0", _0)]
    MisplacedTag(String),

    #[display(fmt = "{} has neither a type nor a reference", context)]
    MissingKind { context: String },

    #[display(fmt = "{} has a btype that does not fit its type", context)]
    UnsupportedKind { context: String },
}

impl Error for CompileError {}
