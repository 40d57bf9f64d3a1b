//! Schema error types.

use thiserror::Error;
use veil_attribute::AttributeError;

/// Errors from parsing or rendering a record line.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The line's field count does not match the schema arity.
    #[error("line has {actual} fields, schema requires {expected}")]
    FieldCount { expected: usize, actual: usize },

    /// One field failed its attribute parser.
    #[error("cannot parse field '{name}' at position {position}: {source}")]
    Field {
        name: String,
        position: usize,
        #[source]
        source: AttributeError,
    },

    /// A tuple handed to `show_line` has the wrong arity.
    #[error("record has {actual} fields, schema requires {expected}")]
    Arity { expected: usize, actual: usize },
}

/// Errors from parsing the descriptor configuration language.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unbalanced braces or an empty block name.
    #[error("invalid block near '{context}'")]
    InvalidBlock { context: String },

    /// The required `Attributes` block is missing.
    #[error("descriptor has no Attributes block")]
    MissingAttributes,

    /// An attribute line without a role qualifier.
    #[error("attribute line '{line}' is missing a qualifier")]
    MissingQualifier { line: String },

    /// An unknown role qualifier.
    #[error("unrecognised attribute qualifier '{qualifier}' in line '{line}'")]
    UnknownQualifier { qualifier: String, line: String },

    /// A quasi attribute without a type, or with an unknown one.
    #[error("unsupported quasi type '{type_name}' in line '{line}'")]
    UnknownType { type_name: String, line: String },

    /// A malformed `[lo;hi]` type parameter.
    #[error("cannot parse type parameter '{params}'")]
    BadTypeParameter { params: String },
}
