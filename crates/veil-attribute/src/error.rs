//! Attribute-level error types.

use thiserror::Error;

/// Errors raised when parsing a single attribute value.
#[derive(Debug, Error)]
pub enum AttributeError {
    /// The text is not a value of the attribute's type at all.
    #[error("cannot parse {kind} attribute from '{text}'")]
    Malformed { kind: &'static str, text: String },

    /// A range literal with something other than two endpoints.
    #[error("invalid range literal '{text}' for {kind} attribute")]
    InvalidRange { kind: &'static str, text: String },

    /// The value parsed but falls outside the declared domain.
    #[error("value '{text}' out of declared range [{lo};{hi}]")]
    OutOfRange { text: String, lo: String, hi: String },

    /// String length outside the declared bounds.
    #[error("string '{text}' has length {len}, outside [{min_len};{max_len}]")]
    LengthOutOfRange {
        text: String,
        len: usize,
        min_len: usize,
        max_len: usize,
    },

    /// Value not in an enumerated value set.
    #[error("value '{text}' not in the value set of enum '{name}'")]
    NotInEnum { name: String, text: String },

    /// Value not a node of a hierarchical value set.
    #[error("value '{text}' not in the hierarchy '{name}'")]
    NotInHierarchy { name: String, text: String },

    /// A date that does not match the attribute's format string.
    #[error("cannot parse date '{text}' with format '{format}'")]
    BadDateFormat { text: String, format: String },
}
