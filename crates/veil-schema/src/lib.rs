//! # veil-schema: the record descriptor
//!
//! A descriptor assigns every input column a stable position, a name, and
//! a role:
//! - **passthrough**: released unchanged
//! - **secret**: replaced by a literal mask on release
//! - **secret-id**: released as a one-way hash token
//! - **quasi**: a quasi-identifier carrying a typed generalization
//!   lattice from [`veil_attribute`]
//!
//! The descriptor parses `;`-delimited input lines into immutable
//! [`Record`]s and renders records back to text. Descriptors themselves
//! are loaded from a brace-block configuration language (see
//! [`config::parse_descriptor`]):
//!
//! ```text
//! Enums {
//!     illness { cardiovascular { embolism, infarction }, viral { flu, pox } }
//! }
//! Attributes {
//!     name      secret
//!     patient   secret-id
//!     age       quasi Int [0;120]
//!     admitted  quasi Date [2000-01-01;]
//!     diagnosis quasi illness
//! }
//! ```

pub mod config;
mod descriptor;
mod error;

pub use config::parse_descriptor;
pub use descriptor::{
    Attribute, AttributeRole, FieldValue, Record, RecordDescriptor, SECRET_MASK, identity_token,
};
pub use error::{ConfigError, DescriptorError};
