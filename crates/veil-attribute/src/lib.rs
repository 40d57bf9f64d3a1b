//! # veil-attribute: the attribute value lattice
//!
//! This crate defines, per attribute data type, how concrete values
//! generalize into covering values, how the information loss of a
//! generalization is measured, and how a value set can be split into two
//! groups that each still satisfy the anonymity floor `k`.
//!
//! Supported quasi-identifier types:
//! - [`IntAttribute`]: bounded integers, generalized to `lo:hi` ranges
//! - [`DateAttribute`]: bounded dates, generalized to date ranges
//! - [`StringAttribute`]: length-bounded strings, generalized by suffix
//!   masking (`Jo**`)
//! - [`EnumAttribute`]: flat enumerations, generalized to value unions
//! - [`HierarchicAttribute`]: tree-valued enumerations, generalized to
//!   the lowest common ancestor
//!
//! Every type upholds the same lattice contract:
//! - `smallest_generalization` of a set covers every member (`subset_of`)
//! - `subset_of` is reflexive and transitive
//! - `error_cost` is 0 for a singleton partition and grows as more (or
//!   more different) values are merged
//! - `try_split` never produces a group smaller than `k`, and refuses
//!   whenever fewer than `2k` values are available
//!
//! Dispatch is a tagged union: [`QuasiType`] over the concrete attribute
//! types, [`AttributeValue`] over their value representations. No
//! downcasting; a value/type variant mismatch is a schema-construction
//! bug and degrades to the conservative answer (not covered, zero cost).

mod date;
mod error;
mod flat_enum;
mod hierarchy;
mod int;
mod partition;
mod range;
mod string;
mod value;

#[cfg(test)]
mod tests;

pub use date::{DEFAULT_DATE_FORMAT, DateAttribute, DateValue};
pub use error::AttributeError;
pub use flat_enum::{EnumAttribute, EnumValue};
pub use hierarchy::{HierarchicAttribute, Hierarchy, HierarchyValue, NodeId};
pub use int::{IntAttribute, IntValue};
pub use partition::Partition;
pub use string::{StringAttribute, StringValue};
pub use value::{AttributeValue, QuasiType};

/// The character a masked string position is rendered as.
pub const MASK_CHAR: char = '*';
