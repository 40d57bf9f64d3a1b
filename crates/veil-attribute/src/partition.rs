//! The partition value object: a value set paired with its aggregate.

use crate::value::AttributeValue;

/// A set of column values together with the smallest generalization that
/// covers all of them.
///
/// Invariant: `aggregate` covers (`subset_of`) every element of `values`.
/// A `Partition` is recomputed whenever the underlying value set changes;
/// it is never mutated in place.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Column projection, in record order.
    pub values: Vec<AttributeValue>,
    /// Least upper bound of `values` in the attribute's lattice.
    pub aggregate: AttributeValue,
}

impl Partition {
    pub fn new(values: Vec<AttributeValue>, aggregate: AttributeValue) -> Self {
        Self { values, aggregate }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
