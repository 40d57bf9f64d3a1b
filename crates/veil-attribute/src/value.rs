//! Tagged-union dispatch over the concrete attribute types.

use crate::date::{DateAttribute, DateValue};
use crate::error::AttributeError;
use crate::flat_enum::{EnumAttribute, EnumValue};
use crate::hierarchy::{HierarchicAttribute, HierarchyValue};
use crate::int::{IntAttribute, IntValue};
use crate::partition::Partition;
use crate::string::{StringAttribute, StringValue};

/// A typed attribute value, concrete or generalized.
///
/// The variant always matches the column's [`QuasiType`]; the schema
/// constructs values only through [`QuasiType::parse`], so a mismatch is
/// a construction bug. Mismatched operations degrade conservatively
/// (`subset_of` false, `error_cost` 0), mirroring how typed value enums
/// treat cross-variant comparisons elsewhere in the stack.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Int(IntValue),
    Date(DateValue),
    Text(StringValue),
    Enum(EnumValue),
    Hierarchy(HierarchyValue),
}

/// The generalization lattice of one quasi-identifier column.
#[derive(Debug, Clone)]
pub enum QuasiType {
    Int(IntAttribute),
    Date(DateAttribute),
    Text(StringAttribute),
    Enum(EnumAttribute),
    Hierarchy(HierarchicAttribute),
}

impl QuasiType {
    /// Parses one field into a typed value.
    pub fn parse(&self, text: &str) -> Result<AttributeValue, AttributeError> {
        match self {
            Self::Int(a) => Ok(AttributeValue::Int(a.parse(text)?)),
            Self::Date(a) => Ok(AttributeValue::Date(a.parse(text)?)),
            Self::Text(a) => Ok(AttributeValue::Text(a.parse(text)?)),
            Self::Enum(a) => Ok(AttributeValue::Enum(a.parse(text)?)),
            Self::Hierarchy(a) => Ok(AttributeValue::Hierarchy(a.parse(text)?)),
        }
    }

    /// Renders a value; stable and re-parseable for concrete values.
    pub fn show(&self, value: &AttributeValue) -> String {
        match (self, value) {
            (Self::Int(a), AttributeValue::Int(v)) => a.show(v),
            (Self::Date(a), AttributeValue::Date(v)) => a.show(v),
            (Self::Text(a), AttributeValue::Text(v)) => a.show(v),
            (Self::Enum(a), AttributeValue::Enum(v)) => a.show(v),
            (Self::Hierarchy(a), AttributeValue::Hierarchy(v)) => a.show(v),
            _ => {
                debug_assert!(false, "attribute value variant mismatch");
                String::from("?")
            }
        }
    }

    /// True iff every concrete value represented by `child` is also
    /// represented by `parent`. Reflexive and transitive per type.
    pub fn subset_of(&self, parent: &AttributeValue, child: &AttributeValue) -> bool {
        match (self, parent, child) {
            (Self::Int(a), AttributeValue::Int(p), AttributeValue::Int(c)) => a.subset_of(p, c),
            (Self::Date(a), AttributeValue::Date(p), AttributeValue::Date(c)) => a.subset_of(p, c),
            (Self::Text(a), AttributeValue::Text(p), AttributeValue::Text(c)) => a.subset_of(p, c),
            (Self::Enum(a), AttributeValue::Enum(p), AttributeValue::Enum(c)) => a.subset_of(p, c),
            (Self::Hierarchy(a), AttributeValue::Hierarchy(p), AttributeValue::Hierarchy(c)) => {
                a.subset_of(p, c)
            }
            _ => false,
        }
    }

    /// Least upper bound covering all inputs.
    pub fn smallest_generalization(&self, values: &[AttributeValue]) -> AttributeValue {
        match self {
            Self::Int(a) => {
                let vs: Vec<IntValue> = values
                    .iter()
                    .filter_map(|v| match v {
                        AttributeValue::Int(iv) => Some(*iv),
                        _ => None,
                    })
                    .collect();
                AttributeValue::Int(a.smallest_generalization(&vs))
            }
            Self::Date(a) => {
                let vs: Vec<DateValue> = values
                    .iter()
                    .filter_map(|v| match v {
                        AttributeValue::Date(dv) => Some(*dv),
                        _ => None,
                    })
                    .collect();
                AttributeValue::Date(a.smallest_generalization(&vs))
            }
            Self::Text(a) => {
                let vs: Vec<StringValue> = values
                    .iter()
                    .filter_map(|v| match v {
                        AttributeValue::Text(sv) => Some(sv.clone()),
                        _ => None,
                    })
                    .collect();
                AttributeValue::Text(a.smallest_generalization(&vs))
            }
            Self::Enum(a) => {
                let vs: Vec<EnumValue> = values
                    .iter()
                    .filter_map(|v| match v {
                        AttributeValue::Enum(ev) => Some(ev.clone()),
                        _ => None,
                    })
                    .collect();
                AttributeValue::Enum(a.smallest_generalization(&vs))
            }
            Self::Hierarchy(a) => {
                let vs: Vec<HierarchyValue> = values
                    .iter()
                    .filter_map(|v| match v {
                        AttributeValue::Hierarchy(hv) => Some(*hv),
                        _ => None,
                    })
                    .collect();
                AttributeValue::Hierarchy(a.smallest_generalization(&vs))
            }
        }
    }

    /// Builds the partition of a value set under this lattice.
    pub fn partition(&self, values: Vec<AttributeValue>) -> Partition {
        let aggregate = self.smallest_generalization(&values);
        Partition::new(values, aggregate)
    }

    /// Non-negative information-loss measure; 0 for a singleton.
    pub fn error_cost(&self, partition: &Partition) -> f64 {
        match self {
            Self::Int(a) => a.error_cost(partition),
            Self::Date(a) => a.error_cost(partition),
            Self::Text(a) => a.error_cost(partition),
            Self::Enum(a) => a.error_cost(partition),
            Self::Hierarchy(a) => a.error_cost(partition),
        }
    }

    /// Type-specific binary split into index groups of size >= `k`;
    /// `None` whenever fewer than `2k` values are available or no valid
    /// cut exists.
    pub fn try_split(&self, partition: &Partition, k: usize) -> Option<(Vec<usize>, Vec<usize>)> {
        if partition.values.len() < 2 * k {
            return None;
        }
        match self {
            Self::Int(a) => a.try_split(partition, k),
            Self::Date(a) => a.try_split(partition, k),
            Self::Text(a) => a.try_split(partition, k),
            Self::Enum(a) => a.try_split(partition, k),
            Self::Hierarchy(a) => a.try_split(partition, k),
        }
    }
}
