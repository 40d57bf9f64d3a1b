//! Flat enumeration attribute.

use std::collections::HashSet;

use crate::error::AttributeError;
use crate::partition::Partition;
use crate::value::AttributeValue;

/// An enum value: a single member name or a covering union of names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnumValue {
    Simple(String),
    Union(Vec<String>),
}

impl EnumValue {
    pub fn members(&self) -> &[String] {
        match self {
            Self::Simple(v) => std::slice::from_ref(v),
            Self::Union(vs) => vs,
        }
    }

    pub fn cardinality(&self) -> usize {
        self.members().len()
    }

    fn contains(&self, name: &str) -> bool {
        self.members().iter().any(|m| m == name)
    }
}

/// Quasi-identifier type for flat enumerations.
///
/// Generalization is the distinct union of member names, collapsing back
/// to a single name when the union is a singleton. Declaration order is
/// preserved in unions for stable output.
#[derive(Debug, Clone)]
pub struct EnumAttribute {
    name: String,
    declared: Vec<String>,
    value_set: HashSet<String>,
}

impl EnumAttribute {
    pub fn new(name: impl Into<String>, declared: Vec<String>) -> Self {
        let value_set = declared.iter().cloned().collect();
        Self {
            name: name.into(),
            declared,
            value_set,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared member names, in declaration order.
    pub fn declared(&self) -> &[String] {
        &self.declared
    }

    fn simplify(mut names: Vec<String>) -> EnumValue {
        if names.len() == 1 {
            EnumValue::Simple(names.remove(0))
        } else {
            EnumValue::Union(names)
        }
    }

    pub fn parse(&self, text: &str) -> Result<EnumValue, AttributeError> {
        let cleaned = text.trim();
        if self.value_set.contains(cleaned) {
            Ok(EnumValue::Simple(cleaned.to_string()))
        } else {
            Err(AttributeError::NotInEnum {
                name: self.name.clone(),
                text: cleaned.to_string(),
            })
        }
    }

    pub fn show(&self, value: &EnumValue) -> String {
        match value {
            EnumValue::Simple(v) => v.clone(),
            EnumValue::Union(vs) => format!("[{}]", vs.join(", ")),
        }
    }

    pub fn subset_of(&self, parent: &EnumValue, child: &EnumValue) -> bool {
        child.members().iter().all(|m| parent.contains(m))
    }

    pub fn smallest_generalization(&self, values: &[EnumValue]) -> EnumValue {
        if values.is_empty() {
            return Self::simplify(self.declared.clone());
        }
        // Distinct union in declaration order.
        let present: HashSet<&str> = values
            .iter()
            .flat_map(|v| v.members().iter().map(String::as_str))
            .collect();
        let names: Vec<String> = self
            .declared
            .iter()
            .filter(|d| present.contains(d.as_str()))
            .cloned()
            .collect();
        Self::simplify(names)
    }

    pub fn error_cost(&self, partition: &Partition) -> f64 {
        let agg = match &partition.aggregate {
            AttributeValue::Enum(v) => v.cardinality(),
            _ => return 0.0,
        };
        let cards: Vec<usize> = partition
            .values
            .iter()
            .filter_map(|v| match v {
                AttributeValue::Enum(ev) => Some(ev.cardinality()),
                _ => None,
            })
            .collect();
        if cards.is_empty() {
            return 0.0;
        }
        let total: f64 = cards.iter().map(|&c| agg as f64 / c as f64).sum();
        total / cards.len() as f64 - 1.0
    }

    /// Greedy cluster split: start from the largest-cardinality value and
    /// absorb every value sharing at least one member name, repeating with
    /// a fresh lead until the cluster reaches `k`. The untouched remainder
    /// is the other side.
    pub fn try_split(
        &self,
        partition: &Partition,
        k: usize,
    ) -> Option<(Vec<usize>, Vec<usize>)> {
        if partition.values.len() < 2 * k {
            return None;
        }

        let members: Vec<&EnumValue> = partition
            .values
            .iter()
            .filter_map(|v| match v {
                AttributeValue::Enum(ev) => Some(ev),
                _ => None,
            })
            .collect();
        if members.len() != partition.values.len() {
            return None;
        }

        let mut growing: Vec<usize> = Vec::new();
        let mut shrinking: Vec<usize> = (0..members.len()).collect();

        while growing.len() < k && shrinking.len() > k {
            // Largest-cardinality value leads; first wins ties.
            let lead_pos = shrinking
                .iter()
                .enumerate()
                .max_by_key(|&(pos, &i)| (members[i].cardinality(), std::cmp::Reverse(pos)))
                .map(|(pos, _)| pos)?;
            let lead = shrinking.remove(lead_pos);

            let mut absorbed: HashSet<&str> =
                members[lead].members().iter().map(String::as_str).collect();
            growing.push(lead);

            loop {
                let before = absorbed.len();
                let (overlap, rest): (Vec<usize>, Vec<usize>) = shrinking
                    .iter()
                    .partition(|&&i| members[i].members().iter().any(|m| absorbed.contains(m.as_str())));
                shrinking = rest;
                for &i in &overlap {
                    absorbed.extend(members[i].members().iter().map(String::as_str));
                    growing.push(i);
                }
                if absorbed.len() == before {
                    break;
                }
            }
        }

        if growing.len() >= k && shrinking.len() >= k {
            Some((growing, shrinking))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr() -> EnumAttribute {
        EnumAttribute::new(
            "Job",
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
        )
    }

    fn part(a: &EnumAttribute, values: &[EnumValue]) -> Partition {
        let aggregate = AttributeValue::Enum(a.smallest_generalization(values));
        Partition::new(
            values.iter().cloned().map(AttributeValue::Enum).collect(),
            aggregate,
        )
    }

    #[test]
    fn parse_rejects_unknown_member() {
        let a = attr();
        assert!(a.parse("A").is_ok());
        assert!(a.parse("Z").is_err());
    }

    #[test]
    fn generalization_collapses_singleton_union() {
        let a = attr();
        let agg = a.smallest_generalization(&[
            EnumValue::Simple("A".into()),
            EnumValue::Simple("A".into()),
        ]);
        assert_eq!(agg, EnumValue::Simple("A".into()));
    }

    #[test]
    fn two_by_two_cluster_split() {
        // [A, A, B, B] at k=2 splits into the two pure classes.
        let a = attr();
        let values = vec![
            EnumValue::Simple("A".into()),
            EnumValue::Simple("A".into()),
            EnumValue::Simple("B".into()),
            EnumValue::Simple("B".into()),
        ];
        let p = part(&a, &values);
        let (left, right) = a.try_split(&p, 2).unwrap();
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 2);

        let left_vals: Vec<EnumValue> = left.iter().map(|&i| values[i].clone()).collect();
        let right_vals: Vec<EnumValue> = right.iter().map(|&i| values[i].clone()).collect();
        let mut aggs = [
            a.smallest_generalization(&left_vals),
            a.smallest_generalization(&right_vals),
        ];
        aggs.sort_by_key(|v| a.show(v));
        assert_eq!(aggs[0], EnumValue::Simple("A".into()));
        assert_eq!(aggs[1], EnumValue::Simple("B".into()));
    }

    #[test]
    fn overlapping_unions_stay_together() {
        let a = attr();
        let values = vec![
            EnumValue::Union(vec!["A".into(), "B".into()]),
            EnumValue::Simple("A".into()),
            EnumValue::Simple("B".into()),
            EnumValue::Simple("C".into()),
            EnumValue::Simple("C".into()),
            EnumValue::Simple("C".into()),
        ];
        let p = part(&a, &values);
        let (left, right) = a.try_split(&p, 3).unwrap();
        // The union chains A and B onto one side.
        assert_eq!(left, vec![0, 1, 2]);
        assert_eq!(right, vec![3, 4, 5]);
    }

    #[test]
    fn split_refuses_when_one_side_starves() {
        let a = attr();
        // Every value overlaps through the union; no cut leaves k on both sides.
        let values = vec![
            EnumValue::Union(vec!["A".into(), "B".into()]),
            EnumValue::Simple("A".into()),
            EnumValue::Simple("B".into()),
            EnumValue::Simple("A".into()),
        ];
        let p = part(&a, &values);
        assert!(a.try_split(&p, 2).is_none());
    }
}
