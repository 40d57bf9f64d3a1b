//! Bounded integer attribute.

use crate::error::AttributeError;
use crate::partition::Partition;
use crate::range::{greedy_interval_split, mean_span_cost};
use crate::value::AttributeValue;

/// An integer value: either a concrete observation or a covering range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntValue {
    Simple(i64),
    Range(i64, i64),
}

impl IntValue {
    pub fn min(self) -> i64 {
        match self {
            Self::Simple(v) => v,
            Self::Range(lo, _) => lo,
        }
    }

    pub fn max(self) -> i64 {
        match self {
            Self::Simple(v) => v,
            Self::Range(_, hi) => hi,
        }
    }

    /// Number of integers the value covers.
    pub fn span(self) -> i64 {
        self.max() - self.min() + 1
    }
}

/// Quasi-identifier type for bounded integers.
///
/// Concrete values parse from plain integers, covering values from
/// `lo:hi` range literals. Generalization widens to the enclosing
/// `[min, max]` interval.
#[derive(Debug, Clone)]
pub struct IntAttribute {
    min_value: i64,
    max_value: i64,
}

impl Default for IntAttribute {
    fn default() -> Self {
        Self {
            min_value: i64::MIN,
            max_value: i64::MAX,
        }
    }
}

impl IntAttribute {
    pub fn new(min_value: i64, max_value: i64) -> Self {
        Self {
            min_value,
            max_value,
        }
    }

    pub fn with_min(min_value: i64) -> Self {
        Self {
            min_value,
            ..Self::default()
        }
    }

    pub fn with_max(max_value: i64) -> Self {
        Self {
            max_value,
            ..Self::default()
        }
    }

    fn in_range(&self, value: i64, text: &str) -> Result<i64, AttributeError> {
        if (self.min_value..=self.max_value).contains(&value) {
            Ok(value)
        } else {
            Err(AttributeError::OutOfRange {
                text: text.to_string(),
                lo: self.min_value.to_string(),
                hi: self.max_value.to_string(),
            })
        }
    }

    /// Collapses a degenerate range back to a simple value.
    fn simplify(lo: i64, hi: i64) -> IntValue {
        if lo == hi {
            IntValue::Simple(lo)
        } else {
            IntValue::Range(lo, hi)
        }
    }

    pub fn parse(&self, text: &str) -> Result<IntValue, AttributeError> {
        let cleaned = text.trim();

        if let Ok(single) = cleaned.parse::<i64>() {
            return Ok(IntValue::Simple(self.in_range(single, cleaned)?));
        }

        let tokens: Vec<&str> = cleaned.split(':').map(str::trim).collect();
        if tokens.len() != 2 {
            return Err(AttributeError::Malformed {
                kind: "int",
                text: cleaned.to_string(),
            });
        }
        let parse_end = |t: &str| {
            t.parse::<i64>().map_err(|_| AttributeError::InvalidRange {
                kind: "int",
                text: cleaned.to_string(),
            })
        };
        let lo = self.in_range(parse_end(tokens[0])?, cleaned)?;
        let hi = self.in_range(parse_end(tokens[1])?, cleaned)?;
        if lo > hi {
            return Err(AttributeError::InvalidRange {
                kind: "int",
                text: cleaned.to_string(),
            });
        }
        Ok(Self::simplify(lo, hi))
    }

    pub fn show(&self, value: &IntValue) -> String {
        match value {
            IntValue::Simple(v) => v.to_string(),
            IntValue::Range(lo, hi) => format!("{lo}:{hi}"),
        }
    }

    pub fn subset_of(&self, parent: &IntValue, child: &IntValue) -> bool {
        child.min() >= parent.min() && child.max() <= parent.max()
    }

    pub fn smallest_generalization(&self, values: &[IntValue]) -> IntValue {
        let lo = values.iter().map(|v| v.min()).min().unwrap_or(self.min_value);
        let hi = values.iter().map(|v| v.max()).max().unwrap_or(self.max_value);
        Self::simplify(lo, hi)
    }

    pub fn error_cost(&self, partition: &Partition) -> f64 {
        let spans = int_spans(&partition.values);
        let agg = match &partition.aggregate {
            AttributeValue::Int(v) => v.span(),
            _ => return 0.0,
        };
        mean_span_cost(agg, &spans)
    }

    pub fn try_split(
        &self,
        partition: &Partition,
        k: usize,
    ) -> Option<(Vec<usize>, Vec<usize>)> {
        greedy_interval_split(&int_spans(&partition.values), k)
    }
}

fn int_spans(values: &[AttributeValue]) -> Vec<(i64, i64)> {
    values
        .iter()
        .filter_map(|v| match v {
            AttributeValue::Int(iv) => Some((iv.min(), iv.max())),
            _ => None,
        })
        .collect()
}
