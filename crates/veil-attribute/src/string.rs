//! Length-bounded string attribute.
//!
//! Strings do not split; they anonymize only through suffix masking. The
//! generalization of a value set is the shared prefix padded with mask
//! characters, or a fully masked value at the longest length when the
//! member lengths differ.

use crate::MASK_CHAR;
use crate::error::AttributeError;
use crate::partition::Partition;
use crate::value::AttributeValue;

/// A string value: a concrete observation or a masked covering value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StringValue {
    Simple(String),
    /// Shared prefix plus masked positions up to `len` characters total.
    Masked { prefix: String, len: usize },
}

impl StringValue {
    fn prefix(&self) -> &str {
        match self {
            Self::Simple(s) => s,
            Self::Masked { prefix, .. } => prefix,
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Simple(s) => s.chars().count(),
            Self::Masked { len, .. } => *len,
        }
    }
}

/// Quasi-identifier type for length-bounded strings.
#[derive(Debug, Clone)]
pub struct StringAttribute {
    min_len: usize,
    max_len: usize,
}

impl Default for StringAttribute {
    fn default() -> Self {
        Self {
            min_len: 0,
            max_len: usize::MAX,
        }
    }
}

impl StringAttribute {
    pub fn new(min_len: usize, max_len: usize) -> Self {
        Self { min_len, max_len }
    }

    pub fn with_min(min_len: usize) -> Self {
        Self {
            min_len,
            ..Self::default()
        }
    }

    pub fn with_max(max_len: usize) -> Self {
        Self {
            max_len,
            ..Self::default()
        }
    }

    pub fn parse(&self, text: &str) -> Result<StringValue, AttributeError> {
        let len = text.chars().count();
        if !(self.min_len..=self.max_len).contains(&len) {
            return Err(AttributeError::LengthOutOfRange {
                text: text.to_string(),
                len,
                min_len: self.min_len,
                max_len: self.max_len,
            });
        }
        if text.contains(MASK_CHAR) {
            // A masked literal re-enters as a covering value.
            let prefix: String = text.chars().take_while(|&c| c != MASK_CHAR).collect();
            Ok(StringValue::Masked { prefix, len })
        } else {
            Ok(StringValue::Simple(text.to_string()))
        }
    }

    pub fn show(&self, value: &StringValue) -> String {
        match value {
            StringValue::Simple(s) => s.clone(),
            StringValue::Masked { prefix, len } => {
                let masked = len.saturating_sub(prefix.chars().count());
                let mut out = prefix.clone();
                out.extend(std::iter::repeat_n(MASK_CHAR, masked));
                out
            }
        }
    }

    pub fn subset_of(&self, parent: &StringValue, child: &StringValue) -> bool {
        match parent {
            StringValue::Simple(p) => match child {
                StringValue::Simple(c) => p == c,
                StringValue::Masked { .. } => false,
            },
            StringValue::Masked { prefix, len } => {
                child.len() <= *len && child.prefix().starts_with(prefix.as_str())
            }
        }
    }

    pub fn smallest_generalization(&self, values: &[StringValue]) -> StringValue {
        let Some(first) = values.first() else {
            return StringValue::Masked {
                prefix: String::new(),
                len: 0,
            };
        };
        if values.len() == 1 {
            return first.clone();
        }

        let max_len = values.iter().map(StringValue::len).max().unwrap_or(0);
        if values.iter().any(|v| v.len() != max_len) {
            // Differing lengths: only a fully masked value covers all.
            return StringValue::Masked {
                prefix: String::new(),
                len: max_len,
            };
        }

        let mut prefix: Vec<char> = first.prefix().chars().collect();
        for v in &values[1..] {
            let common = prefix
                .iter()
                .zip(v.prefix().chars())
                .take_while(|(a, b)| **a == *b)
                .count();
            prefix.truncate(common);
        }

        let prefix: String = prefix.into_iter().collect();
        if prefix.chars().count() == max_len && values.iter().all(|v| matches!(v, StringValue::Simple(_))) {
            StringValue::Simple(prefix)
        } else {
            StringValue::Masked {
                prefix,
                len: max_len,
            }
        }
    }

    pub fn error_cost(&self, partition: &Partition) -> f64 {
        let AttributeValue::Text(aggregate) = &partition.aggregate else {
            return 0.0;
        };
        let StringValue::Masked { prefix, .. } = aggregate else {
            return 0.0;
        };
        let kept = prefix.chars().count();

        let mut total = 0.0;
        let mut n = 0usize;
        for v in &partition.values {
            if let AttributeValue::Text(sv) = v {
                let len = sv.len();
                if len > 0 {
                    total += len.saturating_sub(kept) as f64 / len as f64;
                }
                n += 1;
            }
        }
        if n == 0 { 0.0 } else { total / n as f64 }
    }

    /// Strings cannot be partitioned into disjoint sub-domains; the split
    /// is always refused.
    pub fn try_split(&self, _partition: &Partition, _k: usize) -> Option<(Vec<usize>, Vec<usize>)> {
        None
    }
}
