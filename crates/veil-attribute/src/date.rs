//! Bounded date attribute.

use chrono::{Datelike, NaiveDate};

use crate::error::AttributeError;
use crate::partition::Partition;
use crate::range::{greedy_interval_split, mean_span_cost};
use crate::value::AttributeValue;

/// Default input/output date format.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A date value: a concrete day or a covering day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateValue {
    Simple(NaiveDate),
    Range(NaiveDate, NaiveDate),
}

impl DateValue {
    pub fn min(self) -> NaiveDate {
        match self {
            Self::Simple(d) => d,
            Self::Range(lo, _) => lo,
        }
    }

    pub fn max(self) -> NaiveDate {
        match self {
            Self::Simple(d) => d,
            Self::Range(_, hi) => hi,
        }
    }

    /// Inclusive span in days, as an ordinal interval.
    fn ordinals(self) -> (i64, i64) {
        (
            i64::from(self.min().num_days_from_ce()),
            i64::from(self.max().num_days_from_ce()),
        )
    }
}

/// Quasi-identifier type for bounded dates.
///
/// The format string follows chrono's strftime syntax. Covering values
/// parse from `lo:hi` range literals in the same format.
#[derive(Debug, Clone)]
pub struct DateAttribute {
    format: String,
    after: NaiveDate,
    before: NaiveDate,
}

impl Default for DateAttribute {
    fn default() -> Self {
        Self {
            format: DEFAULT_DATE_FORMAT.to_string(),
            after: NaiveDate::MIN,
            before: NaiveDate::MAX,
        }
    }
}

impl DateAttribute {
    pub fn new(format: impl Into<String>, after: Option<NaiveDate>, before: Option<NaiveDate>) -> Self {
        Self {
            format: format.into(),
            after: after.unwrap_or(NaiveDate::MIN),
            before: before.unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    fn parse_day(&self, text: &str) -> Result<NaiveDate, AttributeError> {
        let day = NaiveDate::parse_from_str(text.trim(), &self.format).map_err(|_| {
            AttributeError::BadDateFormat {
                text: text.trim().to_string(),
                format: self.format.clone(),
            }
        })?;
        if (self.after..=self.before).contains(&day) {
            Ok(day)
        } else {
            Err(AttributeError::OutOfRange {
                text: text.trim().to_string(),
                lo: self.after.to_string(),
                hi: self.before.to_string(),
            })
        }
    }

    fn simplify(lo: NaiveDate, hi: NaiveDate) -> DateValue {
        if lo == hi {
            DateValue::Simple(lo)
        } else {
            DateValue::Range(lo, hi)
        }
    }

    pub fn parse(&self, text: &str) -> Result<DateValue, AttributeError> {
        let cleaned = text.trim();
        if !cleaned.contains(':') {
            return Ok(DateValue::Simple(self.parse_day(cleaned)?));
        }

        let tokens: Vec<&str> = cleaned.split(':').collect();
        if tokens.len() != 2 {
            return Err(AttributeError::InvalidRange {
                kind: "date",
                text: cleaned.to_string(),
            });
        }
        let lo = self.parse_day(tokens[0])?;
        let hi = self.parse_day(tokens[1])?;
        if lo > hi {
            return Err(AttributeError::InvalidRange {
                kind: "date",
                text: cleaned.to_string(),
            });
        }
        Ok(Self::simplify(lo, hi))
    }

    pub fn show(&self, value: &DateValue) -> String {
        match value {
            DateValue::Simple(d) => d.format(&self.format).to_string(),
            DateValue::Range(lo, hi) => {
                format!("{}:{}", lo.format(&self.format), hi.format(&self.format))
            }
        }
    }

    pub fn subset_of(&self, parent: &DateValue, child: &DateValue) -> bool {
        child.min() >= parent.min() && child.max() <= parent.max()
    }

    pub fn smallest_generalization(&self, values: &[DateValue]) -> DateValue {
        let lo = values.iter().map(|v| v.min()).min().unwrap_or(self.after);
        let hi = values.iter().map(|v| v.max()).max().unwrap_or(self.before);
        Self::simplify(lo, hi)
    }

    pub fn error_cost(&self, partition: &Partition) -> f64 {
        let spans = date_spans(&partition.values);
        let agg = match &partition.aggregate {
            AttributeValue::Date(v) => {
                let (lo, hi) = v.ordinals();
                hi - lo + 1
            }
            _ => return 0.0,
        };
        mean_span_cost(agg, &spans)
    }

    pub fn try_split(
        &self,
        partition: &Partition,
        k: usize,
    ) -> Option<(Vec<usize>, Vec<usize>)> {
        greedy_interval_split(&date_spans(&partition.values), k)
    }
}

fn date_spans(values: &[AttributeValue]) -> Vec<(i64, i64)> {
    values
        .iter()
        .filter_map(|v| match v {
            AttributeValue::Date(dv) => Some(dv.ordinals()),
            _ => None,
        })
        .collect()
}
