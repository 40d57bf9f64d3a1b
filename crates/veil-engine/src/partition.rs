//! A mutable group of records and its per-column generalizations.

use std::io::Write;

use tracing::warn;
use veil_attribute::{AttributeValue, Partition, QuasiType};
use veil_schema::{AttributeRole, Record, RecordDescriptor, SECRET_MASK, identity_token};

use crate::error::EngineError;

/// Per-quasi-column state of a record partition.
#[derive(Debug, Clone)]
struct ColumnState<'d> {
    /// Column position in the record.
    position: usize,
    ty: &'d QuasiType,
    /// Projection of the current record set; `None` while empty.
    partition: Option<Partition>,
    /// Aggregate remembered across a `clear()`, so an emptied partition
    /// can still route records it used to cover.
    previous_aggregate: Option<AttributeValue>,
}

/// A group of records plus, for every quasi column, the [`Partition`] of
/// that column's projected values.
///
/// Invariant: each column partition is always exactly the column
/// projection of the current record set. It is fully recomputed on every
/// membership change so the aggregate contract stays exact.
#[derive(Debug, Clone)]
pub struct RecordPartition<'d> {
    descriptor: &'d RecordDescriptor,
    k: usize,
    records: Vec<Record>,
    columns: Vec<ColumnState<'d>>,
}

impl<'d> RecordPartition<'d> {
    pub fn new(descriptor: &'d RecordDescriptor, k: usize) -> Self {
        Self::from_records(descriptor, k, Vec::new())
    }

    pub fn from_records(descriptor: &'d RecordDescriptor, k: usize, records: Vec<Record>) -> Self {
        let columns = descriptor
            .quasi_positions()
            .iter()
            .filter_map(|&position| {
                Some(ColumnState {
                    position,
                    ty: descriptor.quasi_type(position)?,
                    partition: None,
                    previous_aggregate: None,
                })
            })
            .collect();
        let mut partition = Self {
            descriptor,
            k,
            records,
            columns,
        };
        partition.recompute();
        partition
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the partition, yielding its records in arrival order.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    fn recompute(&mut self) {
        for column in &mut self.columns {
            column.partition = if self.records.is_empty() {
                None
            } else {
                let values: Vec<AttributeValue> = self
                    .records
                    .iter()
                    .filter_map(|r| r.quasi_value(column.position).cloned())
                    .collect();
                Some(column.ty.partition(values))
            };
        }
    }

    /// Appends a record and recomputes every column partition.
    ///
    /// Returns true once the partition has grown past `k`, the signal a
    /// streaming caller uses to consider it flush-eligible.
    pub fn add(&mut self, record: Record) -> bool {
        self.records.push(record);
        self.recompute();
        self.len() > self.k
    }

    /// True iff every quasi value of `record` is covered by this
    /// partition's current aggregate and, if one is remembered, by the
    /// aggregate retained from before the last `clear()`.
    pub fn contains(&self, record: &Record) -> bool {
        self.columns.iter().all(|column| {
            let Some(value) = record.quasi_value(column.position) else {
                return false;
            };
            let current_ok = column
                .partition
                .as_ref()
                .is_none_or(|p| column.ty.subset_of(&p.aggregate, value));
            let previous_ok = column
                .previous_aggregate
                .as_ref()
                .is_none_or(|agg| column.ty.subset_of(agg, value));
            current_ok && previous_ok
        })
    }

    /// Empties the record set while remembering the per-column aggregates
    /// so `contains` can still route future records here.
    pub fn clear(&mut self) {
        for column in &mut self.columns {
            column.previous_aggregate = column.partition.as_ref().map(|p| p.aggregate.clone());
        }
        self.records.clear();
        self.recompute();
    }

    /// Total information loss across all quasi columns.
    pub fn error_sum(&self) -> f64 {
        self.columns
            .iter()
            .filter_map(|column| {
                let partition = column.partition.as_ref()?;
                Some(column.ty.error_cost(partition))
            })
            .sum()
    }

    /// Splits into two partitions along the quasi column with the
    /// greatest information gain.
    ///
    /// Returns `None` below `2k`. When the size warrants a split but no
    /// column produces one, the partition is kept whole and the condition
    /// is logged.
    pub fn split(&self) -> Option<(RecordPartition<'d>, RecordPartition<'d>, f64)> {
        if self.len() < 2 * self.k {
            return None;
        }

        let mut best: Option<(Vec<usize>, f64)> = None;
        for column in &self.columns {
            let Some(partition) = column.partition.as_ref() else {
                continue;
            };
            let Some((left, right)) = column.ty.try_split(partition, self.k) else {
                continue;
            };

            let whole_error = column.ty.error_cost(partition);
            let left_error = column.ty.error_cost(&sub_partition(column.ty, partition, &left));
            let right_error = column.ty.error_cost(&sub_partition(column.ty, partition, &right));
            let gain = 2.0 * whole_error - left_error - right_error;

            // Strictly greater: earliest declared column wins ties.
            if best.as_ref().is_none_or(|(_, g)| gain > *g) {
                best = Some((left, gain));
            }
        }

        let Some((left_indices, gain)) = best else {
            warn!(
                size = self.len(),
                k = self.k,
                "cannot split partition despite size >= 2k; keeping it as one class"
            );
            return None;
        };

        let mut in_left = vec![false; self.len()];
        for &i in &left_indices {
            in_left[i] = true;
        }
        let mut left_records = Vec::with_capacity(left_indices.len());
        let mut right_records = Vec::with_capacity(self.len() - left_indices.len());
        for (i, record) in self.records.iter().enumerate() {
            if in_left[i] {
                left_records.push(record.clone());
            } else {
                right_records.push(record.clone());
            }
        }

        Some((
            Self::from_records(self.descriptor, self.k, left_records),
            Self::from_records(self.descriptor, self.k, right_records),
            gain,
        ))
    }

    /// Depth-first recursive splitting; partitions that cannot split
    /// become the resulting equivalence classes.
    pub fn split_recursively(self) -> Vec<RecordPartition<'d>> {
        match self.split() {
            Some((left, right, _)) => {
                let mut classes = left.split_recursively();
                classes.extend(right.split_recursively());
                classes
            }
            None => vec![self],
        }
    }

    /// Releases every member record: quasi columns as the partition
    /// aggregate, secret columns masked, secret-identity columns hashed,
    /// passthrough columns verbatim; columns in original position order.
    pub fn release_all(&self, out: &mut impl Write) -> Result<(), EngineError> {
        let mut rendered = Vec::with_capacity(self.descriptor.arity());
        for record in &self.records {
            rendered.clear();
            for attribute in self.descriptor.attributes() {
                let field = match &attribute.role {
                    AttributeRole::Passthrough | AttributeRole::Secret => record
                        .text(attribute.position)
                        .unwrap_or(SECRET_MASK)
                        .to_string(),
                    AttributeRole::SecretIdentity => {
                        identity_token(record.text(attribute.position).unwrap_or_default())
                    }
                    AttributeRole::Quasi(ty) => self
                        .columns
                        .iter()
                        .find(|c| c.position == attribute.position)
                        .and_then(|c| c.partition.as_ref())
                        .map_or_else(|| SECRET_MASK.to_string(), |p| ty.show(&p.aggregate)),
                };
                rendered.push(field);
            }
            writeln!(out, "{}", rendered.join(";"))?;
        }
        Ok(())
    }
}

fn sub_partition(ty: &QuasiType, partition: &Partition, indices: &[usize]) -> Partition {
    let values: Vec<AttributeValue> = indices
        .iter()
        .map(|&i| partition.values[i].clone())
        .collect();
    ty.partition(values)
}
