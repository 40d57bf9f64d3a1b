//! Streaming anonymization under a bounded memory budget.

use std::io::Write;
use std::mem;

use tracing::{debug, warn};
use veil_schema::{Record, RecordDescriptor};

use crate::error::EngineError;
use crate::partition::RecordPartition;

/// Tuning knobs of the streaming loop.
#[derive(Debug, Clone, Copy)]
pub struct StreamOptions {
    /// Flush once this many records are buffered across all partitions.
    pub stored_limit: usize,
    /// Fraction of released classes retained as routing seeds for the
    /// next cycle, highest information loss first.
    pub holdback_ratio: f64,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            stored_limit: 100,
            holdback_ratio: 0.1,
        }
    }
}

/// Incremental anonymizer: buffers records into live partitions and
/// periodically flushes them as released equivalence classes.
///
/// Records are routed to the first held-back partition that covers them;
/// everything else lands in the fresh partition. Once the total buffered
/// count reaches `stored_limit`, a flush splits the buffered records
/// recursively, releases every class of size >= `k`, and holds back the
/// costliest class boundaries to seed routing in the next cycle.
pub struct StreamAnonymizer<'d, W: Write> {
    descriptor: &'d RecordDescriptor,
    k: usize,
    options: StreamOptions,
    stored: Vec<RecordPartition<'d>>,
    fresh: RecordPartition<'d>,
    out: W,
}

impl<'d, W: Write> StreamAnonymizer<'d, W> {
    pub fn new(descriptor: &'d RecordDescriptor, k: usize, options: StreamOptions, out: W) -> Self {
        Self {
            descriptor,
            k,
            options,
            stored: Vec::new(),
            fresh: RecordPartition::new(descriptor, k),
            out,
        }
    }

    fn buffered(&self) -> usize {
        self.stored.iter().map(RecordPartition::len).sum::<usize>() + self.fresh.len()
    }

    /// Routes one record, flushing when the buffer limit is reached.
    pub fn process(&mut self, record: Record) -> Result<(), EngineError> {
        match self.stored.iter_mut().find(|p| p.contains(&record)) {
            Some(partition) => {
                partition.add(record);
            }
            None => {
                self.fresh.add(record);
            }
        }
        if self.buffered() >= self.options.stored_limit {
            self.flush()?;
        }
        Ok(())
    }

    /// Releases everything currently buffered.
    ///
    /// Held-back partitions smaller than `k` are dissolved into the
    /// fresh partition first; if the fresh partition is still below `k`,
    /// it borrows whole held-back partitions from the front until it is
    /// viable. All partitions are then split recursively, classes of
    /// size >= `k` are released, and a `holdback_ratio` share of the
    /// released classes, highest `error_sum` first, is kept (emptied) to
    /// route the next cycle.
    pub fn flush(&mut self) -> Result<(), EngineError> {
        let k = self.k;
        let mut fresh = mem::replace(&mut self.fresh, RecordPartition::new(self.descriptor, k));
        let mut stored = mem::take(&mut self.stored);

        // Sub-k stored partitions cannot release on their own.
        let mut viable = Vec::with_capacity(stored.len());
        for partition in stored.drain(..) {
            if partition.len() < k {
                for record in partition.into_records() {
                    fresh.add(record);
                }
            } else {
                viable.push(partition);
            }
        }

        // The fresh partition borrows whole stored partitions until it
        // can release too.
        while fresh.len() < k && !viable.is_empty() {
            let donor = viable.remove(0);
            for record in donor.into_records() {
                fresh.add(record);
            }
        }

        let mut classes: Vec<RecordPartition<'d>> = Vec::new();
        for partition in viable {
            classes.extend(partition.split_recursively());
        }
        if !fresh.is_empty() {
            classes.extend(fresh.split_recursively());
        }

        let mut released: Vec<RecordPartition<'d>> = Vec::new();
        for class in classes {
            if class.len() >= k {
                class.release_all(&mut self.out)?;
                released.push(class);
            } else {
                // Can only happen when fewer than k records were buffered
                // in total; suppressing them preserves the guarantee.
                warn!(
                    size = class.len(),
                    k, "suppressing equivalence class below k"
                );
            }
        }
        self.out.flush()?;

        let keep_count = (released.len() as f64 * self.options.holdback_ratio) as usize;
        released.sort_by(|a, b| {
            b.error_sum()
                .partial_cmp(&a.error_sum())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self.stored = released
            .into_iter()
            .take(keep_count)
            .map(|mut class| {
                class.clear();
                class
            })
            .collect();
        debug!(held_back = self.stored.len(), "flush complete");
        Ok(())
    }

    /// Flushes any remaining buffered records and returns the writer.
    pub fn close(mut self) -> Result<W, EngineError> {
        if self.buffered() > 0 {
            self.flush()?;
        }
        Ok(self.out)
    }
}
