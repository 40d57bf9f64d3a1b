//! Whole-dataset anonymization.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use tracing::info;
use veil_schema::{Record, RecordDescriptor};

use crate::error::EngineError;
use crate::partition::RecordPartition;

/// Splits the full record set into equivalence classes of size >= `k`.
///
/// With fewer than `2k` records no split is possible and the whole set
/// comes back as a single class.
pub fn anonymize_records<'d>(
    descriptor: &'d RecordDescriptor,
    k: usize,
    records: Vec<Record>,
) -> Vec<RecordPartition<'d>> {
    let total = records.len();
    let classes = RecordPartition::from_records(descriptor, k, records).split_recursively();
    info!(records = total, classes = classes.len(), k, "batch partitioning done");
    classes
}

/// Reads `;`-delimited records from `input`, skipping blank lines and
/// `#` comments. Fails fast on the first malformed line.
pub fn read_records(
    descriptor: &RecordDescriptor,
    input: impl Read,
) -> Result<Vec<Record>, EngineError> {
    let mut records = Vec::new();
    for (index, line) in BufReader::new(input).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record = descriptor.parse_line(trimmed).map_err(|source| EngineError::Line {
            line_number: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Anonymizes `records` and writes every released line to `out`.
pub fn anonymize_to_writer(
    descriptor: &RecordDescriptor,
    k: usize,
    records: Vec<Record>,
    out: &mut impl Write,
) -> Result<(), EngineError> {
    for class in anonymize_records(descriptor, k, records) {
        class.release_all(out)?;
    }
    out.flush()?;
    Ok(())
}

/// File-to-file batch driver.
pub fn anonymize_file(
    descriptor: &RecordDescriptor,
    k: usize,
    input: &Path,
    output: &Path,
) -> Result<(), EngineError> {
    let records = read_records(descriptor, File::open(input)?)?;
    let mut out = File::create(output)?;
    anonymize_to_writer(descriptor, k, records, &mut out)
}
