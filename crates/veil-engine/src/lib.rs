//! # veil-engine: the anonymization engine
//!
//! Turns parsed records into released equivalence classes of size >= `k`
//! by multidimensional recursive partitioning (Mondrian-style).
//!
//! Two delivery modes share the same splitter:
//! - **Batch** ([`anonymize_records`], [`anonymize_file`]) materializes
//!   the whole dataset, builds one [`RecordPartition`] over it, and
//!   splits recursively.
//! - **Streaming** ([`StreamAnonymizer`]) assigns arriving records to
//!   live partitions under a bounded memory budget, flushing and holding
//!   back the most useful partition boundaries across cycles.
//!
//! [`calculate_k_anonymity`] measures the k-anonymity a dataset already
//! has, independent of the splitter.
//!
//! The engine is single-threaded and synchronous; partitions are never
//! shared across tasks, and a failed split leaves its partition
//! untouched.

mod batch;
mod diagnostic;
mod error;
mod partition;
mod stream;


pub use batch::{anonymize_file, anonymize_records, anonymize_to_writer, read_records};
pub use diagnostic::{calculate_k_anonymity, split_to_equivalence_classes};
pub use error::EngineError;
pub use partition::RecordPartition;
pub use stream::{StreamAnonymizer, StreamOptions};
