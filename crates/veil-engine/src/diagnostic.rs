//! Measuring the k-anonymity a dataset already has.

use veil_attribute::AttributeValue;
use veil_schema::{Record, RecordDescriptor};

/// Groups records into equivalence classes by quasi-value coverage.
///
/// Classes are refined one quasi column at a time: within each class a
/// record joins the first group whose key value covers its own, so
/// already-generalized values act as the group key for the raw values
/// beneath them.
pub fn split_to_equivalence_classes<'a>(
    descriptor: &RecordDescriptor,
    records: &[&'a Record],
) -> Vec<Vec<&'a Record>> {
    let mut classes: Vec<Vec<&Record>> = vec![records.to_vec()];
    for &position in descriptor.quasi_positions() {
        let Some(ty) = descriptor.quasi_type(position) else {
            continue;
        };
        let mut refined: Vec<Vec<&Record>> = Vec::new();
        for class in classes {
            let mut groups: Vec<(AttributeValue, Vec<&Record>)> = Vec::new();
            for record in class {
                let Some(value) = record.quasi_value(position) else {
                    continue;
                };
                match groups.iter_mut().find(|(key, _)| ty.subset_of(key, value)) {
                    Some((_, members)) => members.push(record),
                    None => groups.push((value.clone(), vec![record])),
                }
            }
            refined.extend(groups.into_iter().map(|(_, members)| members));
        }
        classes = refined;
    }
    classes
}

/// The k-anonymity of `records`: the size of the smallest equivalence
/// class. An empty dataset has k-anonymity 0.
pub fn calculate_k_anonymity(descriptor: &RecordDescriptor, records: &[Record]) -> usize {
    let refs: Vec<&Record> = records.iter().collect();
    split_to_equivalence_classes(descriptor, &refs)
        .iter()
        .map(Vec::len)
        .min()
        .unwrap_or(0)
}
