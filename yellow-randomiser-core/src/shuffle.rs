use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::patch::PatchGroup;
use crate::{RandomiserError, Result};

/// Uniformly permute the records of `group`.
///
/// Each record keeps its own bytes together, so a width-1 group is a plain
/// value shuffle and wider groups move their tuples as a unit. The returned
/// group has the same addresses and the same multiset of records.
pub fn shuffle_records<R: Rng + ?Sized>(group: &PatchGroup, rng: &mut R) -> PatchGroup {
    let mut order: Vec<usize> = (0..group.record_count()).collect();
    order.shuffle(rng);
    reassign(group, &order)
}

/// Shuffle records only among others with the same label.
///
/// `labels` holds one label per record. Partitions are shuffled in ascending
/// label order so a seeded RNG always gives the same result.
pub fn shuffle_partitioned<L, R>(group: &PatchGroup, labels: &[L], rng: &mut R) -> Result<PatchGroup>
where
    L: Ord + Copy,
    R: Rng + ?Sized,
{
    if labels.len() != group.record_count() {
        return Err(RandomiserError::PartitionMismatch {
            labels: labels.len(),
            records: group.record_count(),
        });
    }

    let mut partitions: BTreeMap<L, Vec<usize>> = BTreeMap::new();
    for (index, &label) in labels.iter().enumerate() {
        partitions.entry(label).or_default().push(index);
    }

    let mut order: Vec<usize> = (0..group.record_count()).collect();
    for members in partitions.values() {
        let mut sources = members.clone();
        sources.shuffle(rng);
        for (&dst, &src) in members.iter().zip(&sources) {
            order[dst] = src;
        }
    }

    Ok(reassign(group, &order))
}

// order[dst] is the record whose values land in record slot dst.
fn reassign(group: &PatchGroup, order: &[usize]) -> PatchGroup {
    let mut values = Vec::with_capacity(order.len() * group.width());
    for &src in order {
        values.extend_from_slice(group.record(src));
    }
    group.with_values(values)
}
