//! Grouping engine: partitions fruits by a taxonomic key
//!
//! Groups come out in first-appearance order of their label and keep the
//! source order of their members, so flattening a grouped view is a stable
//! permutation of the input.

use std::collections::HashMap;

use tracing::debug;

use crate::aggregate::{positive_total, share_of};
use crate::interface::{
    AddOutcome, BatchAddOutcome, BatchPolicy, ConfirmOutcome, Fruit, FruitGroup, GroupKey,
    GroupStat, GroupedView, NutrientKind, UNGROUPED_LABEL,
};
use crate::jar::JarState;

/// Partition `fruits` by `key`
pub fn group(fruits: &[Fruit], key: GroupKey) -> GroupedView {
    if key == GroupKey::Ungrouped {
        return GroupedView {
            key,
            groups: vec![FruitGroup {
                label: UNGROUPED_LABEL.to_string(),
                count: fruits.len() as u64,
                fruits: fruits.to_vec(),
                is_batch_addable: false,
            }],
        };
    }

    let mut groups: Vec<FruitGroup> = Vec::new();
    let mut index_by_label: HashMap<&str, usize> = HashMap::new();

    for fruit in fruits {
        let label = key.label_of(fruit).unwrap_or_default();
        let index = *index_by_label.entry(label).or_insert_with(|| {
            groups.push(FruitGroup {
                label: label.to_string(),
                count: 0,
                fruits: Vec::new(),
                is_batch_addable: true,
            });
            groups.len() - 1
        });
        let group = &mut groups[index];
        group.fruits.push(fruit.clone());
        group.count += 1;
    }

    GroupedView { key, groups }
}

/// Count, total and share of the overall total for every group of `key`
pub fn group_stats(fruits: &[Fruit], key: GroupKey, nutrient: NutrientKind) -> Vec<GroupStat> {
    let overall = positive_total(fruits, nutrient);

    group(fruits, key)
        .groups
        .into_iter()
        .map(|g| {
            let total = positive_total(&g.fruits, nutrient);
            GroupStat {
                label: g.label,
                count: g.count,
                total,
                share: share_of(total, overall),
            }
        })
        .collect()
}

/// Request an add for every fruit in order.
///
/// `StopAtOverflow` halts at the first fruit that needs confirmation: it
/// becomes the jar's pending selection and the rest come back as deferred.
/// `EvictSilently` confirms each overflow on the caller's behalf.
pub fn add_all_to_jar(
    jar: JarState,
    fruits: Vec<Fruit>,
    policy: BatchPolicy,
) -> (JarState, BatchAddOutcome) {
    let mut jar = jar;
    let mut outcome = BatchAddOutcome::default();
    let mut remaining = fruits.into_iter();

    while let Some(fruit) = remaining.next() {
        let (next, add) = jar.request_add(fruit);
        jar = next;

        match add {
            AddOutcome::Added { fruit } => outcome.added.push(fruit),
            AddOutcome::ConfirmationRequired { pending } => match policy {
                BatchPolicy::StopAtOverflow => {
                    outcome.pending = Some(pending);
                    outcome.deferred = remaining.by_ref().collect();
                    break;
                }
                BatchPolicy::EvictSilently => {
                    let (next, confirm) = jar.confirm_pending_add();
                    jar = next;
                    match confirm {
                        ConfirmOutcome::Displaced { evicted, added } => {
                            outcome.evicted.push(evicted);
                            outcome.added.push(added);
                        }
                        ConfirmOutcome::Added { fruit } => outcome.added.push(fruit),
                        ConfirmOutcome::NothingPending => {}
                    }
                }
            },
        }
    }

    debug!(
        added = outcome.added.len(),
        evicted = outcome.evicted.len(),
        deferred = outcome.deferred.len(),
        pending = outcome.pending.is_some(),
        "batch add finished"
    );
    (jar, outcome)
}
