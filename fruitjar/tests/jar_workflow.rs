//! End-to-end jar workflows through the public API

use fruitjar::grouping::add_all_to_jar;
use fruitjar::{
    aggregate_fruits, group_fruits, group_key_options, AddOutcome, BatchPolicy, ConfirmOutcome,
    Fruit, FruitJarApi, FruitJarStore, GroupKey, JarConfig, JarState, NutrientKind, Nutritions,
};

fn fruit(id: i64, name: &str, family: &str, calories: f64) -> Fruit {
    Fruit {
        id,
        name: name.to_string(),
        family: family.to_string(),
        order: "Rosales".to_string(),
        genus: String::new(),
        nutritions: Nutritions {
            calories,
            ..Nutritions::default()
        },
    }
}

fn names(fruits: &[Fruit]) -> Vec<&str> {
    fruits.iter().map(|f| f.name.as_str()).collect()
}

#[test]
fn test_capacity_two_example() {
    let store = FruitJarStore::new(JarConfig {
        capacity: 2,
        ..JarConfig::default()
    })
    .unwrap();
    let a = fruit(1, "A", "X", 1.0);
    let b = fruit(2, "B", "X", 1.0);
    let c = fruit(3, "C", "X", 1.0);

    assert!(matches!(store.request_add(a), AddOutcome::Added { .. }));
    assert!(matches!(store.request_add(b), AddOutcome::Added { .. }));
    let snapshot = store.jar_snapshot();
    assert_eq!(names(&snapshot.fruits), vec!["A", "B"]);
    assert!(snapshot.pending.is_none());

    assert_eq!(
        store.request_add(c.clone()),
        AddOutcome::ConfirmationRequired { pending: c.clone() }
    );
    let snapshot = store.jar_snapshot();
    assert_eq!(names(&snapshot.fruits), vec!["A", "B"]);
    assert_eq!(snapshot.pending, Some(c));

    assert!(matches!(store.confirm_pending_add(), ConfirmOutcome::Displaced { .. }));
    assert_eq!(names(&store.jar_snapshot().fruits), vec!["B", "C"]);
}

#[test]
fn test_calorie_shares_example() {
    let fruits = vec![
        fruit(1, "ten", "X", 10.0),
        fruit(2, "thirty", "X", 30.0),
        fruit(3, "sixty", "X", 60.0),
    ];
    let aggregate = aggregate_fruits(fruits, NutrientKind::Calories);

    let values: Vec<f64> = aggregate.entries.iter().map(|e| e.value).collect();
    assert_eq!(values, vec![60.0, 30.0, 10.0]);
    let labels: Vec<Option<&str>> = aggregate
        .entries
        .iter()
        .map(|e| e.share_label.as_deref())
        .collect();
    assert_eq!(labels, vec![Some("60.0%"), Some("30.0%"), Some("10.0%")]);
}

#[test]
fn test_jar_never_exceeds_capacity_under_mixed_commands() {
    let store = FruitJarStore::new(JarConfig {
        capacity: 5,
        ..JarConfig::default()
    })
    .unwrap();
    store.load_demo_catalog().unwrap();
    let catalog = store.catalog();

    for (i, fruit) in catalog.iter().cycle().take(60).enumerate() {
        store.request_add(fruit.clone());
        match i % 4 {
            0 => {
                store.confirm_pending_add();
            }
            1 => {
                store.cancel_pending_add();
            }
            _ => {}
        }
        let snapshot = store.jar_snapshot();
        assert!(snapshot.len <= snapshot.capacity);
        if snapshot.pending.is_some() {
            assert_eq!(snapshot.len, snapshot.capacity);
        }
    }
}

#[test]
fn test_group_then_add_all() {
    let store = FruitJarStore::with_defaults();
    store.load_demo_catalog().unwrap();

    let view = store.group_catalog(GroupKey::Family);
    let total: u64 = view.groups.iter().map(|g| g.count).sum();
    assert_eq!(total as usize, store.catalog().len());

    let rosaceae = view
        .groups
        .into_iter()
        .find(|g| g.label == "Rosaceae")
        .unwrap();
    let outcome = store.add_all(rosaceae.fruits.clone());

    assert_eq!(outcome.added.len(), rosaceae.fruits.len());
    assert!(outcome.pending.is_none());

    let jar_view = store.group_jar(GroupKey::Family);
    assert_eq!(jar_view.groups.len(), 1);
    assert_eq!(jar_view.groups[0].fruits, rosaceae.fruits);
}

#[test]
fn test_batch_policies_differ_only_on_overflow() {
    let batch: Vec<Fruit> = (1..=5).map(|i| fruit(i, &format!("f{i}"), "X", 1.0)).collect();

    let (stopped, outcome) = add_all_to_jar(JarState::with_capacity(3), batch.clone(), BatchPolicy::StopAtOverflow);
    assert_eq!(names(&stopped.to_vec()), vec!["f1", "f2", "f3"]);
    assert_eq!(outcome.pending.map(|f| f.name), Some("f4".to_string()));
    assert_eq!(names(&outcome.deferred), vec!["f5"]);

    let (evicted, outcome) = add_all_to_jar(JarState::with_capacity(3), batch, BatchPolicy::EvictSilently);
    assert_eq!(names(&evicted.to_vec()), vec!["f3", "f4", "f5"]);
    assert_eq!(names(&outcome.evicted), vec!["f1", "f2"]);
}

#[test]
fn test_empty_catalog_still_operable() {
    let store = FruitJarStore::with_defaults();

    assert!(store.catalog().is_empty());
    assert!(store.group_catalog(GroupKey::Genus).groups.is_empty());
    assert_eq!(store.group_catalog(GroupKey::Ungrouped).groups[0].count, 0);
    assert!(store.jar_aggregate(NutrientKind::Calories).entries.is_empty());
    assert_eq!(store.confirm_pending_add(), ConfirmOutcome::NothingPending);
    assert_eq!(store.jar_snapshot().len, 0);
}

#[test]
fn test_free_functions() {
    assert_eq!(
        group_key_options(),
        vec![GroupKey::Ungrouped, GroupKey::Family, GroupKey::Order, GroupKey::Genus]
    );

    let fruits = vec![
        fruit(1, "a", "P", 1.0),
        fruit(2, "b", "Q", 1.0),
        fruit(3, "c", "P", 1.0),
    ];
    let view = group_fruits(fruits, GroupKey::Family);
    let labels: Vec<&str> = view.groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["P", "Q"]);
}

#[tokio::test]
async fn test_unreachable_url_leaves_empty_catalog() {
    let store = FruitJarStore::with_defaults();
    store.load_demo_catalog().unwrap();

    // Port 9 (discard) on localhost is closed in test environments
    let result = store
        .load_catalog_from_url("http://127.0.0.1:9/fruits.json".to_string())
        .await;

    assert!(result.is_err());
    assert!(store.catalog().is_empty());
}
