//! FruitJar Core - Rust business logic for the fruit jar app
//!
//! This library implements the core of the fruit jar: a bounded jar with a
//! confirm-to-displace overflow policy, and a grouping/aggregation engine that
//! classifies fruits by taxonomy and computes nutrient shares for the chart.
//!
//! # Architecture
//! - `interface`: FFI-visible types and the `FruitJarApi` service trait
//! - `jar`: the jar state machine (pure transitions)
//! - `grouping` / `aggregate`: grouped views, group stats and shares
//! - `catalog` / `models`: catalog sources and record parsing
//! - `store`: Main API for native UI interop via UniFFI
//!
//! Types are exported via UniFFI proc-macros (#[derive(uniffi::Record/Enum)]).

pub mod aggregate;
pub mod catalog;
pub mod demo_data;
pub mod grouping;
pub mod interface;
pub mod jar;
pub mod models;
mod store;

pub use interface::*;
pub use jar::{JarState, DEFAULT_JAR_CAPACITY};
pub use store::FruitJarStore;

/// Group any list of fruits (catalog or jar) by `key`
#[uniffi::export]
pub fn group_fruits(fruits: Vec<Fruit>, key: GroupKey) -> GroupedView {
    grouping::group(&fruits, key)
}

/// Shares of `nutrient` using the default label threshold
#[uniffi::export]
pub fn aggregate_fruits(fruits: Vec<Fruit>, nutrient: NutrientKind) -> Aggregate {
    aggregate::aggregate(&fruits, nutrient, DEFAULT_LABEL_THRESHOLD_PERCENT)
}

/// Grouping options in selector order
#[uniffi::export]
pub fn group_key_options() -> Vec<GroupKey> {
    GroupKey::ALL.to_vec()
}

uniffi::setup_scaffolding!("fruitjar");
