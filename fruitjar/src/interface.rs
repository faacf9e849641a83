//! FruitJar FFI Interface Definition
//!
//! This file defines the public interface exposed to the native UI via UniFFI.
//! It acts as the source of truth for shared types.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::jar::DEFAULT_JAR_CAPACITY;

/// Shares below this percentage get no on-chart label
pub const DEFAULT_LABEL_THRESHOLD_PERCENT: f64 = 5.0;

/// Label of the single group produced when grouping is off
pub const UNGROUPED_LABEL: &str = "All";

// ═══════════════════════════════════════════════════════════════════════════════
// ENUMS
// ═══════════════════════════════════════════════════════════════════════════════

/// Taxonomic axis used to partition fruits for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, uniffi::Enum)]
pub enum GroupKey {
    /// No grouping: everything lands in the "All" group
    #[default]
    Ungrouped,
    Family,
    Order,
    Genus,
}

impl GroupKey {
    /// Options in selector order
    pub const ALL: [GroupKey; 4] = [
        GroupKey::Ungrouped,
        GroupKey::Family,
        GroupKey::Order,
        GroupKey::Genus,
    ];

    /// Resolve the group label of a fruit, or None when ungrouped
    pub fn label_of<'a>(&self, fruit: &'a Fruit) -> Option<&'a str> {
        match self {
            GroupKey::Ungrouped => None,
            GroupKey::Family => Some(&fruit.family),
            GroupKey::Order => Some(&fruit.order),
            GroupKey::Genus => Some(&fruit.genus),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKey::Ungrouped => "None",
            GroupKey::Family => "Family",
            GroupKey::Order => "Order",
            GroupKey::Genus => "Genus",
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupKey {
    type Err = FruitJarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FruitJarError::InvalidInput(format!("unknown group key: {s}")))
    }
}

/// Numeric nutrition attribute used for aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, uniffi::Enum)]
pub enum NutrientKind {
    #[default]
    Calories,
    Fat,
    Sugar,
    Carbohydrates,
    Protein,
}

impl NutrientKind {
    pub const ALL: [NutrientKind; 5] = [
        NutrientKind::Calories,
        NutrientKind::Fat,
        NutrientKind::Sugar,
        NutrientKind::Carbohydrates,
        NutrientKind::Protein,
    ];

    pub fn value_of(&self, nutritions: &Nutritions) -> f64 {
        match self {
            NutrientKind::Calories => nutritions.calories,
            NutrientKind::Fat => nutritions.fat,
            NutrientKind::Sugar => nutritions.sugar,
            NutrientKind::Carbohydrates => nutritions.carbohydrates,
            NutrientKind::Protein => nutritions.protein,
        }
    }

    /// Field name in the catalog JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            NutrientKind::Calories => "calories",
            NutrientKind::Fat => "fat",
            NutrientKind::Sugar => "sugar",
            NutrientKind::Carbohydrates => "carbohydrates",
            NutrientKind::Protein => "protein",
        }
    }
}

impl fmt::Display for NutrientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NutrientKind {
    type Err = FruitJarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NutrientKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FruitJarError::InvalidInput(format!("unknown nutrient: {s}")))
    }
}

/// How a batch add behaves once the jar fills up mid-batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, uniffi::Enum)]
pub enum BatchPolicy {
    /// Stop at the first overflowing fruit, make it the pending selection
    /// and hand the remainder back as deferred
    #[default]
    StopAtOverflow,
    /// Evict the oldest fruit for every overflowing fruit, never prompt
    EvictSilently,
}

/// Result of a single add request
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum AddOutcome {
    Added { fruit: Fruit },
    /// Jar is full; `pending` waits for confirm or cancel
    ConfirmationRequired { pending: Fruit },
}

/// Result of confirming the pending selection
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum ConfirmOutcome {
    NothingPending,
    Added { fruit: Fruit },
    Displaced { evicted: Fruit, added: Fruit },
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS (Structs)
// ═══════════════════════════════════════════════════════════════════════════════

/// Nutrition values per 100g
#[derive(Debug, Clone, Copy, PartialEq, Default, uniffi::Record)]
pub struct Nutritions {
    pub calories: f64,
    pub fat: f64,
    pub sugar: f64,
    pub carbohydrates: f64,
    pub protein: f64,
}

/// Catalog record. Never mutated by the core.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct Fruit {
    pub id: i64,
    pub name: String,
    pub family: String,
    pub order: String,
    pub genus: String,
    pub nutritions: Nutritions,
}

/// One labelled group of a grouped view
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FruitGroup {
    pub label: String,
    pub count: u64,
    pub fruits: Vec<Fruit>,
    /// False for the implicit "All" group, which gets no "add all" action
    pub is_batch_addable: bool,
}

/// Groups in first-appearance order
#[derive(Debug, Clone, PartialEq, Default, uniffi::Record)]
pub struct GroupedView {
    pub key: GroupKey,
    pub groups: Vec<FruitGroup>,
}

/// A fruit's contribution to an aggregate
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct ShareEntry {
    pub fruit: Fruit,
    pub value: f64,
    /// Percentage of the total; None when the value or the total is not positive
    pub share: Option<f64>,
    pub show_label: bool,
    /// e.g. "12.5%", only when `show_label`
    pub share_label: Option<String>,
}

/// Proportional breakdown of one nutrient, sorted by value descending
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct Aggregate {
    pub nutrient: NutrientKind,
    pub total: f64,
    pub entries: Vec<ShareEntry>,
}

/// Per-group totals of one nutrient
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct GroupStat {
    pub label: String,
    pub count: u64,
    pub total: f64,
    pub share: Option<f64>,
}

/// Outcome of adding a whole group at once
#[derive(Debug, Clone, PartialEq, Default, uniffi::Record)]
pub struct BatchAddOutcome {
    pub added: Vec<Fruit>,
    pub evicted: Vec<Fruit>,
    pub pending: Option<Fruit>,
    /// Fruits not applied because the batch stopped at an overflow
    pub deferred: Vec<Fruit>,
}

/// Read-only view of the jar for rendering
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct JarSnapshot {
    pub fruits: Vec<Fruit>,
    pub capacity: u64,
    pub len: u64,
    pub pending: Option<Fruit>,
    pub total_calories: f64,
    /// e.g. "3/15 fruits"
    pub summary: String,
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct JarConfig {
    pub capacity: u64,
    pub label_threshold_percent: f64,
    pub batch_policy: BatchPolicy,
}

impl Default for JarConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_JAR_CAPACITY as u64,
            label_threshold_percent: DEFAULT_LABEL_THRESHOLD_PERCENT,
            batch_policy: BatchPolicy::default(),
        }
    }
}

/// Error type for FruitJar operations
#[derive(Debug, Error, uniffi::Error)]
pub enum FruitJarError {
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Operation cancelled")]
    Cancelled,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SERVICE INTERFACE
// ═══════════════════════════════════════════════════════════════════════════════

/// The primary interface the UI uses to drive the catalog and the jar.
/// This matches the functionality exposed by the `FruitJarStore` object.
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait FruitJarApi: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────────

    /// Replace the catalog with the one served at `url`. Returns the fruit count.
    /// On failure the catalog becomes empty.
    async fn load_catalog_from_url(&self, url: String) -> Result<u64, FruitJarError>;

    /// Replace the catalog with a JSON file on disk
    async fn load_catalog_from_path(&self, path: String) -> Result<u64, FruitJarError>;

    /// Replace the catalog with the bundled demo catalog
    fn load_demo_catalog(&self) -> Result<u64, FruitJarError>;

    fn catalog(&self) -> Vec<Fruit>;

    fn fruit_by_id(&self, id: i64) -> Option<Fruit>;

    fn group_catalog(&self, key: GroupKey) -> GroupedView;

    // ─────────────────────────────────────────────────────────────────────────────
    // Jar commands
    // ─────────────────────────────────────────────────────────────────────────────

    /// Add a fruit, or park it as pending when the jar is full
    fn request_add(&self, fruit: Fruit) -> AddOutcome;

    /// Evict the oldest fruit and add the pending one
    fn confirm_pending_add(&self) -> ConfirmOutcome;

    /// Drop the pending selection. Returns what was pending.
    fn cancel_pending_add(&self) -> Option<Fruit>;

    /// Add every fruit in order under the configured batch policy
    fn add_all(&self, fruits: Vec<Fruit>) -> BatchAddOutcome;

    fn clear_jar(&self);

    // ─────────────────────────────────────────────────────────────────────────────
    // Jar views
    // ─────────────────────────────────────────────────────────────────────────────

    fn jar_snapshot(&self) -> JarSnapshot;

    fn group_jar(&self, key: GroupKey) -> GroupedView;

    fn jar_aggregate(&self, nutrient: NutrientKind) -> Aggregate;

    fn jar_group_stats(&self, key: GroupKey, nutrient: NutrientKind) -> Vec<GroupStat>;
}

impl From<crate::catalog::CatalogError> for FruitJarError {
    fn from(e: crate::catalog::CatalogError) -> Self {
        match e {
            crate::catalog::CatalogError::Cancelled => FruitJarError::Cancelled,
            other => FruitJarError::CatalogUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key_parsing() {
        assert_eq!("None".parse::<GroupKey>().unwrap(), GroupKey::Ungrouped);
        assert_eq!("family".parse::<GroupKey>().unwrap(), GroupKey::Family);
        assert_eq!(" Genus ".parse::<GroupKey>().unwrap(), GroupKey::Genus);
        assert!(matches!(
            "Species".parse::<GroupKey>(),
            Err(FruitJarError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_group_key_round_trips_through_display() {
        for key in GroupKey::ALL {
            assert_eq!(key.to_string().parse::<GroupKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_nutrient_accessor() {
        let nutritions = Nutritions {
            calories: 52.0,
            fat: 0.4,
            sugar: 10.3,
            carbohydrates: 11.4,
            protein: 0.3,
        };
        assert_eq!(NutrientKind::Calories.value_of(&nutritions), 52.0);
        assert_eq!(NutrientKind::Sugar.value_of(&nutritions), 10.3);
        assert_eq!("PROTEIN".parse::<NutrientKind>().unwrap(), NutrientKind::Protein);
    }

    #[test]
    fn test_default_config() {
        let config = JarConfig::default();
        assert_eq!(config.capacity, 15);
        assert_eq!(config.label_threshold_percent, 5.0);
        assert_eq!(config.batch_policy, BatchPolicy::StopAtOverflow);
    }
}
