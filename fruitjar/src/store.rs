//! FruitJarStore - Main API for native UI interop, designed for UniFFI export.
//!
//! The store owns the loaded catalog and the jar. Every jar command takes the
//! lock, runs one pure transition from `jar`/`grouping` and stores the result,
//! so commands never interleave.
//!
//! Async Cancellation Architecture:
//! When the UI cancels a catalog load, UniFFI drops the Rust Future. A DropGuard
//! triggers a CancellationToken and the spawned fetch stops at its next await.

use std::path::PathBuf;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::aggregate::{aggregate, positive_total};
use crate::catalog::{self, CatalogError, CatalogSource, FileCatalogSource, HttpCatalogSource};
use crate::demo_data;
use crate::grouping::{add_all_to_jar, group, group_stats};
use crate::interface::{
    AddOutcome, Aggregate, BatchAddOutcome, ConfirmOutcome, Fruit, FruitJarApi, FruitJarError,
    GroupKey, GroupStat, GroupedView, JarConfig, JarSnapshot, NutrientKind,
};
use crate::jar::JarState;

/// Global fallback Tokio runtime for when async functions are called outside any runtime context.
/// Shared across all stores and never dropped. UniFFI callers don't provide a tokio runtime.
static FALLBACK_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("fruitjar-io")
        .enable_all()
        .build()
        .expect("Failed to create fallback tokio runtime")
});

/// RAII guard that cancels a token when dropped.
struct DropGuard {
    token: CancellationToken,
}

impl DropGuard {
    fn new(token: CancellationToken) -> Self {
        Self { token }
    }
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Thread-safe catalog + jar store
#[derive(uniffi::Object)]
pub struct FruitJarStore {
    config: JarConfig,
    catalog: RwLock<Vec<Fruit>>,
    jar: Mutex<JarState>,
}

// Internal implementation (not exported via FFI)
impl FruitJarStore {
    fn validate(config: &JarConfig) -> Result<(), FruitJarError> {
        if config.capacity == 0 {
            return Err(FruitJarError::InvalidInput("jar capacity must be at least 1".into()));
        }
        if !config.label_threshold_percent.is_finite() || config.label_threshold_percent < 0.0 {
            return Err(FruitJarError::InvalidInput(format!(
                "label threshold must be a non-negative percentage, got {}",
                config.label_threshold_percent
            )));
        }
        Ok(())
    }

    /// Get a tokio runtime handle - uses current runtime if available, otherwise global fallback
    fn runtime_handle(&self) -> tokio::runtime::Handle {
        tokio::runtime::Handle::try_current()
            .unwrap_or_else(|_| FALLBACK_RUNTIME.handle().clone())
    }

    /// Run one jar transition under the lock.
    /// The lock holds an empty jar of the configured capacity while `f` runs.
    fn transition<T>(&self, f: impl FnOnce(JarState) -> (JarState, T)) -> T {
        let mut jar = self.jar.lock();
        let placeholder = JarState::with_capacity(self.config.capacity as usize);
        let (next, outcome) = f(std::mem::replace(&mut *jar, placeholder));
        *jar = next;
        outcome
    }

    fn jar_fruits(&self) -> Vec<Fruit> {
        self.jar.lock().to_vec()
    }

    /// Install a load result. Any failure leaves an empty catalog.
    fn apply_catalog(
        &self,
        result: Result<Vec<Fruit>, CatalogError>,
        description: &str,
    ) -> Result<u64, FruitJarError> {
        match result {
            Ok(fruits) => {
                let count = fruits.len() as u64;
                *self.catalog.write() = fruits;
                info!(source = %description, count, "catalog loaded");
                Ok(count)
            }
            Err(e) => {
                self.catalog.write().clear();
                warn!(source = %description, error = %e, "catalog unavailable");
                Err(e.into())
            }
        }
    }

    async fn load_from(&self, source: Arc<dyn CatalogSource>) -> Result<u64, FruitJarError> {
        let token = CancellationToken::new();
        let _guard = DropGuard::new(token.clone());

        let description = source.describe();
        let token_clone = token.clone();

        // Spawned on our runtime: reqwest and tokio::fs need a tokio context,
        // which UniFFI doesn't provide
        let handle = self.runtime_handle().spawn(async move {
            tokio::select! {
                _ = token_clone.cancelled() => Err(CatalogError::Cancelled),
                result = catalog::load(source.as_ref()) => result,
            }
        });

        let result = match handle.await {
            Ok(result) => result,
            Err(_join_error) => Err(CatalogError::Cancelled),
        };
        self.apply_catalog(result, &description)
    }
}

// FFI-exported constructors (must be in standalone impl block)
#[uniffi::export]
impl FruitJarStore {
    /// Create a store with an empty catalog and an empty jar
    #[uniffi::constructor]
    pub fn new(config: JarConfig) -> Result<Self, FruitJarError> {
        Self::validate(&config)?;
        let jar = JarState::with_capacity(config.capacity as usize);
        Ok(Self {
            config,
            catalog: RwLock::new(Vec::new()),
            jar: Mutex::new(jar),
        })
    }

    /// Store with default capacity, label threshold and batch policy
    #[uniffi::constructor]
    pub fn with_defaults() -> Self {
        let config = JarConfig::default();
        Self {
            jar: Mutex::new(JarState::with_capacity(config.capacity as usize)),
            catalog: RwLock::new(Vec::new()),
            config,
        }
    }

    pub fn config(&self) -> JarConfig {
        self.config.clone()
    }
}

#[uniffi::export]
#[async_trait::async_trait]
impl FruitJarApi for FruitJarStore {
    // ─────────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────────

    async fn load_catalog_from_url(&self, url: String) -> Result<u64, FruitJarError> {
        self.load_from(Arc::new(HttpCatalogSource::new(url))).await
    }

    async fn load_catalog_from_path(&self, path: String) -> Result<u64, FruitJarError> {
        self.load_from(Arc::new(FileCatalogSource::new(PathBuf::from(path)))).await
    }

    fn load_demo_catalog(&self) -> Result<u64, FruitJarError> {
        self.apply_catalog(Ok(demo_data::demo_fruits()), "demo catalog")
    }

    fn catalog(&self) -> Vec<Fruit> {
        self.catalog.read().clone()
    }

    fn fruit_by_id(&self, id: i64) -> Option<Fruit> {
        self.catalog.read().iter().find(|f| f.id == id).cloned()
    }

    fn group_catalog(&self, key: GroupKey) -> GroupedView {
        group(&self.catalog.read(), key)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Jar commands
    // ─────────────────────────────────────────────────────────────────────────────

    fn request_add(&self, fruit: Fruit) -> AddOutcome {
        self.transition(|jar| jar.request_add(fruit))
    }

    fn confirm_pending_add(&self) -> ConfirmOutcome {
        self.transition(JarState::confirm_pending_add)
    }

    fn cancel_pending_add(&self) -> Option<Fruit> {
        self.transition(JarState::cancel_pending_add)
    }

    fn add_all(&self, fruits: Vec<Fruit>) -> BatchAddOutcome {
        let policy = self.config.batch_policy;
        self.transition(|jar| add_all_to_jar(jar, fruits, policy))
    }

    fn clear_jar(&self) {
        self.transition(|jar| (jar.cleared(), ()));
        info!("jar cleared");
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Jar views
    // ─────────────────────────────────────────────────────────────────────────────

    fn jar_snapshot(&self) -> JarSnapshot {
        let jar = self.jar.lock();
        let fruits = jar.to_vec();
        let len = fruits.len() as u64;
        let capacity = jar.capacity() as u64;
        JarSnapshot {
            total_calories: positive_total(&fruits, NutrientKind::Calories),
            summary: format!("{len}/{capacity} fruits"),
            pending: jar.pending().cloned(),
            fruits,
            capacity,
            len,
        }
    }

    fn group_jar(&self, key: GroupKey) -> GroupedView {
        group(&self.jar_fruits(), key)
    }

    fn jar_aggregate(&self, nutrient: NutrientKind) -> Aggregate {
        aggregate(&self.jar_fruits(), nutrient, self.config.label_threshold_percent)
    }

    fn jar_group_stats(&self, key: GroupKey, nutrient: NutrientKind) -> Vec<GroupStat> {
        group_stats(&self.jar_fruits(), key, nutrient)
    }
}
