//! Catalog sources - where the fruit list comes from
//!
//! A source only produces the raw JSON text; `parse_catalog` turns it into
//! fruits. Failures are reported once and never retried here.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::interface::Fruit;
use crate::models::CatalogRecord;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_CATALOG_SIZE: usize = 4 * 1024 * 1024; // 4MB max JSON

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Catalog exceeds the 4MB size limit")]
    TooLarge,
    #[error("Load cancelled")]
    Cancelled,
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Anything that can hand over the catalog JSON
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self) -> CatalogResult<String>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Catalog served over HTTP(S)
pub struct HttpCatalogSource {
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait::async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> CatalogResult<String> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()?;

        let response = client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        if body.len() > MAX_CATALOG_SIZE {
            return Err(CatalogError::TooLarge);
        }
        Ok(body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Catalog JSON file on disk
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl CatalogSource for FileCatalogSource {
    async fn fetch(&self) -> CatalogResult<String> {
        let metadata = tokio::fs::metadata(&self.path).await?;
        if metadata.len() > MAX_CATALOG_SIZE as u64 {
            return Err(CatalogError::TooLarge);
        }
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory catalog text (bundled data, tests)
pub struct StaticCatalogSource {
    json: String,
}

impl StaticCatalogSource {
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

#[async_trait::async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch(&self) -> CatalogResult<String> {
        Ok(self.json.clone())
    }

    fn describe(&self) -> String {
        "static catalog".to_string()
    }
}

/// Parse a JSON array of catalog records.
///
/// The array itself must be well formed. Entries that are not objects or
/// lack an id or a name are skipped.
pub fn parse_catalog(json: &str) -> CatalogResult<Vec<Fruit>> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let total = entries.len();

    let fruits: Vec<Fruit> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            if !entry.is_object() {
                warn!(index, "skipping catalog entry that is not an object");
                return None;
            }
            let record = match serde_json::from_value::<CatalogRecord>(entry) {
                Ok(record) => record,
                Err(e) => {
                    warn!(index, error = %e, "skipping unreadable catalog entry");
                    return None;
                }
            };
            let fruit = record.to_fruit();
            if fruit.is_none() {
                warn!(index, "skipping catalog entry without id or name");
            }
            fruit
        })
        .collect();

    debug!(parsed = fruits.len(), total, "catalog parsed");
    Ok(fruits)
}

/// Fetch and parse in one go
pub async fn load(source: &dyn CatalogSource) -> CatalogResult<Vec<Fruit>> {
    let json = source.fetch().await?;
    parse_catalog(&json)
}
