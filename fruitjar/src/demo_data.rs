//! Bundled demo catalog, shared by the store, the terminal front end and tests.

use once_cell::sync::Lazy;

use crate::catalog::parse_catalog;
use crate::interface::Fruit;

pub const DEMO_CATALOG_JSON: &str = include_str!("../data/fruits.json");

/// Parsed once. The bundled file is known-good; a parse failure yields an empty list.
pub static DEMO_FRUITS: Lazy<Vec<Fruit>> =
    Lazy::new(|| parse_catalog(DEMO_CATALOG_JSON).unwrap_or_default());

pub fn demo_fruits() -> Vec<Fruit> {
    DEMO_FRUITS.clone()
}
