//! Catalog records as they arrive from the data source
//!
//! `CatalogRecord` mirrors the JSON shape and tolerates missing or wrongly typed fields.
//! Conversion to the FFI `Fruit` only checks that an id and a name are present.

use serde::Deserialize;
use serde_json::Value;

use crate::aggregate::finite_or_zero;
use crate::interface::{Fruit, NutrientKind, Nutritions};

/// Raw catalog entry (not exposed via FFI).
///
/// Every field is kept as raw JSON so a wrongly typed attribute degrades to
/// an empty label or a zero value instead of rejecting the whole record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CatalogRecord {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub family: Option<Value>,
    #[serde(default)]
    pub order: Option<Value>,
    #[serde(default)]
    pub genus: Option<Value>,
    #[serde(default)]
    pub nutritions: Option<Value>,
}

/// Text of a string attribute; anything else reads as empty
fn label(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

impl CatalogRecord {
    /// Numeric id, accepting numbers and numeric strings
    fn parsed_id(&self) -> Option<i64> {
        match self.id.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn parsed_name(&self) -> Option<&str> {
        match self.name.as_ref()? {
            Value::String(s) => Some(s.trim()).filter(|n| !n.is_empty()),
            _ => None,
        }
    }

    /// Finite nutrient value; missing, non-numeric and non-finite values read as 0
    fn nutrient(&self, kind: NutrientKind) -> f64 {
        let Some(Value::Object(nutritions)) = &self.nutritions else {
            return 0.0;
        };
        let value = match nutritions.get(kind.as_str()) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        };
        finite_or_zero(value)
    }

    /// Convert to a `Fruit`, or None when the id or the name is missing
    pub fn to_fruit(&self) -> Option<Fruit> {
        let id = self.parsed_id()?;
        let name = self.parsed_name()?;

        Some(Fruit {
            id,
            name: name.to_string(),
            family: label(&self.family),
            order: label(&self.order),
            genus: label(&self.genus),
            nutritions: Nutritions {
                calories: self.nutrient(NutrientKind::Calories),
                fat: self.nutrient(NutrientKind::Fat),
                sugar: self.nutrient(NutrientKind::Sugar),
                carbohydrates: self.nutrient(NutrientKind::Carbohydrates),
                protein: self.nutrient(NutrientKind::Protein),
            },
        })
    }
}
