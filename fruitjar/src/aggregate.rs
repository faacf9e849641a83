//! Proportional statistics over a sequence of fruits
//!
//! Only finite, positive values count toward a total. Everything else stays in
//! the output with no share, so an all-zero input never divides by zero.

use crate::interface::{Aggregate, Fruit, NutrientKind, ShareEntry};

/// Non-finite values read as 0
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Whether a value contributes to a total
pub(crate) fn counts_toward_total(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Sum of the contributing values of `nutrient`
pub fn positive_total<'a>(fruits: impl IntoIterator<Item = &'a Fruit>, nutrient: NutrientKind) -> f64 {
    fruits
        .into_iter()
        .map(|fruit| nutrient.value_of(&fruit.nutritions))
        .filter(|value| counts_toward_total(*value))
        .sum()
}

/// Percentage of `total` taken by `value`, if both are positive
pub fn share_of(value: f64, total: f64) -> Option<f64> {
    if counts_toward_total(value) && total > 0.0 {
        Some(value / total * 100.0)
    } else {
        None
    }
}

/// "12.5%"
pub fn format_share(share: f64) -> String {
    format!("{:.1}%", share)
}

/// Per-fruit shares of `nutrient`, highest value first.
/// Ties keep their input order.
pub fn aggregate(fruits: &[Fruit], nutrient: NutrientKind, label_threshold_percent: f64) -> Aggregate {
    let total = positive_total(fruits, nutrient);

    let mut entries: Vec<ShareEntry> = fruits
        .iter()
        .map(|fruit| {
            let value = finite_or_zero(nutrient.value_of(&fruit.nutritions));
            let share = share_of(value, total);
            let show_label = share.is_some_and(|s| s >= label_threshold_percent);
            ShareEntry {
                fruit: fruit.clone(),
                value,
                share,
                show_label,
                share_label: share.filter(|_| show_label).map(format_share),
            }
        })
        .collect();

    // sort_by is stable
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));

    Aggregate {
        nutrient,
        total,
        entries,
    }
}
