//! Category totals for one side of a cashbook

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::*;

/// Key the overall total is stored under in [`CategoryTotals::to_flat_map`]
pub const TOTAL_KEY: &str = "Amount";

/// Per-category sums plus the overall sum of a set of transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    /// Sum of every amount, including rows outside the category set
    pub total: BigDecimal,
    /// One bucket per requested category
    pub by_category: BTreeMap<String, BigDecimal>,
}

impl CategoryTotals {
    /// Bucket for a category, if it was requested
    pub fn category(&self, name: &str) -> Option<&BigDecimal> {
        self.by_category.get(name)
    }

    /// Sum of the per-category buckets.
    /// Never exceeds `total` for non-negative amounts.
    pub fn categorized_total(&self) -> BigDecimal {
        self.by_category.values().sum()
    }

    /// Flat map keyed by category name with the overall total under `"Amount"`
    pub fn to_flat_map(&self) -> BTreeMap<String, BigDecimal> {
        let mut map = self.by_category.clone();
        map.insert(TOTAL_KEY.to_string(), self.total.clone());
        map
    }
}

/// Sum `items` overall and per category.
///
/// Items whose category is missing or not in `categories` only count towards
/// the overall total. A missing amount counts as zero.
pub fn category_totals_by<T, C, A>(
    items: &[T],
    categories: &BTreeSet<String>,
    category_of: C,
    amount_of: A,
) -> CategoryTotals
where
    C: Fn(&T) -> Option<&str>,
    A: Fn(&T) -> Option<&BigDecimal>,
{
    let zero = BigDecimal::from(0);
    let mut by_category: BTreeMap<String, BigDecimal> = categories
        .iter()
        .map(|c| (c.clone(), zero.clone()))
        .collect();
    let mut total = zero.clone();

    for item in items {
        let amount = amount_of(item).unwrap_or(&zero);
        total += amount;
        if let Some(bucket) = category_of(item).and_then(|c| by_category.get_mut(c)) {
            *bucket += amount;
        }
    }

    CategoryTotals { total, by_category }
}

/// [`category_totals_by`] over ledger transactions
pub fn category_totals(
    transactions: &[Transaction],
    categories: &BTreeSet<String>,
) -> CategoryTotals {
    category_totals_by(
        transactions,
        categories,
        |t| t.category.as_deref(),
        |t| t.amount.as_ref(),
    )
}

/// Distinct categories present in `transactions`
pub fn distinct_categories(transactions: &[Transaction]) -> BTreeSet<String> {
    transactions
        .iter()
        .filter_map(|t| t.category.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn txn(category: Option<&str>, amount: Option<i64>) -> Transaction {
        let mut t = Transaction::new(
            uuid::Uuid::new_v4().to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            BigDecimal::from(0),
            Direction::Incoming,
            Currency::Usd,
            category.map(str::to_string),
        );
        t.amount = amount.map(BigDecimal::from);
        t
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_totals_by_category() {
        let rows = vec![txn(Some("fees"), Some(100)), txn(Some("donations"), Some(50))];
        let totals = category_totals(&rows, &set(&["fees", "donations"]));

        assert_eq!(totals.total, BigDecimal::from(150));
        assert_eq!(totals.category("fees"), Some(&BigDecimal::from(100)));
        assert_eq!(totals.category("donations"), Some(&BigDecimal::from(50)));

        let flat = totals.to_flat_map();
        assert_eq!(flat[TOTAL_KEY], BigDecimal::from(150));
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn test_empty_input_gives_zero_buckets() {
        let totals = category_totals(&[], &set(&["fees", "food"]));
        assert_eq!(totals.total, BigDecimal::from(0));
        assert!(totals.by_category.values().all(|v| *v == BigDecimal::from(0)));
        assert_eq!(totals.by_category.len(), 2);
    }

    #[test]
    fn test_unknown_and_missing_categories_only_hit_total() {
        let rows = vec![
            txn(Some("fees"), Some(100)),
            txn(Some("utilities"), Some(30)),
            txn(None, Some(20)),
        ];
        let totals = category_totals(&rows, &set(&["fees"]));

        assert_eq!(totals.total, BigDecimal::from(150));
        assert_eq!(totals.categorized_total(), BigDecimal::from(100));
        assert!(totals.category("utilities").is_none());
    }

    #[test]
    fn test_missing_amount_counts_as_zero() {
        let rows = vec![txn(Some("fees"), None), txn(Some("fees"), Some(40))];
        let totals = category_totals(&rows, &set(&["fees"]));
        assert_eq!(totals.total, BigDecimal::from(40));
        assert_eq!(totals.category("fees"), Some(&BigDecimal::from(40)));
    }

    #[test]
    fn test_categorized_total_matches_total_when_all_known() {
        let rows = vec![
            txn(Some("fees"), Some(7)),
            txn(Some("food"), Some(11)),
            txn(Some("fees"), Some(13)),
        ];
        let categories = distinct_categories(&rows);
        let totals = category_totals(&rows, &categories);
        assert_eq!(totals.categorized_total(), totals.total);
    }

    #[test]
    fn test_generic_accessors() {
        struct Row {
            label: &'static str,
            value: BigDecimal,
        }
        let rows = vec![
            Row { label: "a", value: BigDecimal::from(1) },
            Row { label: "b", value: BigDecimal::from(2) },
        ];
        let totals = category_totals_by(&rows, &set(&["a"]), |r| Some(r.label), |r| Some(&r.value));
        assert_eq!(totals.total, BigDecimal::from(3));
        assert_eq!(totals.category("a"), Some(&BigDecimal::from(1)));
    }
}
