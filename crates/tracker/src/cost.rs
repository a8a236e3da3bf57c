//! Regimen cost aggregation.
//!
//! Pure functions of the current entry set; nothing here is stored, so the
//! summary must be recomputed whenever the regimen changes.
//!
//! ```text
//! daily   = price / servings_per_container * servings_per_day
//! monthly = sum(daily) * 30.437
//! ```

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;
use stackwise_core::ProductId;

use crate::models::RegimenItem;

/// Average days per month (365.24 / 12).
pub const DAYS_PER_MONTH: Decimal = Decimal::from_parts(30_437, 0, 0, false, 3);

/// Why an entry was left out of the cost total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostFlag {
    /// The product has no servings-per-container value.
    MissingServingsPerContainer,
    /// The product reports zero (or fewer) servings per container.
    ZeroServingsPerContainer,
    /// The cost does not fit in a `Decimal`.
    Overflow,
}

/// Cost of a single entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostLine {
    pub product_id: ProductId,
    /// `None` when the entry is flagged.
    pub daily_cost: Option<Decimal>,
    /// `None` when the entry is flagged.
    pub monthly_cost: Option<Decimal>,
    pub flag: Option<CostFlag>,
}

/// Derived totals for a regimen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostSummary {
    /// Number of distinct supplement categories (not entries).
    pub distinct_supplement_count: usize,
    /// Projected monthly spend over all valid entries, unrounded.
    pub monthly_cost: Decimal,
    /// Per-entry costs, in input order.
    pub lines: Vec<CostLine>,
}

impl CostSummary {
    /// Entries excluded from the total, with the reason.
    pub fn flagged(&self) -> impl Iterator<Item = (ProductId, CostFlag)> + '_ {
        self.lines
            .iter()
            .filter_map(|line| line.flag.map(|flag| (line.product_id, flag)))
    }

    /// Monthly cost rounded to cents for display.
    #[must_use]
    pub fn monthly_cost_display(&self) -> String {
        format!("${:.2}", self.monthly_cost.round_dp(2))
    }
}

/// Cost of one entry per day, or the reason it cannot be computed.
///
/// # Errors
///
/// Returns a [`CostFlag`] when `servings_per_container` is missing or not
/// positive, or when the result overflows.
pub fn daily_cost(item: &RegimenItem) -> Result<Decimal, CostFlag> {
    let per_container = match item.servings_per_container {
        None => return Err(CostFlag::MissingServingsPerContainer),
        Some(n) if n <= 0 => return Err(CostFlag::ZeroServingsPerContainer),
        Some(n) => Decimal::from(n),
    };
    item.price
        .amount()
        .checked_div(per_container)
        .and_then(|per_serving| per_serving.checked_mul(item.servings_per_day.get()))
        .ok_or(CostFlag::Overflow)
}

fn flagged_line(item: &RegimenItem, flag: CostFlag) -> CostLine {
    tracing::warn!(product_id = %item.product_id, ?flag, "Entry excluded from cost");
    CostLine {
        product_id: item.product_id,
        daily_cost: None,
        monthly_cost: None,
        flag: Some(flag),
    }
}

/// Aggregate a regimen into its summary metrics.
#[must_use]
pub fn aggregate(items: &[RegimenItem]) -> CostSummary {
    let distinct_supplement_count = items
        .iter()
        .filter_map(|item| item.supplement_id)
        .collect::<HashSet<_>>()
        .len();

    let mut total_daily = Decimal::ZERO;
    let mut monthly_cost = Decimal::ZERO;
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        let line = match daily_cost(item) {
            Ok(daily) => {
                // The running totals must stay representable too.
                let line_monthly = daily.checked_mul(DAYS_PER_MONTH);
                let next_daily = total_daily.checked_add(daily);
                let next_monthly = next_daily.and_then(|d| d.checked_mul(DAYS_PER_MONTH));
                match (line_monthly, next_daily, next_monthly) {
                    (Some(line_monthly), Some(next_daily), Some(next_monthly)) => {
                        total_daily = next_daily;
                        monthly_cost = next_monthly;
                        CostLine {
                            product_id: item.product_id,
                            daily_cost: Some(daily),
                            monthly_cost: Some(line_monthly),
                            flag: None,
                        }
                    }
                    _ => flagged_line(item, CostFlag::Overflow),
                }
            }
            Err(flag) => flagged_line(item, flag),
        };
        lines.push(line);
    }

    CostSummary {
        distinct_supplement_count,
        monthly_cost,
        lines,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use stackwise_core::{Price, ServingsPerDay, SupplementId};

    use super::*;

    fn item(
        product: i32,
        supplement: Option<i32>,
        price: Decimal,
        per_container: Option<i32>,
        per_day: Decimal,
    ) -> RegimenItem {
        RegimenItem {
            product_id: ProductId::new(product),
            product_name: format!("Product {product}"),
            product_description: String::new(),
            price: Price::new(price).unwrap(),
            servings_per_container: per_container,
            servings_per_day: ServingsPerDay::new(per_day).unwrap(),
            brand_name: String::new(),
            supplement_id: supplement.map(SupplementId::new),
            supplement_name: String::new(),
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_cost_formula() {
        let summary = aggregate(&[item(1, Some(1), Decimal::new(30, 0), Some(60), Decimal::TWO)]);
        assert_eq!(summary.lines[0].daily_cost, Some(Decimal::ONE));
        assert_eq!(summary.monthly_cost, Decimal::new(30_437, 3));
        assert_eq!(summary.monthly_cost_display(), "$30.44");
    }

    #[test]
    fn test_zero_servings_per_container_flagged() {
        let summary = aggregate(&[
            item(1, Some(1), Decimal::new(30, 0), Some(0), Decimal::ONE),
            item(2, Some(2), Decimal::new(30, 0), Some(30), Decimal::ONE),
        ]);
        assert_eq!(summary.monthly_cost, DAYS_PER_MONTH);
        let flagged: Vec<_> = summary.flagged().collect();
        assert_eq!(
            flagged,
            [(ProductId::new(1), CostFlag::ZeroServingsPerContainer)]
        );
        assert_eq!(summary.lines[0].monthly_cost, None);
    }

    #[test]
    fn test_missing_servings_per_container_flagged() {
        let summary = aggregate(&[item(5, Some(1), Decimal::new(10, 0), None, Decimal::ONE)]);
        assert_eq!(summary.monthly_cost, Decimal::ZERO);
        assert_eq!(
            summary.lines[0].flag,
            Some(CostFlag::MissingServingsPerContainer)
        );
        // Flagged entries still count toward distinct supplements.
        assert_eq!(summary.distinct_supplement_count, 1);
    }

    #[test]
    fn test_distinct_supplements_counted_once() {
        let summary = aggregate(&[
            item(1, Some(7), Decimal::new(20, 0), Some(30), Decimal::ONE),
            item(2, Some(7), Decimal::new(25, 0), Some(60), Decimal::ONE),
            item(3, Some(8), Decimal::new(10, 0), Some(90), Decimal::ONE),
            item(4, None, Decimal::new(10, 0), Some(90), Decimal::ONE),
        ]);
        assert_eq!(summary.distinct_supplement_count, 2);
        assert_eq!(summary.lines.len(), 4);
    }

    #[test]
    fn test_empty_regimen() {
        let summary = aggregate(&[]);
        assert_eq!(summary.distinct_supplement_count, 0);
        assert_eq!(summary.monthly_cost, Decimal::ZERO);
        assert_eq!(summary.monthly_cost_display(), "$0.00");
        assert!(summary.lines.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let items = [
            item(1, Some(1), Decimal::new(1999, 2), Some(90), Decimal::new(3, 0)),
            item(2, Some(2), Decimal::new(4450, 2), Some(45), Decimal::new(5, 1)),
        ];
        assert_eq!(aggregate(&items), aggregate(&items));
    }

    #[test]
    fn test_overflowing_entry_flagged_instead_of_panicking() {
        let huge = item(1, Some(1), Decimal::MAX, Some(1), ServingsPerDay::MAX);
        let normal = item(2, Some(2), Decimal::new(30, 0), Some(30), Decimal::ONE);

        let summary = aggregate(&[huge, normal]);
        assert_eq!(summary.lines[0].flag, Some(CostFlag::Overflow));
        assert_eq!(summary.lines[0].monthly_cost, None);
        assert_eq!(summary.monthly_cost, DAYS_PER_MONTH);
        assert_eq!(summary.distinct_supplement_count, 2);
    }

    #[test]
    fn test_overflowing_total_flags_last_entry() {
        // Each line fits on its own; their sum times 30.437 does not.
        let half = Decimal::MAX / Decimal::new(40, 0);
        let summary = aggregate(&[
            item(1, Some(1), half, Some(1), Decimal::ONE),
            item(2, Some(1), half, Some(1), Decimal::ONE),
        ]);
        assert_eq!(summary.lines[0].flag, None);
        assert_eq!(summary.lines[1].flag, Some(CostFlag::Overflow));
        assert_eq!(summary.monthly_cost, summary.lines[0].monthly_cost.unwrap());
    }
}
