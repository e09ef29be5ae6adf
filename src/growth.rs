use crate::constants::OVERALL_KEY;
use crate::engine::{AggregationEngine, DailyRate};
use crate::records::GroupingDimension;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Replaces NaN and ±infinity with 0.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// `(current - base) / base`, where a base of exactly 0 is replaced by
/// `zero_average_denominator`.
///
/// With the default substitute of 1 a zero base gives `current` itself rather than a
/// percentage. Non-finite results are clamped to 0.
pub fn growth_ratio(current: f64, base: f64, zero_average_denominator: f64) -> f64 {
    let denominator = if base == 0.0 {
        zero_average_denominator
    } else {
        base
    };
    finite_or_zero((current - base) / denominator)
}

/// Previous vs current period daily averages for one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonAggregate {
    pub key: String,
    pub prev_daily_avg_revenue: f64,
    pub curr_daily_avg_revenue: f64,
    pub revenue_growth_ratio: f64,
    pub prev_daily_avg_quantity: f64,
    pub curr_daily_avg_quantity: f64,
    pub quantity_growth_ratio: f64,
}

pub struct GrowthAnalyzer {
    zero_average_denominator: f64,
}

impl GrowthAnalyzer {
    pub fn new(zero_average_denominator: f64) -> Self {
        Self {
            zero_average_denominator,
        }
    }

    pub fn ratio(&self, current: f64, base: f64) -> f64 {
        growth_ratio(current, base, self.zero_average_denominator)
    }

    fn comparison(&self, key: String, prev: DailyRate, curr: DailyRate) -> ComparisonAggregate {
        ComparisonAggregate {
            key,
            prev_daily_avg_revenue: prev.revenue,
            curr_daily_avg_revenue: curr.revenue,
            revenue_growth_ratio: self.ratio(curr.revenue, prev.revenue),
            prev_daily_avg_quantity: prev.quantity,
            curr_daily_avg_quantity: curr.quantity,
            quantity_growth_ratio: self.ratio(curr.quantity, prev.quantity),
        }
    }

    /// Outer join of both periods on the grouping key. A key seen in only one period
    /// gets 0 for the other side. Rows are ordered by current daily revenue, highest
    /// first, ties in key order.
    pub fn compare(
        &self,
        previous: &AggregationEngine<'_>,
        current: &AggregationEngine<'_>,
        dimension: GroupingDimension,
    ) -> Vec<ComparisonAggregate> {
        let prev_rates = previous.daily_rates(dimension);
        let curr_rates = current.daily_rates(dimension);

        let keys: BTreeSet<&String> = prev_rates.keys().chain(curr_rates.keys()).collect();

        let mut rows: Vec<ComparisonAggregate> = keys
            .into_iter()
            .map(|key| {
                let prev = prev_rates.get(key).copied().unwrap_or_default();
                let curr = curr_rates.get(key).copied().unwrap_or_default();
                self.comparison(key.clone(), prev, curr)
            })
            .collect();

        rows.sort_by(|a, b| b.curr_daily_avg_revenue.total_cmp(&a.curr_daily_avg_revenue));
        rows
    }

    /// Whole-period comparison keyed [`OVERALL_KEY`].
    pub fn compare_overall(
        &self,
        previous: &AggregationEngine<'_>,
        current: &AggregationEngine<'_>,
    ) -> ComparisonAggregate {
        self.comparison(
            OVERALL_KEY.to_string(),
            previous.daily_rate(),
            current.daily_rate(),
        )
    }
}
