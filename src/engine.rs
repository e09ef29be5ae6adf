use crate::growth::growth_ratio;
use crate::records::{GroupingDimension, TransactionRecord};
use crate::utils::per_day;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub calendar_date: NaiveDate,
    pub total_revenue: f64,
    pub total_quantity: f64,
}

/// Totals, last-day figures and growth for one key of a grouping dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAggregate {
    pub key: String,
    pub last_period_revenue: f64,
    pub daily_avg_revenue: f64,
    pub total_revenue: f64,
    pub last_period_quantity: f64,
    pub daily_avg_quantity: f64,
    pub total_quantity: f64,
    pub growth_ratio: f64,
}

impl AsRef<GroupAggregate> for GroupAggregate {
    fn as_ref(&self) -> &GroupAggregate {
        self
    }
}

/// Period-level daily averages of one key, the input to period comparisons.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyRate {
    pub revenue: f64,
    pub quantity: f64,
}

#[derive(Default)]
struct Totals {
    revenue: f64,
    quantity: f64,
    last_revenue: f64,
    last_quantity: f64,
}

/// Aggregates over one normalized transaction set.
///
/// `num_days` is the count of distinct calendar dates present, never the calendar span,
/// and every daily average divides by it regardless of how many days a key sold on.
pub struct AggregationEngine<'a> {
    records: &'a [TransactionRecord],
    zero_average_denominator: f64,
    last_date: Option<NaiveDate>,
    num_days: usize,
}

impl<'a> AggregationEngine<'a> {
    pub fn new(records: &'a [TransactionRecord], zero_average_denominator: f64) -> Self {
        let dates: BTreeSet<NaiveDate> = records.iter().map(|r| r.calendar_date()).collect();

        Self {
            records,
            zero_average_denominator,
            last_date: dates.iter().next_back().copied(),
            num_days: dates.len(),
        }
    }

    pub fn num_days(&self) -> usize {
        self.num_days
    }

    /// The maximum calendar date present.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.last_date
    }

    pub fn period_total(&self) -> f64 {
        self.records.iter().map(|r| r.gross_amount).sum()
    }

    pub fn period_quantity(&self) -> f64 {
        self.records.iter().map(|r| r.quantity).sum()
    }

    /// Period revenue and quantity per day.
    pub fn daily_rate(&self) -> DailyRate {
        DailyRate {
            revenue: per_day(self.period_total(), self.num_days),
            quantity: per_day(self.period_quantity(), self.num_days),
        }
    }

    pub fn daily_series(&self) -> Vec<DailyAggregate> {
        let mut by_date: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
        for record in self.records {
            let entry = by_date.entry(record.calendar_date()).or_default();
            entry.0 += record.gross_amount;
            entry.1 += record.quantity;
        }

        by_date
            .into_iter()
            .map(|(calendar_date, (total_revenue, total_quantity))| DailyAggregate {
                calendar_date,
                total_revenue,
                total_quantity,
            })
            .collect()
    }

    pub fn last_day(&self) -> Option<DailyAggregate> {
        self.daily_series().pop()
    }

    /// One aggregate per distinct non-empty key, in key order.
    pub fn group_totals(&self, dimension: GroupingDimension) -> Vec<GroupAggregate> {
        let totals = self.collect_totals(dimension);

        let groups: Vec<GroupAggregate> = totals
            .into_iter()
            .map(|(key, t)| {
                let daily_avg_revenue = per_day(t.revenue, self.num_days);
                GroupAggregate {
                    key: key.to_string(),
                    last_period_revenue: t.last_revenue,
                    daily_avg_revenue,
                    total_revenue: t.revenue,
                    last_period_quantity: t.last_quantity,
                    daily_avg_quantity: per_day(t.quantity, self.num_days),
                    total_quantity: t.quantity,
                    growth_ratio: growth_ratio(
                        t.last_revenue,
                        daily_avg_revenue,
                        self.zero_average_denominator,
                    ),
                }
            })
            .collect();

        debug!(
            "{} groups for dimension {} over {} days",
            groups.len(),
            dimension.label(),
            self.num_days
        );
        groups
    }

    /// Daily averages per key, the shape consumed by period comparisons.
    pub fn daily_rates(&self, dimension: GroupingDimension) -> BTreeMap<String, DailyRate> {
        self.collect_totals(dimension)
            .into_iter()
            .map(|(key, t)| {
                (
                    key.to_string(),
                    DailyRate {
                        revenue: per_day(t.revenue, self.num_days),
                        quantity: per_day(t.quantity, self.num_days),
                    },
                )
            })
            .collect()
    }

    fn collect_totals(&self, dimension: GroupingDimension) -> BTreeMap<&'a str, Totals> {
        let mut totals: BTreeMap<&'a str, Totals> = BTreeMap::new();

        for record in self.records {
            let key = dimension.key(record);
            if key.is_empty() {
                continue;
            }

            let entry = totals.entry(key).or_default();
            entry.revenue += record.gross_amount;
            entry.quantity += record.quantity;

            if Some(record.calendar_date()) == self.last_date {
                entry.last_revenue += record.gross_amount;
                entry.last_quantity += record.quantity;
            }
        }

        totals
    }
}
