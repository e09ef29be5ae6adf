use crate::engine::{DailyAggregate, GroupAggregate};
use crate::schema::RankingPolicy;
use crate::utils::{per_day, WEEK};
use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

/// Stable descending sort on `metric`; equal values keep their input order.
pub fn rank_desc_by<T, F>(items: &[T], metric: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> f64,
{
    let mut ranked = items.to_vec();
    ranked.sort_by(|a, b| metric(b).total_cmp(&metric(a)));
    ranked
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeekdayFigure {
    HistoricalAverage,
    /// The slot of the most recent day, holding that day's actual revenue.
    LastDayActual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayPattern {
    pub weekday: Weekday,
    pub revenue: f64,
    pub avg_quantity: f64,
    pub occurrences: usize,
    pub figure: WeekdayFigure,
}

pub struct Ranker<'a> {
    policy: &'a RankingPolicy,
}

impl<'a> Ranker<'a> {
    pub fn new(policy: &'a RankingPolicy) -> Self {
        Self { policy }
    }

    /// Top `growth_leaders` by growth among the top `revenue_pool` by last-day revenue.
    ///
    /// A high-growth product outside the revenue pool never makes the list.
    pub fn growth_leaders<T>(&self, groups: &[T]) -> Vec<T>
    where
        T: AsRef<GroupAggregate> + Clone,
    {
        let mut pool = rank_desc_by(groups, |g| g.as_ref().last_period_revenue);
        pool.truncate(self.policy.revenue_pool);

        let mut leaders = rank_desc_by(&pool, |g| g.as_ref().growth_ratio);
        leaders.truncate(self.policy.growth_leaders);
        leaders
    }

    /// Highest last-day revenue; the first one wins a tie.
    pub fn top_by_last_period<'g, T>(&self, groups: &'g [T]) -> Option<&'g T>
    where
        T: AsRef<GroupAggregate>,
    {
        let mut best: Option<&T> = None;
        for group in groups {
            match best {
                Some(current)
                    if group.as_ref().last_period_revenue
                        <= current.as_ref().last_period_revenue => {}
                _ => best = Some(group),
            }
        }
        best
    }

    /// Keys that beat their daily average on the last day with at least the revenue
    /// floor, best growth first.
    pub fn last_day_performers<T>(&self, groups: &[T]) -> Vec<T>
    where
        T: AsRef<GroupAggregate> + Clone,
    {
        let floor = self.policy.performer_revenue_floor;
        let qualifying: Vec<T> = groups
            .iter()
            .filter(|g| {
                let g = g.as_ref();
                g.last_period_revenue > g.daily_avg_revenue && g.last_period_revenue >= floor
            })
            .cloned()
            .collect();

        rank_desc_by(&qualifying, |g| g.as_ref().growth_ratio)
    }

    pub fn top_n<T>(&self, groups: &[T], n: usize, metric: impl Fn(&T) -> f64) -> Vec<T>
    where
        T: Clone,
    {
        let mut ranked = rank_desc_by(groups, metric);
        ranked.truncate(n);
        ranked
    }
}

/// Average revenue and quantity per weekday, Monday to Sunday.
///
/// The weekday of the most recent day shows that day's actual revenue instead of its
/// average; the other six rows are untouched. Weekdays that never occur report 0.
pub fn weekly_pattern(series: &[DailyAggregate]) -> Vec<WeekdayPattern> {
    let mut sums = [(0.0_f64, 0.0_f64, 0_usize); 7];
    for day in series {
        let slot = &mut sums[day.calendar_date.weekday().num_days_from_monday() as usize];
        slot.0 += day.total_revenue;
        slot.1 += day.total_quantity;
        slot.2 += 1;
    }

    let last = series.iter().max_by_key(|d| d.calendar_date);

    WEEK.iter()
        .zip(sums.iter())
        .map(|(&weekday, &(revenue, quantity, occurrences))| {
            let avg_quantity = per_day(quantity, occurrences);
            match last {
                Some(day) if day.calendar_date.weekday() == weekday => WeekdayPattern {
                    weekday,
                    revenue: day.total_revenue,
                    avg_quantity,
                    occurrences,
                    figure: WeekdayFigure::LastDayActual,
                },
                _ => WeekdayPattern {
                    weekday,
                    revenue: per_day(revenue, occurrences),
                    avg_quantity,
                    occurrences,
                    figure: WeekdayFigure::HistoricalAverage,
                },
            }
        })
        .collect()
}
