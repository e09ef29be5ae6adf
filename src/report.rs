use crate::engine::{AggregationEngine, DailyAggregate, GroupAggregate};
use crate::growth::{ComparisonAggregate, GrowthAnalyzer};
use crate::ranking::{rank_desc_by, weekly_pattern, Ranker, WeekdayFigure, WeekdayPattern};
use crate::records::{GroupingDimension, InventoryRecord, TransactionRecord};
use crate::schema::AnalyticsConfig;
use crate::utils::{
    format_currency, format_grouped_integer, format_percent, format_signed_percent, weekday_name,
};
use chrono::{Datelike, NaiveDate};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A product row with its sellable stock joined on by name (0 when unmatched).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAggregate {
    #[serde(flatten)]
    pub group: GroupAggregate,
    pub stock: f64,
}

impl AsRef<GroupAggregate> for ProductAggregate {
    fn as_ref(&self) -> &GroupAggregate {
        &self.group
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryProjection {
    pub item_name: String,
    pub sellable_quantity: f64,
    pub incoming_quantity: f64,
    pub trailing_30day_quantity: f64,
    /// `sellable + incoming - trailing_30day`
    pub projected_inventory: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceStatus {
    Higher,
    Lower,
}

impl PerformanceStatus {
    /// `Higher` only when the last day is strictly above the daily average.
    pub fn from_revenue(last_day: f64, daily_avg: f64) -> Self {
        if last_day > daily_avg {
            PerformanceStatus::Higher
        } else {
            PerformanceStatus::Lower
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PerformanceStatus::Higher => "HIGHER",
            PerformanceStatus::Lower => "LOWER",
        }
    }
}

/// Period-level figures shown at the top of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub report_date: Option<NaiveDate>,
    pub last_day_name: Option<String>,
    pub last_day_revenue: f64,
    pub last_day_quantity: f64,
    pub daily_avg_revenue: f64,
    pub daily_avg_quantity: f64,
    pub period_total: f64,
    pub num_days: usize,
    pub total_sellable: f64,
    pub status: PerformanceStatus,
}

impl Headline {
    pub fn revenue_delta(&self) -> f64 {
        self.last_day_revenue - self.daily_avg_revenue
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub overall: ComparisonAggregate,
    pub products: Vec<ComparisonAggregate>,
    pub states: Vec<ComparisonAggregate>,
    pub cities: Vec<ComparisonAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

/// A named output table, the shape handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub headline: Headline,
    /// Every product, highest last-day revenue first.
    pub all_products: Vec<ProductAggregate>,
    /// Highest total revenue first.
    pub top_products: Vec<ProductAggregate>,
    pub top_states: Vec<GroupAggregate>,
    pub top_cities: Vec<GroupAggregate>,
    pub top_state: Option<GroupAggregate>,
    pub top_city: Option<GroupAggregate>,
    pub growth_leaders: Vec<ProductAggregate>,
    pub last_day_performers: Vec<ProductAggregate>,
    pub daily_series: Vec<DailyAggregate>,
    pub weekly_pattern: Vec<WeekdayPattern>,
    pub comparison: Option<PeriodComparison>,
    /// Lowest projected inventory first.
    pub inventory: Vec<InventoryProjection>,
    pub summary: String,
}

const GROUP_COLUMNS: [&str; 7] = [
    "Last Day Rev",
    "Daily Avg Rev",
    "Total Rev",
    "Last Day Qty",
    "Daily Avg Qty",
    "Total Qty",
    "Growth %",
];

fn group_cells(group: &GroupAggregate) -> Vec<Cell> {
    vec![
        Cell::Text(group.key.clone()),
        Cell::Number(group.last_period_revenue),
        Cell::Number(group.daily_avg_revenue),
        Cell::Number(group.total_revenue),
        Cell::Number(group.last_period_quantity),
        Cell::Number(group.daily_avg_quantity),
        Cell::Number(group.total_quantity),
        Cell::Number(group.growth_ratio * 100.0),
    ]
}

fn group_table<T: AsRef<GroupAggregate>>(
    name: &str,
    dimension: GroupingDimension,
    groups: &[T],
) -> ReportTable {
    let mut columns = vec![dimension.label()];
    columns.extend(GROUP_COLUMNS);
    let mut table = ReportTable::new(name, &columns);
    table.rows = groups.iter().map(|g| group_cells(g.as_ref())).collect();
    table
}

fn product_table(name: &str, products: &[ProductAggregate]) -> ReportTable {
    let mut table = group_table(name, GroupingDimension::Product, products);
    table.columns.push("Stock".to_string());
    for (row, product) in table.rows.iter_mut().zip(products) {
        row.push(Cell::Number(product.stock));
    }
    table
}

fn comparison_table<'c>(
    name: &str,
    dimension: GroupingDimension,
    rows: impl IntoIterator<Item = &'c ComparisonAggregate>,
) -> ReportTable {
    let mut table = ReportTable::new(
        name,
        &[
            dimension.label(),
            "Prev Daily Avg Rev",
            "Curr Daily Avg Rev",
            "Rev Growth %",
            "Prev Daily Avg Qty",
            "Curr Daily Avg Qty",
            "Qty Growth %",
        ],
    );
    table.rows = rows
        .into_iter()
        .map(|c| {
            vec![
                Cell::Text(c.key.clone()),
                Cell::Number(c.prev_daily_avg_revenue),
                Cell::Number(c.curr_daily_avg_revenue),
                Cell::Number(c.revenue_growth_ratio * 100.0),
                Cell::Number(c.prev_daily_avg_quantity),
                Cell::Number(c.curr_daily_avg_quantity),
                Cell::Number(c.quantity_growth_ratio * 100.0),
            ]
        })
        .collect();
    table
}

impl AnalysisResult {
    /// All output tables in export order. Comparison tables appear only when a
    /// previous period was supplied.
    pub fn tables(&self) -> Vec<ReportTable> {
        let mut tables = vec![
            product_table("All Products", &self.all_products),
            product_table("Top Products", &self.top_products),
            group_table("Top States", GroupingDimension::State, &self.top_states),
            group_table("Top Cities", GroupingDimension::City, &self.top_cities),
            product_table("Last Day Performers", &self.last_day_performers),
        ];

        let mut daily = ReportTable::new("Daily Sales", &["Date", "Total Revenue", "Total Quantity"]);
        daily.rows = self
            .daily_series
            .iter()
            .map(|d| {
                vec![
                    Cell::Date(d.calendar_date),
                    Cell::Number(d.total_revenue),
                    Cell::Number(d.total_quantity),
                ]
            })
            .collect();
        tables.push(daily);

        let mut weekly = ReportTable::new(
            "Weekly Pattern",
            &["Weekday", "Revenue", "Avg Quantity", "Days", "Figure"],
        );
        weekly.rows = self
            .weekly_pattern
            .iter()
            .map(|w| {
                let figure = match w.figure {
                    WeekdayFigure::HistoricalAverage => "Average",
                    WeekdayFigure::LastDayActual => "Last day",
                };
                vec![
                    Cell::Text(weekday_name(w.weekday).to_string()),
                    Cell::Number(w.revenue),
                    Cell::Number(w.avg_quantity),
                    Cell::Number(w.occurrences as f64),
                    Cell::Text(figure.to_string()),
                ]
            })
            .collect();
        tables.push(weekly);

        if let Some(comparison) = &self.comparison {
            // whole-period row first
            tables.push(comparison_table(
                "Product Comparison",
                GroupingDimension::Product,
                std::iter::once(&comparison.overall).chain(&comparison.products),
            ));
            tables.push(comparison_table(
                "State Comparison",
                GroupingDimension::State,
                &comparison.states,
            ));
            tables.push(comparison_table(
                "City Comparison",
                GroupingDimension::City,
                &comparison.cities,
            ));
        }

        let mut inventory = ReportTable::new(
            "Inventory",
            &[
                "Item Name",
                "Total sellable",
                "Incoming scheduled inventory",
                "Last 30 days",
                "Projected Inventory",
            ],
        );
        inventory.rows = self
            .inventory
            .iter()
            .map(|i| {
                vec![
                    Cell::Text(i.item_name.clone()),
                    Cell::Number(i.sellable_quantity),
                    Cell::Number(i.incoming_quantity),
                    Cell::Number(i.trailing_30day_quantity),
                    Cell::Number(i.projected_inventory),
                ]
            })
            .collect();
        tables.push(inventory);

        tables
    }
}

pub struct ReportAssembler<'a> {
    config: &'a AnalyticsConfig,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(config: &'a AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn assemble(
        &self,
        current: &[TransactionRecord],
        inventory: &[InventoryRecord],
        previous: Option<&[TransactionRecord]>,
    ) -> AnalysisResult {
        let denominator = self.config.zero_average_denominator;
        let policy = &self.config.ranking;
        let engine = AggregationEngine::new(current, denominator);
        let ranker = Ranker::new(policy);

        info!(
            "Analyzing {} transactions over {} days against {} inventory rows",
            current.len(),
            engine.num_days(),
            inventory.len()
        );

        let stock = stock_by_item(inventory);
        let products: Vec<ProductAggregate> = engine
            .group_totals(GroupingDimension::Product)
            .into_iter()
            .map(|group| ProductAggregate {
                stock: stock.get(group.key.as_str()).copied().unwrap_or(0.0),
                group,
            })
            .collect();
        let states = engine.group_totals(GroupingDimension::State);
        let cities = engine.group_totals(GroupingDimension::City);

        let headline = self.headline(&engine, inventory);
        let growth_leaders = ranker.growth_leaders(&products);
        let top_state = ranker.top_by_last_period(&states).cloned();
        let top_city = ranker.top_by_last_period(&cities).cloned();

        let comparison = previous.map(|previous| {
            let prev_engine = AggregationEngine::new(previous, denominator);
            let analyzer = GrowthAnalyzer::new(denominator);
            debug!(
                "Comparing against previous period of {} transactions over {} days",
                previous.len(),
                prev_engine.num_days()
            );
            PeriodComparison {
                overall: analyzer.compare_overall(&prev_engine, &engine),
                products: analyzer.compare(&prev_engine, &engine, GroupingDimension::Product),
                states: analyzer.compare(&prev_engine, &engine, GroupingDimension::State),
                cities: analyzer.compare(&prev_engine, &engine, GroupingDimension::City),
            }
        });

        let daily_series = engine.daily_series();

        let summary = self.summary(&headline, top_state.as_ref(), &growth_leaders);

        AnalysisResult {
            all_products: rank_desc_by(&products, |p| p.group.last_period_revenue),
            top_products: ranker.top_n(&products, policy.top_products, |p| p.group.total_revenue),
            top_states: ranker.top_n(&states, policy.top_locations, |g| g.last_period_revenue),
            top_cities: ranker.top_n(&cities, policy.top_locations, |g| g.last_period_revenue),
            last_day_performers: ranker.last_day_performers(&products),
            weekly_pattern: weekly_pattern(&daily_series),
            inventory: project_inventory(inventory),
            headline,
            top_state,
            top_city,
            growth_leaders,
            daily_series,
            comparison,
            summary,
        }
    }

    fn headline(&self, engine: &AggregationEngine<'_>, inventory: &[InventoryRecord]) -> Headline {
        let rate = engine.daily_rate();
        let last_day = engine.last_day();
        let last_day_revenue = last_day.as_ref().map_or(0.0, |d| d.total_revenue);

        Headline {
            report_date: engine.last_date(),
            last_day_name: engine
                .last_date()
                .map(|d| weekday_name(d.weekday()).to_string()),
            last_day_revenue,
            last_day_quantity: last_day.as_ref().map_or(0.0, |d| d.total_quantity),
            daily_avg_revenue: rate.revenue,
            daily_avg_quantity: rate.quantity,
            period_total: engine.period_total(),
            num_days: engine.num_days(),
            total_sellable: inventory.iter().map(|i| i.sellable_quantity).sum(),
            status: PerformanceStatus::from_revenue(last_day_revenue, rate.revenue),
        }
    }

    /// The short-form executive summary. Currency is rendered as whole numbers and
    /// percentages with one decimal, independent of locale.
    pub fn summary(
        &self,
        headline: &Headline,
        top_state: Option<&GroupAggregate>,
        growth_leaders: &[ProductAggregate],
    ) -> String {
        let symbol = &self.config.currency_symbol;
        let money = |v: f64| format_currency(v, symbol);

        let date = headline
            .report_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "n/a".to_string());

        let delta = headline.revenue_delta();
        let delta_text = if delta >= 0.0 {
            format!("+{}", money(delta))
        } else {
            money(delta)
        };

        let state_text = match top_state {
            Some(state) => format!(
                "{} ({} | {})",
                state.key,
                money(state.last_period_revenue),
                format_signed_percent(state.growth_ratio)
            ),
            None => "n/a".to_string(),
        };

        let leaders = growth_leaders
            .iter()
            .enumerate()
            .map(|(idx, product)| {
                format!(
                    "{}. {}: {}",
                    idx + 1,
                    product.group.key,
                    format_percent(product.group.growth_ratio)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "*{title}*\n\
             📅 Date: {date}\n\n\
             💰 *Last Day Rev:* {rev} ({delta} vs Avg)\n\
             📦 *Last Day Qty:* {qty} units\n\
             ⚖️ *Daily Avg Qty:* {avg_qty:.1} units\n\
             📈 *Status:* {status} vs Avg\n\
             🌍 *Top State:* {state}\n\n\
             🚀 *Top {leaders_n} Growth Leaders (Of Top {pool} Sellers):*\n{leaders}\n\n\
             🏭 *Inventory:* {stock} units",
            title = self.config.summary_title,
            date = date,
            rev = money(headline.last_day_revenue),
            delta = delta_text,
            qty = format_grouped_integer(headline.last_day_quantity),
            avg_qty = headline.daily_avg_quantity,
            status = headline.status.label(),
            state = state_text,
            leaders_n = self.config.ranking.growth_leaders,
            pool = self.config.ranking.revenue_pool,
            leaders = leaders,
            stock = format_grouped_integer(headline.total_sellable),
        )
    }
}

/// Sellable stock per non-empty item name.
fn stock_by_item(inventory: &[InventoryRecord]) -> BTreeMap<&str, f64> {
    let mut stock = BTreeMap::new();
    for record in inventory.iter().filter(|r| !r.item_name.is_empty()) {
        *stock.entry(record.item_name.as_str()).or_insert(0.0) += record.sellable_quantity;
    }
    stock
}

/// Inventory summed per item name, lowest projected inventory first.
pub fn project_inventory(inventory: &[InventoryRecord]) -> Vec<InventoryProjection> {
    let mut by_item: BTreeMap<&str, (f64, f64, f64)> = BTreeMap::new();
    for record in inventory.iter().filter(|r| !r.item_name.is_empty()) {
        let entry = by_item.entry(record.item_name.as_str()).or_default();
        entry.0 += record.sellable_quantity;
        entry.1 += record.incoming_quantity;
        entry.2 += record.trailing_30day_quantity;
    }

    let mut rows: Vec<InventoryProjection> = by_item
        .into_iter()
        .map(|(name, (sellable, incoming, trailing))| InventoryProjection {
            item_name: name.to_string(),
            sellable_quantity: sellable,
            incoming_quantity: incoming,
            trailing_30day_quantity: trailing,
            projected_inventory: sellable + incoming - trailing,
        })
        .collect();

    rows.sort_by(|a, b| a.projected_inventory.total_cmp(&b.projected_inventory));
    rows
}
