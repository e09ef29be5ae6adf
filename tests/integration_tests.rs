use chrono::NaiveDate;
use sales_inventory_analytics::*;
use std::fmt::Write;

const SALES_HEADER: &str =
    "Order Date,Product Name,Customer State,Customer City,Quantity,Total Gross Bill Amount";

fn sales_csv(preamble_rows: usize, lines: &[String]) -> String {
    let mut csv = String::new();
    for i in 0..preamble_rows {
        writeln!(csv, "Report line {},,,,,", i).unwrap();
    }
    writeln!(csv, "{}", SALES_HEADER).unwrap();
    for line in lines {
        writeln!(csv, "{}", line).unwrap();
    }
    csv
}

fn line(date: &str, product: &str, state: &str, city: &str, qty: f64, amount: f64) -> String {
    format!("{},{},{},{},{},{}", date, product, state, city, qty, amount)
}

fn ingest(csv: &str) -> anyhow::Result<Vec<TransactionRecord>> {
    let workbook = RawWorkbook::from_csv_reader("orders", csv.as_bytes())?;
    Ok(ingest_transactions(&workbook)?)
}

/// Twenty products over a week. The product with the best growth ranks 13th on last-day
/// revenue, just outside the pool the growth leaders are drawn from.
fn twenty_product_month() -> Vec<String> {
    let mut lines = Vec::new();
    for day in 1..=7 {
        for p in 0..20 {
            let base = 2000.0 - p as f64 * 90.0;
            let amount = if day == 7 {
                // last day: P19 jumps far above its own average
                if p == 19 {
                    base * 4.0
                } else {
                    base * (1.0 + p as f64 * 0.02)
                }
            } else {
                base
            };
            lines.push(line(
                &format!("2024-03-{:02} 12:00:00", day),
                &format!("P{:02}", p),
                if p % 2 == 0 { "Delhi" } else { "Punjab" },
                if p % 3 == 0 { "Gurgaon" } else { "Noida" },
                1.0,
                amount,
            ));
        }
    }
    lines
}

#[test]
fn test_daily_series_partitions_period_total() -> anyhow::Result<()> {
    let records = ingest(&sales_csv(0, &twenty_product_month()))?;
    let engine = AggregationEngine::new(&records, constants::ZERO_AVERAGE_DENOMINATOR);

    let series = engine.daily_series();
    let sum: f64 = series.iter().map(|d| d.total_revenue).sum();

    assert_eq!(series.len(), 7);
    assert_eq!(engine.num_days(), 7);
    assert!((sum - engine.period_total()).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_gaps_are_not_counted_as_days() -> anyhow::Result<()> {
    let lines = vec![
        line("2024-03-01 09:00:00", "Milk", "Delhi", "Noida", 1.0, 100.0),
        line("2024-03-01 19:00:00", "Milk", "Delhi", "Noida", 1.0, 100.0),
        line("2024-03-10 09:00:00", "Milk", "Delhi", "Noida", 1.0, 400.0),
    ];
    let records = ingest(&sales_csv(0, &lines))?;
    let result = analyze(&records, &[], None);

    assert_eq!(result.headline.num_days, 2);
    assert_eq!(result.headline.daily_avg_revenue, 300.0);
    assert_eq!(result.all_products[0].group.daily_avg_revenue, 300.0);
    Ok(())
}

#[test]
fn test_header_found_below_preamble() -> anyhow::Result<()> {
    let lines = vec![line("2024-03-01", "Milk", "Delhi", "Noida", 2.0, 80.0)];
    let records = ingest(&sales_csv(3, &lines))?;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].quantity, 2.0);
    Ok(())
}

#[test]
fn test_missing_required_column_is_schema_not_found() {
    let mut csv = String::new();
    for i in 0..10 {
        writeln!(csv, "Report line {},x", i).unwrap();
    }
    writeln!(csv, "Order Date,Units").unwrap();
    writeln!(csv, "2024-03-01,3").unwrap();

    let workbook = RawWorkbook::from_csv_reader("orders", csv.as_bytes()).unwrap();
    match ingest_transactions(&workbook) {
        Err(AnalyticsError::SchemaNotFound {
            input,
            required,
            window,
            ..
        }) => {
            assert_eq!(input, InputKind::Transactions);
            assert_eq!(required, vec!["Order Date", "Quantity"]);
            assert_eq!(window, 10);
        }
        other => panic!("expected SchemaNotFound, got {:?}", other),
    }
}

#[test]
fn test_unparsable_dates_are_excluded_everywhere() -> anyhow::Result<()> {
    let lines = vec![
        line("2024-03-01", "Milk", "Delhi", "Noida", 1.0, 100.0),
        line("yesterday", "Caviar", "Goa", "Panaji", 1.0, 99_999.0),
        line("2024-03-02", "Milk", "Delhi", "Noida", 1.0, 300.0),
    ];
    let records = ingest(&sales_csv(0, &lines))?;
    let result = analyze(&records, &[], None);

    assert_eq!(records.len(), 2);
    assert_eq!(result.headline.period_total, 400.0);
    assert!(result.all_products.iter().all(|p| p.group.key != "Caviar"));
    assert!(result.top_states.iter().all(|s| s.key != "Goa"));
    Ok(())
}

#[test]
fn test_zero_average_growth_equals_last_value() {
    assert_eq!(growth_ratio(500.0, 0.0, constants::ZERO_AVERAGE_DENOMINATOR), 500.0);
}

#[test]
fn test_growth_leaders_never_escape_revenue_pool() -> anyhow::Result<()> {
    let records = ingest(&sales_csv(0, &twenty_product_month()))?;
    let result = analyze(&records, &[], None);

    let best_growth = result
        .all_products
        .iter()
        .max_by(|a, b| a.group.growth_ratio.total_cmp(&b.group.growth_ratio))
        .unwrap();
    assert_eq!(best_growth.group.key, "P19");

    let pool: Vec<&str> = result
        .all_products
        .iter()
        .take(constants::REVENUE_POOL_SIZE)
        .map(|p| p.group.key.as_str())
        .collect();
    assert!(!pool.contains(&"P19"));

    assert_eq!(result.growth_leaders.len(), constants::GROWTH_LEADERS);
    for leader in &result.growth_leaders {
        assert!(pool.contains(&leader.group.key.as_str()));
    }
    assert!(result.summary.contains("Top 5 Growth Leaders (Of Top 12 Sellers)"));
    Ok(())
}

#[test]
fn test_last_day_performer_floor() -> anyhow::Result<()> {
    // Two days; each product sells on day one and day two
    let lines = vec![
        line("2024-03-01", "Small", "Delhi", "Noida", 1.0, 100.0),
        line("2024-03-02", "Small", "Delhi", "Noida", 1.0, 900.0),
        line("2024-03-01", "Exact", "Delhi", "Noida", 1.0, 100.0),
        line("2024-03-02", "Exact", "Delhi", "Noida", 1.0, 1000.0),
    ];
    let records = ingest(&sales_csv(0, &lines))?;
    let result = analyze(&records, &[], None);

    let performers: Vec<&str> = result
        .last_day_performers
        .iter()
        .map(|p| p.group.key.as_str())
        .collect();
    assert_eq!(performers, vec!["Exact"]);
    Ok(())
}

#[test]
fn test_weekly_pattern_replaces_single_slot() -> anyhow::Result<()> {
    let records = ingest(&sales_csv(0, &twenty_product_month()))?;
    let result = analyze(&records, &[], None);

    // 2024-03-07 is a Thursday
    let last_day = result.headline.last_day_revenue;
    let replaced: Vec<&WeekdayPattern> = result
        .weekly_pattern
        .iter()
        .filter(|w| w.figure == WeekdayFigure::LastDayActual)
        .collect();
    assert_eq!(replaced.len(), 1);
    assert_eq!(replaced[0].weekday, chrono::Weekday::Thu);
    assert_eq!(replaced[0].revenue, last_day);

    let regular_day: f64 = (0..20).map(|p| 2000.0 - p as f64 * 90.0).sum();
    for row in result
        .weekly_pattern
        .iter()
        .filter(|w| w.figure == WeekdayFigure::HistoricalAverage)
    {
        assert!((row.revenue - regular_day).abs() < 1e-6);
    }
    Ok(())
}

#[test]
fn test_comparison_outer_join() -> anyhow::Result<()> {
    let previous = ingest(&sales_csv(
        0,
        &[
            line("2024-02-01", "Milk", "Delhi", "Noida", 2.0, 200.0),
            line("2024-02-02", "Retired", "Goa", "Panaji", 1.0, 400.0),
        ],
    ))?;
    let current = ingest(&sales_csv(
        0,
        &[line("2024-03-01", "Milk", "Delhi", "Noida", 3.0, 600.0)],
    ))?;

    let result = analyze(&current, &[], Some(previous.as_slice()));
    let comparison = result.comparison.as_ref().expect("comparison present");

    let retired = comparison
        .products
        .iter()
        .find(|c| c.key == "Retired")
        .expect("key from previous period kept");
    assert_eq!(retired.curr_daily_avg_revenue, 0.0);
    assert_eq!(retired.prev_daily_avg_revenue, 200.0);
    assert!(retired.revenue_growth_ratio.is_finite());
    assert!((retired.revenue_growth_ratio + 1.0).abs() < 1e-12);

    let goa = comparison.states.iter().find(|c| c.key == "Goa").unwrap();
    assert_eq!(goa.curr_daily_avg_quantity, 0.0);

    assert_eq!(comparison.overall.prev_daily_avg_revenue, 300.0);
    assert_eq!(comparison.overall.curr_daily_avg_revenue, 600.0);
    assert!((comparison.overall.revenue_growth_ratio - 1.0).abs() < 1e-12);
    Ok(())
}

#[test]
fn test_no_non_finite_values_leave_the_engine() -> anyhow::Result<()> {
    let lines = vec![
        line("2024-03-01", "Free sample", "Delhi", "Noida", 0.0, 0.0),
        line("2024-03-02", "Free sample", "Delhi", "Noida", 0.0, 0.0),
        line("2024-03-02", "Milk", "Delhi", "Noida", 1.0, 50.0),
    ];
    let records = ingest(&sales_csv(0, &lines))?;
    let previous = ingest(&sales_csv(
        0,
        &[line("2024-02-01", "Free sample", "Delhi", "Noida", 0.0, 0.0)],
    ))?;
    let result = analyze(&records, &[], Some(previous.as_slice()));

    for table in result.tables() {
        for row in &table.rows {
            for cell in row {
                if let Cell::Number(value) = cell {
                    assert!(value.is_finite(), "non-finite value in {}", table.name);
                }
            }
        }
    }
    Ok(())
}

#[test]
fn test_inventory_join_and_projection() -> anyhow::Result<()> {
    let records = ingest(&sales_csv(
        0,
        &[
            line("2024-03-01", "Milk", "Delhi", "Noida", 2.0, 200.0),
            line("2024-03-01", "Tea", "Delhi", "Noida", 1.0, 90.0),
        ],
    ))?;

    let inventory_csv = "Inventory dump\n\
                         Item Name,Total sellable,Incoming scheduled inventory,Last 30 days\n\
                         Milk,40,10,30\n\
                         Butter,5,0,45\n";
    let workbook = RawWorkbook::from_csv_reader("stock", inventory_csv.as_bytes())?;
    let inventory = ingest_inventory(&workbook)?;

    let result = analyze(&records, &inventory, None);

    let tea = result
        .all_products
        .iter()
        .find(|p| p.group.key == "Tea")
        .unwrap();
    assert_eq!(tea.stock, 0.0);

    let projected: Vec<(&str, f64)> = result
        .inventory
        .iter()
        .map(|i| (i.item_name.as_str(), i.projected_inventory))
        .collect();
    assert_eq!(projected, vec![("Butter", -40.0), ("Milk", 20.0)]);
    assert_eq!(result.headline.total_sellable, 45.0);
    Ok(())
}

#[test]
fn test_summary_layout() -> anyhow::Result<()> {
    let records = ingest(&sales_csv(
        0,
        &[
            line("2024-03-01", "Milk", "Delhi", "Noida", 10.0, 1000.0),
            line("2024-03-02", "Milk", "Delhi", "Noida", 4.0, 400.0),
        ],
    ))?;
    let result = analyze(&records, &[], None);

    assert_eq!(
        result.headline.report_date,
        NaiveDate::from_ymd_opt(2024, 3, 2)
    );
    assert_eq!(result.headline.status, PerformanceStatus::Lower);
    assert!(result.summary.contains("📅 Date: 2024-03-02"));
    assert!(result.summary.contains("*Last Day Rev:* ₹400 (-₹300 vs Avg)"));
    assert!(result.summary.contains("*Status:* LOWER vs Avg"));
    assert!(result.summary.contains("*Top State:* Delhi (₹400 | -42.9%)"));
    assert!(result.summary.contains("1. Milk: -42.9%"));
    Ok(())
}

#[test]
fn test_custom_config_columns() -> anyhow::Result<()> {
    let config = AnalyticsConfig::from_json_str(
        r#"{
            "transactions": { "order_date": "Date", "quantity": "Units", "gross_amount": "Amount" },
            "ranking": { "performer_revenue_floor": 10.0 }
        }"#,
    )?;
    let csv = "Date,Units,Amount,Product Name\n2024-03-01,1,5,Tea\n2024-03-02,1,20,Tea\n";
    let workbook = RawWorkbook::from_csv_reader("orders", csv.as_bytes())?;

    let (records, report) = AnalyticsProcessor::ingest_transactions(&workbook, &config)?;
    assert_eq!(records.len(), 2);
    assert_eq!(
        report.missing_optional_columns,
        vec!["Customer State", "Customer City"]
    );

    let result = AnalyticsProcessor::analyze(&records, &[], None, &config)?;
    assert_eq!(result.last_day_performers.len(), 1);
    Ok(())
}
