use crate::error::{InputKind, Result};
use crate::locator::{HeaderLocation, SchemaLocator};
use crate::raw::RawWorkbook;
use crate::records::{InventoryRecord, TransactionRecord};
use crate::schema::AnalyticsConfig;
use crate::utils::{coerce_number, parse_datetime};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What happened to the rows of one input while normalizing it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub sheet: String,
    pub header_row: usize,
    /// Non-blank rows beneath the header.
    pub rows_scanned: usize,
    pub rows_dropped_unparsable_date: usize,
    /// Non-empty numeric cells that failed coercion or were negative, replaced by 0.
    pub numeric_values_defaulted: usize,
    pub missing_optional_columns: Vec<String>,
}

impl IngestReport {
    fn new(location: &HeaderLocation) -> Self {
        Self {
            sheet: location.sheet.clone(),
            header_row: location.header_row,
            ..Self::default()
        }
    }
}

/// Header names (trimmed) to column positions. First occurrence wins.
struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    fn new(header: &[String]) -> Self {
        let mut positions = HashMap::new();
        for (idx, name) in header.iter().enumerate() {
            positions.entry(name.trim().to_string()).or_insert(idx);
        }
        Self { positions }
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.positions.get(name.trim()).copied()
    }

    /// Looks up an optional column, noting its absence in the report.
    fn optional(&self, name: &str, report: &mut IngestReport) -> Option<usize> {
        let column = self.column(name);
        if column.is_none() {
            debug!("Optional column '{}' absent; defaulting to 0", name);
            report.missing_optional_columns.push(name.to_string());
        }
        column
    }
}

fn cell(row: &[String], column: Option<usize>) -> &str {
    column
        .and_then(|idx| row.get(idx))
        .map(String::as_str)
        .unwrap_or("")
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Coerces a quantity or amount. Failures and negatives become 0 and the row is kept.
fn quantity(raw: &str, report: &mut IngestReport) -> f64 {
    if raw.trim().is_empty() {
        return 0.0;
    }
    match coerce_number(raw) {
        Some(value) if value >= 0.0 => value,
        _ => {
            report.numeric_values_defaulted += 1;
            0.0
        }
    }
}

pub struct RecordNormalizer<'a> {
    config: &'a AnalyticsConfig,
}

impl<'a> RecordNormalizer<'a> {
    pub fn new(config: &'a AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn transactions(
        &self,
        workbook: &RawWorkbook,
    ) -> Result<(Vec<TransactionRecord>, IngestReport)> {
        let columns = &self.config.transactions;
        let required = columns.required();
        let location = SchemaLocator::new(
            InputKind::Transactions,
            &required,
            self.config.header_scan_rows,
        )
        .locate(workbook)?;

        let sheet = &workbook.sheets[location.sheet_index];
        let header = HeaderIndex::new(&sheet.rows[location.header_row]);
        let mut report = IngestReport::new(&location);

        let date_col = header.column(&columns.order_date);
        let quantity_col = header.column(&columns.quantity);
        let amount_col = header.optional(&columns.gross_amount, &mut report);
        let product_col = header.optional(&columns.product, &mut report);
        let state_col = header.optional(&columns.state, &mut report);
        let city_col = header.optional(&columns.city, &mut report);

        let mut records = Vec::new();
        for row in &sheet.rows[location.header_row + 1..] {
            if is_blank(row) {
                continue;
            }
            report.rows_scanned += 1;

            let Some(order_timestamp) = parse_datetime(cell(row, date_col)) else {
                report.rows_dropped_unparsable_date += 1;
                continue;
            };

            records.push(TransactionRecord {
                order_timestamp,
                product_name: cell(row, product_col).to_string(),
                customer_state: cell(row, state_col).to_string(),
                customer_city: cell(row, city_col).to_string(),
                quantity: quantity(cell(row, quantity_col), &mut report),
                gross_amount: quantity(cell(row, amount_col), &mut report),
            });
        }

        if report.rows_dropped_unparsable_date > 0 {
            warn!(
                "Dropped {} of {} transaction rows with an unparsable '{}'",
                report.rows_dropped_unparsable_date, report.rows_scanned, columns.order_date
            );
        }
        if report.numeric_values_defaulted > 0 {
            warn!(
                "Defaulted {} non-numeric or negative transaction values to 0",
                report.numeric_values_defaulted
            );
        }
        info!(
            "Ingested {} transactions from sheet '{}'",
            records.len(),
            report.sheet
        );

        Ok((records, report))
    }

    pub fn inventory(&self, workbook: &RawWorkbook) -> Result<(Vec<InventoryRecord>, IngestReport)> {
        let columns = &self.config.inventory;
        let required = columns.required();
        let location = SchemaLocator::new(
            InputKind::Inventory,
            &required,
            self.config.header_scan_rows,
        )
        .with_preferred_sheet(columns.preferred_sheet.as_deref())
        .locate(workbook)?;

        let sheet = &workbook.sheets[location.sheet_index];
        let header = HeaderIndex::new(&sheet.rows[location.header_row]);
        let mut report = IngestReport::new(&location);

        let item_col = header.column(&columns.item_name);
        let sellable_col = header.column(&columns.sellable);
        let incoming_col = header.optional(&columns.incoming, &mut report);
        let trailing_col = header.optional(&columns.trailing_30day, &mut report);

        let mut records = Vec::new();
        for row in &sheet.rows[location.header_row + 1..] {
            if is_blank(row) {
                continue;
            }
            report.rows_scanned += 1;

            records.push(InventoryRecord {
                item_name: cell(row, item_col).to_string(),
                sellable_quantity: quantity(cell(row, sellable_col), &mut report),
                incoming_quantity: quantity(cell(row, incoming_col), &mut report),
                trailing_30day_quantity: quantity(cell(row, trailing_col), &mut report),
            });
        }

        if report.numeric_values_defaulted > 0 {
            warn!(
                "Defaulted {} non-numeric or negative inventory values to 0",
                report.numeric_values_defaulted
            );
        }
        info!(
            "Ingested {} inventory rows from sheet '{}'",
            records.len(),
            report.sheet
        );

        Ok((records, report))
    }
}
