use crate::constants::*;
use crate::error::{AnalyticsError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct TransactionColumns {
    #[schemars(description = "Header of the order date-time column. Required.")]
    pub order_date: String,

    #[schemars(description = "Header of the units column. Required.")]
    pub quantity: String,

    #[schemars(description = "Header of the gross bill amount column. Defaults to 0 when absent.")]
    pub gross_amount: String,

    #[schemars(description = "Header of the product name column.")]
    pub product: String,

    #[schemars(description = "Header of the customer state column.")]
    pub state: String,

    #[schemars(description = "Header of the customer city column.")]
    pub city: String,
}

impl Default for TransactionColumns {
    fn default() -> Self {
        Self {
            order_date: COL_ORDER_DATE.to_string(),
            quantity: COL_QUANTITY.to_string(),
            gross_amount: COL_GROSS_AMOUNT.to_string(),
            product: COL_PRODUCT.to_string(),
            state: COL_STATE.to_string(),
            city: COL_CITY.to_string(),
        }
    }
}

impl TransactionColumns {
    /// Columns that must be present for a row to be recognised as the header.
    pub fn required(&self) -> Vec<String> {
        vec![self.order_date.clone(), self.quantity.clone()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct InventoryColumns {
    #[schemars(description = "Header of the item name column. Required.")]
    pub item_name: String,

    #[schemars(description = "Header of the sellable quantity column. Required.")]
    pub sellable: String,

    #[schemars(description = "Header of the incoming scheduled quantity column. Defaults to 0 when absent.")]
    pub incoming: String,

    #[schemars(description = "Header of the units sold over the trailing 30 days. Defaults to 0 when absent.")]
    pub trailing_30day: String,

    #[schemars(
        description = "Sheet scanned before all others. The remaining sheets are scanned in workbook order."
    )]
    pub preferred_sheet: Option<String>,
}

impl Default for InventoryColumns {
    fn default() -> Self {
        Self {
            item_name: COL_ITEM_NAME.to_string(),
            sellable: COL_SELLABLE.to_string(),
            incoming: COL_INCOMING.to_string(),
            trailing_30day: COL_TRAILING_30DAY.to_string(),
            preferred_sheet: Some(DEFAULT_INVENTORY_SHEET.to_string()),
        }
    }
}

impl InventoryColumns {
    pub fn required(&self) -> Vec<String> {
        vec![self.item_name.clone(), self.sellable.clone()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct RankingPolicy {
    #[schemars(description = "How many products by last-day revenue form the pool for growth leaders.")]
    pub revenue_pool: usize,

    #[schemars(description = "How many growth leaders are picked from the revenue pool.")]
    pub growth_leaders: usize,

    #[schemars(description = "Minimum last-day revenue for the last-day performers table.")]
    pub performer_revenue_floor: f64,

    #[schemars(description = "Rows in the top products table.")]
    pub top_products: usize,

    #[schemars(description = "Rows in the top states and top cities tables.")]
    pub top_locations: usize,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            revenue_pool: REVENUE_POOL_SIZE,
            growth_leaders: GROWTH_LEADERS,
            performer_revenue_floor: PERFORMER_REVENUE_FLOOR,
            top_products: TOP_PRODUCTS,
            top_locations: TOP_LOCATIONS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub transactions: TransactionColumns,

    pub inventory: InventoryColumns,

    pub ranking: RankingPolicy,

    #[schemars(description = "Rows scanned from the top of each sheet when locating the header.")]
    pub header_scan_rows: usize,

    #[schemars(description = "Denominator substituted when a daily average is exactly zero.")]
    pub zero_average_denominator: f64,

    pub currency_symbol: String,

    pub summary_title: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            transactions: TransactionColumns::default(),
            inventory: InventoryColumns::default(),
            ranking: RankingPolicy::default(),
            header_scan_rows: HEADER_SCAN_ROWS,
            zero_average_denominator: ZERO_AVERAGE_DENOMINATOR,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            summary_title: DEFAULT_SUMMARY_TITLE.to_string(),
        }
    }
}

impl AnalyticsConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.header_scan_rows == 0 {
            return Err(AnalyticsError::InvalidConfig(
                "header_scan_rows must be at least 1".to_string(),
            ));
        }

        if !self.zero_average_denominator.is_finite() || self.zero_average_denominator == 0.0 {
            return Err(AnalyticsError::InvalidConfig(format!(
                "zero_average_denominator must be finite and non-zero, got {}",
                self.zero_average_denominator
            )));
        }

        if self.ranking.revenue_pool == 0 || self.ranking.growth_leaders == 0 {
            return Err(AnalyticsError::InvalidConfig(
                "revenue_pool and growth_leaders must be at least 1".to_string(),
            ));
        }

        if !self.ranking.performer_revenue_floor.is_finite() {
            return Err(AnalyticsError::InvalidConfig(
                "performer_revenue_floor must be finite".to_string(),
            ));
        }

        let names = [
            ("transactions.order_date", &self.transactions.order_date),
            ("transactions.quantity", &self.transactions.quantity),
            ("inventory.item_name", &self.inventory.item_name),
            ("inventory.sellable", &self.inventory.sellable),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(AnalyticsError::InvalidConfig(format!(
                    "{} must name a column",
                    field
                )));
            }
        }

        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalyticsConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
