use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One sales line from the transaction export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub order_timestamp: NaiveDateTime,
    pub product_name: String,
    pub customer_state: String,
    pub customer_city: String,
    pub quantity: f64,
    pub gross_amount: f64,
}

impl TransactionRecord {
    /// Calendar date of the order, time of day discarded.
    pub fn calendar_date(&self) -> NaiveDate {
        self.order_timestamp.date()
    }
}

/// One stock line from the inventory export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub item_name: String,
    pub sellable_quantity: f64,
    pub incoming_quantity: f64,
    pub trailing_30day_quantity: f64,
}

/// Categorical key used for leaderboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupingDimension {
    Product,
    State,
    City,
}

impl GroupingDimension {
    pub fn key<'r>(&self, record: &'r TransactionRecord) -> &'r str {
        match self {
            GroupingDimension::Product => &record.product_name,
            GroupingDimension::State => &record.customer_state,
            GroupingDimension::City => &record.customer_city,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GroupingDimension::Product => "Product",
            GroupingDimension::State => "State",
            GroupingDimension::City => "City",
        }
    }
}
