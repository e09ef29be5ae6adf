//! Business policy and default column names.
//!
//! Every number that changes what ends up on a leaderboard lives here so that tuning
//! and tests target one place each.

/// Rows scanned from the top of each sheet when looking for a header.
pub const HEADER_SCAN_ROWS: usize = 10;

/// Denominator used in place of a daily average that is exactly zero.
///
/// With this substitution a zero average yields a "ratio" numerically equal to the
/// last-period value. That is a known quirk of the growth figure, kept on purpose so
/// undefined values never reach the rankings.
pub const ZERO_AVERAGE_DENOMINATOR: f64 = 1.0;

/// Size of the revenue pool the growth leaders are drawn from.
pub const REVENUE_POOL_SIZE: usize = 12;

/// Number of growth leaders reported from within the revenue pool.
pub const GROWTH_LEADERS: usize = 5;

/// Minimum last-day revenue for a product to count as a last-day performer.
pub const PERFORMER_REVENUE_FLOOR: f64 = 1000.0;

/// Rows in the top products table.
pub const TOP_PRODUCTS: usize = 20;

/// Rows in the top states and top cities tables.
pub const TOP_LOCATIONS: usize = 10;

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";
pub const DEFAULT_SUMMARY_TITLE: &str = "EXECUTIVE SUMMARY";

pub const COL_ORDER_DATE: &str = "Order Date";
pub const COL_QUANTITY: &str = "Quantity";
pub const COL_GROSS_AMOUNT: &str = "Total Gross Bill Amount";
pub const COL_PRODUCT: &str = "Product Name";
pub const COL_STATE: &str = "Customer State";
pub const COL_CITY: &str = "Customer City";

pub const COL_ITEM_NAME: &str = "Item Name";
pub const COL_SELLABLE: &str = "Total sellable";
pub const COL_INCOMING: &str = "Incoming scheduled inventory";
pub const COL_TRAILING_30DAY: &str = "Last 30 days";

/// Sheet the inventory export normally lives on.
pub const DEFAULT_INVENTORY_SHEET: &str = "raw";

/// Key used for the whole-period row of a comparison.
pub const OVERALL_KEY: &str = "ALL";
