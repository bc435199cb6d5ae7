use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

/// One transaction line as consumed by the dashboard pipeline.
///
/// Rows with a null `sales`, `order_date` or `order_number` never reach this
/// type: the loader rejects them and the table declares them `NOT NULL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct SalesRecord {
    pub sales: Decimal,
    pub order_date: NaiveDateTime,
    pub order_number: String,
    pub product_line: String,
    pub country: String,
}

impl SalesRecord {
    pub fn new(
        sales: Decimal,
        order_date: NaiveDateTime,
        order_number: impl Into<String>,
        product_line: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            sales,
            order_date,
            order_number: order_number.into(),
            product_line: product_line.into(),
            country: country.into(),
        }
    }
}

/// Summed sales for one calendar month that has at least one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    /// First day of the month
    pub month_start: NaiveDate,
    pub total_sales: Decimal,
}

impl MonthlyBucket {
    pub fn year_month(&self) -> (i32, u32) {
        (self.month_start.year(), self.month_start.month())
    }
}

/// Extrapolated sales for a month after the observed range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Last day of the forecast month
    pub month_end: NaiveDate,
    pub predicted_sales: f64,
}
