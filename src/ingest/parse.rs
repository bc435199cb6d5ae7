//! CSV decoding and row normalization for the sales export.
//!
//! Rows missing a required value are skipped and reported as [`RowError`]s;
//! a file missing a required column fails outright.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::{NotSet, Set};

use crate::entities::SalesRecordActiveModel;
use crate::errors::ServiceError;

/// Columns every row must carry a value for
pub const REQUIRED_COLUMNS: [&str; 3] = ["order_number", "order_date", "sales"];

const HEADER_RENAMES: [(&str, &str); 9] = [
    ("ordernumber", "order_number"),
    ("orderdate", "order_date"),
    ("productline", "product_line"),
    ("dealsize", "deal_size"),
    ("quantityordered", "quantity_ordered"),
    ("priceeach", "price_each"),
    ("orderlinenumber", "order_line_number"),
    ("productcode", "product_code"),
    ("customername", "customer_name"),
];

const DATETIME_FORMATS: [&str; 4] = [
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// A row that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based file line, header included
    pub line: usize,
    pub order_number: Option<String>,
    pub message: String,
}

/// One validated row, ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRow {
    pub order_number: String,
    pub quantity_ordered: Option<i32>,
    pub price_each: Option<Decimal>,
    pub order_line_number: Option<i32>,
    pub sales: Decimal,
    pub order_date: NaiveDateTime,
    pub status: Option<String>,
    pub product_line: String,
    pub product_code: Option<String>,
    pub customer_name: Option<String>,
    pub city: Option<String>,
    pub country: String,
    pub deal_size: Option<String>,
}

impl SalesRow {
    pub fn into_active_model(self) -> SalesRecordActiveModel {
        SalesRecordActiveModel {
            id: NotSet,
            order_number: Set(self.order_number),
            quantity_ordered: Set(self.quantity_ordered),
            price_each: Set(self.price_each),
            order_line_number: Set(self.order_line_number),
            sales: Set(self.sales),
            order_date: Set(self.order_date),
            status: Set(self.status),
            product_line: Set(self.product_line),
            product_code: Set(self.product_code),
            customer_name: Set(self.customer_name),
            city: Set(self.city),
            country: Set(self.country),
            deal_size: Set(self.deal_size),
        }
    }
}

/// Parse output: accepted rows plus what was skipped and why
#[derive(Debug, Clone, Default)]
pub struct ParsedSales {
    pub rows: Vec<SalesRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Lowercases, drops everything outside `[a-z0-9_]`, then applies the
/// known renames so `ORDERNUMBER` and `Order Number` both become
/// `order_number`.
pub fn normalize_header(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect();

    HEADER_RENAMES
        .iter()
        .find(|(from, _)| *from == cleaned)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or(cleaned)
}

/// Decodes UTF-8, falling back to Latin-1 for exports written by
/// spreadsheet tools.
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}

/// Accepts `M/D/YYYY H:MM`, ISO date-times and bare dates (at midnight)
pub fn parse_order_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

pub fn read_sales_csv(path: &Path) -> Result<ParsedSales, ServiceError> {
    let bytes = std::fs::read(path).map_err(|e| {
        ServiceError::Ingest(format!("failed to open CSV '{}': {e}", path.display()))
    })?;
    parse_sales_csv(&decode_text(bytes))
}

pub fn parse_sales_csv(text: &str) -> Result<ParsedSales, ServiceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::new(&headers);

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| !columns.contains(name))
        .collect();
    if !missing.is_empty() {
        return Err(ServiceError::Ingest(format!(
            "CSV is missing required column(s): {}",
            missing.join(", ")
        )));
    }

    let mut parsed = ParsedSales::default();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        parsed.rows_read += 1;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                parsed.row_errors.push(RowError {
                    line,
                    order_number: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match columns.row(&record) {
            Ok(row) => parsed.rows.push(row),
            Err(message) => parsed.row_errors.push(RowError {
                line,
                order_number: columns.text(&record, "order_number"),
                message,
            }),
        }
    }

    Ok(parsed)
}

struct ColumnMap {
    index: HashMap<String, usize>,
}

impl ColumnMap {
    fn new(headers: &StringRecord) -> Self {
        let mut index = HashMap::new();
        for (i, raw) in headers.iter().enumerate() {
            // First occurrence wins on duplicate names
            index.entry(normalize_header(raw)).or_insert(i);
        }
        Self { index }
    }

    fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn text(&self, record: &StringRecord, name: &str) -> Option<String> {
        self.index
            .get(name)
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn parsed<T: FromStr>(&self, record: &StringRecord, name: &str) -> Option<T> {
        self.text(record, name).and_then(|v| v.parse().ok())
    }

    fn row(&self, record: &StringRecord) -> Result<SalesRow, String> {
        let order_number = self
            .text(record, "order_number")
            .ok_or_else(|| "missing order_number".to_string())?;

        let raw_sales = self
            .text(record, "sales")
            .ok_or_else(|| "missing sales".to_string())?;
        let sales = parse_amount(&raw_sales).ok_or_else(|| format!("invalid sales '{raw_sales}'"))?;

        let raw_date = self
            .text(record, "order_date")
            .ok_or_else(|| "missing order_date".to_string())?;
        let order_date =
            parse_order_date(&raw_date).ok_or_else(|| format!("invalid order_date '{raw_date}'"))?;

        Ok(SalesRow {
            order_number,
            quantity_ordered: self.parsed(record, "quantity_ordered"),
            price_each: self
                .text(record, "price_each")
                .and_then(|v| parse_amount(&v)),
            order_line_number: self.parsed(record, "order_line_number"),
            sales,
            order_date,
            status: self.text(record, "status"),
            product_line: self.text(record, "product_line").unwrap_or_default(),
            product_code: self.text(record, "product_code"),
            customer_name: self.text(record, "customer_name"),
            city: self.text(record, "city"),
            country: self.text(record, "country").unwrap_or_default(),
            deal_size: self.text(record, "deal_size"),
        })
    }
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
