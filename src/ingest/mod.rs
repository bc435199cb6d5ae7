//! One-shot CSV import into the `sales_data` table.

pub mod load;
pub mod parse;

pub use load::{load_csv, replace_sales_data, LoadSummary};
pub use parse::{normalize_header, parse_order_date, read_sales_csv, ParsedSales, RowError, SalesRow};
