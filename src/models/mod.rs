pub mod sales;

pub use sales::{ForecastPoint, MonthlyBucket, SalesRecord};
