//! Monthly sales trend and short-horizon extrapolation.
//!
//! Records are bucketed by calendar month, each bucket gets its position as
//! the regressor, and an ordinary least-squares line is projected
//! [`FORECAST_HORIZON`] months past the last observed month.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{ForecastPoint, MonthlyBucket, SalesRecord};

/// Number of future months projected
pub const FORECAST_HORIZON: usize = 6;

/// Least-squares line `sales = slope * index + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; `None` when fitted from a single point
    pub r_squared: Option<f64>,
}

impl TrendLine {
    /// Fits `points` as `(x, y)` pairs.
    ///
    /// Returns `None` for no points. A single point yields a flat line through
    /// it, which is also the minimum-norm least-squares solution when the
    /// point sits at `x = 0`.
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        match points {
            [] => None,
            [(_, y)] => Some(Self {
                slope: 0.0,
                intercept: *y,
                r_squared: None,
            }),
            _ => {
                let n = points.len() as f64;
                let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
                let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

                let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
                    let dx = x - mean_x;
                    (sxx + dx * dx, sxy + dx * (y - mean_y))
                });

                if sxx == 0.0 {
                    // All x equal: no slope can be identified
                    return Some(Self {
                        slope: 0.0,
                        intercept: mean_y,
                        r_squared: None,
                    });
                }

                let slope = sxy / sxx;
                let intercept = mean_y - slope * mean_x;

                let ss_tot: f64 = points.iter().map(|p| (p.1 - mean_y).powi(2)).sum();
                let ss_res: f64 = points
                    .iter()
                    .map(|p| (p.1 - (slope * p.0 + intercept)).powi(2))
                    .sum();
                let r_squared = if ss_tot > 0.0 {
                    (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
                } else {
                    1.0
                };

                Some(Self {
                    slope,
                    intercept,
                    r_squared: Some(r_squared),
                })
            }
        }
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Observed history plus the projected months
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesForecast {
    pub monthly_sales: Vec<MonthlyBucket>,
    pub trend: Option<TrendLine>,
    pub points: Vec<ForecastPoint>,
}

impl SalesForecast {
    pub fn empty() -> Self {
        Self {
            monthly_sales: Vec::new(),
            trend: None,
            points: Vec::new(),
        }
    }
}

/// Sums sales per calendar month, oldest first.
///
/// Months without transactions are absent rather than zero.
pub fn monthly_buckets(records: &[SalesRecord]) -> Vec<MonthlyBucket> {
    let mut months: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for record in records {
        let date = record.order_date.date();
        *months.entry((date.year(), date.month())).or_default() += record.sales;
    }

    months
        .into_iter()
        .filter_map(|((year, month), total_sales)| {
            NaiveDate::from_ymd_opt(year, month, 1).map(|month_start| MonthlyBucket {
                month_start,
                total_sales,
            })
        })
        .collect()
}

/// Fits the trend over bucket positions `0..n`
pub fn fit_trend(buckets: &[MonthlyBucket]) -> Option<TrendLine> {
    let points: Vec<(f64, f64)> = buckets
        .iter()
        .enumerate()
        .map(|(i, bucket)| (i as f64, bucket.total_sales.to_f64().unwrap_or_default()))
        .collect();
    TrendLine::fit(&points)
}

/// Buckets, fits and projects [`FORECAST_HORIZON`] month-ends
pub fn forecast(records: &[SalesRecord]) -> SalesForecast {
    let monthly_sales = monthly_buckets(records);
    let (trend, last) = match (fit_trend(&monthly_sales), monthly_sales.last()) {
        (Some(trend), Some(last)) => (trend, *last),
        _ => return SalesForecast::empty(),
    };

    let n = monthly_sales.len();
    let (mut year, mut month) = last.year_month();
    let mut points = Vec::with_capacity(FORECAST_HORIZON);
    for step in 0..FORECAST_HORIZON {
        (year, month) = next_month(year, month);
        let Some(month_end) = last_day_of_month(year, month) else {
            break;
        };
        points.push(ForecastPoint {
            month_end,
            predicted_sales: trend.predict((n + step) as f64),
        });
    }

    SalesForecast {
        monthly_sales,
        trend: Some(trend),
        points,
    }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Calendar month-end, leap years included
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next) = next_month(year, month);
    NaiveDate::from_ymd_opt(next_year, next, 1)?.pred_opt()
}
