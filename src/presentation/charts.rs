use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{ForecastPoint, MonthlyBucket};
use crate::presentation::format::format_month;
use crate::services::aggregation::CategoryTotal;

/// How a series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Line,
    LineDashed,
    Bar,
}

/// A renderer-agnostic chart description
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSpec {
    fn new(kind: ChartKind, title: &str, x_label: &str, y_label: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            labels: Vec::new(),
            values: Vec::new(),
        }
    }

    fn with_points(mut self, points: impl IntoIterator<Item = (String, f64)>) -> Self {
        let (labels, values): (Vec<String>, Vec<f64>) = points.into_iter().unzip();
        self.labels = labels;
        self.values = values;
        self
    }
}

pub fn product_line_chart(totals: &[CategoryTotal]) -> ChartSpec {
    category_chart("Sales by Product Line", "Product Line", totals)
}

pub fn country_chart(totals: &[CategoryTotal]) -> ChartSpec {
    category_chart("Top 10 Countries by Sales", "Country", totals)
}

fn category_chart(title: &str, x_label: &str, totals: &[CategoryTotal]) -> ChartSpec {
    ChartSpec::new(ChartKind::Bar, title, x_label, "Total Sales").with_points(
        totals
            .iter()
            .map(|t| (t.label.clone(), t.total_sales.to_f64().unwrap_or_default())),
    )
}

pub fn monthly_sales_chart(buckets: &[MonthlyBucket]) -> ChartSpec {
    ChartSpec::new(ChartKind::Line, "Monthly Sales", "Month", "Total Sales").with_points(
        buckets.iter().map(|b| {
            (
                format_month(b.month_start),
                b.total_sales.to_f64().unwrap_or_default(),
            )
        }),
    )
}

pub fn forecast_chart(points: &[ForecastPoint]) -> ChartSpec {
    ChartSpec::new(
        ChartKind::LineDashed,
        "6-Month Sales Forecast",
        "Month",
        "Forecasted Sales",
    )
    .with_points(
        points
            .iter()
            .map(|p| (format_month(p.month_end), p.predicted_sales)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn kinds_serialize_as_renderer_names() {
        let names: Vec<_> = [ChartKind::Line, ChartKind::LineDashed, ChartKind::Bar]
            .iter()
            .map(|k| serde_json::to_value(k).unwrap())
            .collect();
        assert_eq!(names, vec!["line", "line-dashed", "bar"]);
    }

    #[test]
    fn category_chart_keeps_breakdown_order() {
        let totals = vec![
            CategoryTotal {
                label: "USA".into(),
                total_sales: dec!(3600.5),
            },
            CategoryTotal {
                label: "Spain".into(),
                total_sales: dec!(1200.25),
            },
        ];

        let chart = country_chart(&totals);
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.labels, vec!["USA", "Spain"]);
        assert_eq!(chart.values, vec![3600.5, 1200.25]);
    }

    #[test]
    fn forecast_chart_is_dashed_with_month_labels() {
        let points = vec![ForecastPoint {
            month_end: NaiveDate::from_ymd_opt(2005, 6, 30).unwrap(),
            predicted_sales: 512.25,
        }];

        let chart = forecast_chart(&points);
        assert_eq!(chart.kind, ChartKind::LineDashed);
        assert_eq!(chart.labels, vec!["2005-06"]);
        assert_eq!(chart.values, vec![512.25]);
    }
}
