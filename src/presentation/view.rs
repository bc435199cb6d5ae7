use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::DashboardConfig;
use crate::presentation::charts::{self, ChartSpec};
use crate::presentation::format::{
    format_count, format_currency, format_currency_f64, format_month, format_percent,
};
use crate::services::aggregation::CategoryTotal;
use crate::services::forecasting::TrendLine;
use crate::services::Dashboard;

/// One headline figure with its rendered form
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct KpiCard {
    pub label: String,
    pub display: String,
    #[schema(value_type = String)]
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CategoryRow {
    pub label: String,
    #[schema(value_type = String)]
    pub total_sales: Decimal,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlyRow {
    /// `YYYY-MM`
    pub month: String,
    #[schema(value_type = String)]
    pub total_sales: Decimal,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ForecastRow {
    /// `YYYY-MM`
    pub month: String,
    pub month_end: NaiveDate,
    pub predicted_sales: f64,
    pub display: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct TrendView {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: Option<f64>,
}

impl From<TrendLine> for TrendView {
    fn from(trend: TrendLine) -> Self {
        Self {
            slope: trend.slope,
            intercept: trend.intercept,
            r_squared: trend.r_squared,
        }
    }
}

/// Dashboard output ready for a template or a JSON client.
///
/// Every figure is present both raw and as a display string.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardView {
    pub kpis: Vec<KpiCard>,
    /// Assumed margin behind the profit estimate, e.g. `30%`
    pub profit_margin: String,
    pub sales_by_product_line: Vec<CategoryRow>,
    pub sales_by_country: Vec<CategoryRow>,
    pub monthly_sales: Vec<MonthlyRow>,
    pub forecast: Vec<ForecastRow>,
    pub trend: Option<TrendView>,
    pub charts: Vec<ChartSpec>,
    pub record_count: usize,
}

impl DashboardView {
    pub fn build(dashboard: &Dashboard, settings: &DashboardConfig) -> Self {
        let symbol = settings.currency_symbol.as_str();
        let kpis = &dashboard.summary.kpis;
        let forecast = &dashboard.forecast;

        let money_card = |label: &str, value: Decimal| KpiCard {
            label: label.to_string(),
            display: format_currency(symbol, value),
            value,
        };

        Self {
            kpis: vec![
                money_card("Total Revenue", kpis.total_revenue),
                money_card("Estimated Profit", kpis.estimated_profit),
                KpiCard {
                    label: "Total Orders".to_string(),
                    display: format_count(kpis.total_orders),
                    value: Decimal::from(kpis.total_orders),
                },
                money_card("AOV", kpis.average_order_value),
            ],
            profit_margin: format_percent(settings.profit_margin),
            sales_by_product_line: category_rows(symbol, &dashboard.summary.sales_by_product_line),
            sales_by_country: category_rows(symbol, &dashboard.summary.sales_by_country),
            monthly_sales: forecast
                .monthly_sales
                .iter()
                .map(|b| MonthlyRow {
                    month: format_month(b.month_start),
                    total_sales: b.total_sales,
                    display: format_currency(symbol, b.total_sales),
                })
                .collect(),
            forecast: forecast
                .points
                .iter()
                .map(|p| ForecastRow {
                    month: format_month(p.month_end),
                    month_end: p.month_end,
                    predicted_sales: p.predicted_sales,
                    display: format_currency_f64(symbol, p.predicted_sales),
                })
                .collect(),
            trend: forecast.trend.map(TrendView::from),
            charts: vec![
                charts::product_line_chart(&dashboard.summary.sales_by_product_line),
                charts::country_chart(&dashboard.summary.sales_by_country),
                charts::monthly_sales_chart(&forecast.monthly_sales),
                charts::forecast_chart(&forecast.points),
            ],
            record_count: dashboard.record_count,
        }
    }
}

fn category_rows(symbol: &str, totals: &[CategoryTotal]) -> Vec<CategoryRow> {
    totals
        .iter()
        .map(|t| CategoryRow {
            label: t.label.clone(),
            total_sales: t.total_sales,
            display: format_currency(symbol, t.total_sales),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SalesRecord;
    use crate::services::{compute_dashboard, DashboardReport};
    use rust_decimal_macros::dec;

    fn dashboard() -> Dashboard {
        let at = |m: u32| {
            NaiveDate::from_ymd_opt(2003, m, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        let records = vec![
            SalesRecord::new(dec!(1000), at(10), "10100", "Classic Cars", "USA"),
            SalesRecord::new(dec!(1234.5), at(11), "10101", "Motorcycles", "France"),
            SalesRecord::new(dec!(765.5), at(11), "10101", "Classic Cars", "USA"),
        ];
        match compute_dashboard(&records, dec!(0.30)) {
            DashboardReport::Ready(d) => d,
            DashboardReport::NoData => panic!("records were supplied"),
        }
    }

    #[test]
    fn kpi_cards_render_in_dashboard_order() {
        let view = DashboardView::build(&dashboard(), &DashboardConfig::default());

        let cards: Vec<_> = view
            .kpis
            .iter()
            .map(|c| (c.label.as_str(), c.display.as_str()))
            .collect();
        assert_eq!(
            cards,
            vec![
                ("Total Revenue", "$3,000.00"),
                ("Estimated Profit", "$900.00"),
                ("Total Orders", "2"),
                ("AOV", "$1,500.00"),
            ]
        );
        assert_eq!(view.profit_margin, "30%");
    }

    #[test]
    fn tables_and_charts_follow_breakdowns() {
        let view = DashboardView::build(&dashboard(), &DashboardConfig::default());

        assert_eq!(view.sales_by_product_line[0].label, "Classic Cars");
        assert_eq!(view.sales_by_product_line[0].display, "$1,765.50");
        assert_eq!(view.sales_by_country[1].label, "France");
        assert_eq!(view.monthly_sales.len(), 2);
        assert_eq!(view.monthly_sales[1].month, "2003-11");
        assert_eq!(view.forecast.len(), 6);
        assert_eq!(view.forecast[0].month, "2003-12");
        assert_eq!(view.forecast[5].month, "2004-05");
        assert_eq!(view.charts.len(), 4);
        assert_eq!(view.record_count, 3);
    }
}
