//! KPI and segment computation over the sales records of one request.
//!
//! Everything here is a single pass over a borrowed slice; nothing is cached
//! between requests.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::models::SalesRecord;

/// Only the strongest countries are shown; the rest are dropped, not merged
pub const TOP_COUNTRIES: usize = 10;

/// Summed sales for one category label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub label: String,
    pub total_sales: Decimal,
}

/// Headline figures for the dashboard cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesKpis {
    pub total_revenue: Decimal,
    pub estimated_profit: Decimal,
    pub total_orders: u64,
    pub average_order_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    pub kpis: SalesKpis,
    pub sales_by_product_line: Vec<CategoryTotal>,
    pub sales_by_country: Vec<CategoryTotal>,
}

/// Computes KPIs and both breakdowns
pub fn summarize(records: &[SalesRecord], profit_margin: Decimal) -> SalesSummary {
    let mut sales_by_country = sales_by(records, |r| r.country.as_str());
    sales_by_country.truncate(TOP_COUNTRIES);

    SalesSummary {
        kpis: compute_kpis(records, profit_margin),
        sales_by_product_line: sales_by(records, |r| r.product_line.as_str()),
        sales_by_country,
    }
}

/// Revenue, estimated profit, distinct orders and average order value
pub fn compute_kpis(records: &[SalesRecord], profit_margin: Decimal) -> SalesKpis {
    let mut total_revenue = Decimal::ZERO;
    let mut orders: HashSet<&str> = HashSet::new();

    for record in records {
        total_revenue += record.sales;
        orders.insert(record.order_number.as_str());
    }

    let total_orders = orders.len() as u64;
    let average_order_value = if total_orders > 0 {
        total_revenue / Decimal::from(total_orders)
    } else {
        Decimal::ZERO
    };

    SalesKpis {
        total_revenue,
        estimated_profit: total_revenue * profit_margin,
        total_orders,
        average_order_value,
    }
}

/// Groups sales by the label `key` extracts, largest total first.
///
/// Equal totals keep the order in which their labels first appeared.
pub fn sales_by<'a, F>(records: &'a [SalesRecord], key: F) -> Vec<CategoryTotal>
where
    F: Fn(&'a SalesRecord) -> &'a str,
{
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for record in records {
        let label = key(record);
        let slot = *slots.entry(label).or_insert_with(|| {
            totals.push(CategoryTotal {
                label: label.to_string(),
                total_sales: Decimal::ZERO,
            });
            totals.len() - 1
        });
        totals[slot].total_sales += record.sales;
    }

    // sort_by is stable
    totals.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));
    totals
}
