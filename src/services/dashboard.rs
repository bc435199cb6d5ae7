use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    config::DashboardConfig,
    db,
    errors::ServiceError,
    models::SalesRecord,
    services::{
        aggregation::{self, SalesSummary},
        forecasting::{self, SalesForecast},
    },
};

/// Everything the dashboard shows for one non-empty dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub summary: SalesSummary,
    pub forecast: SalesForecast,
    pub record_count: usize,
}

/// Outcome of one dashboard computation
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardReport {
    /// The store returned no rows, or the table lacks the columns the
    /// dashboard reads
    NoData,
    Ready(Dashboard),
}

/// Runs aggregation then forecasting over one snapshot of records
pub fn compute_dashboard(records: &[SalesRecord], profit_margin: Decimal) -> DashboardReport {
    if records.is_empty() {
        return DashboardReport::NoData;
    }

    DashboardReport::Ready(Dashboard {
        summary: aggregation::summarize(records, profit_margin),
        forecast: forecasting::forecast(records),
        record_count: records.len(),
    })
}

/// Loads the sales table and recomputes the dashboard on every call
#[derive(Clone)]
pub struct DashboardService {
    db: Arc<DatabaseConnection>,
    settings: DashboardConfig,
}

impl DashboardService {
    pub fn new(db: Arc<DatabaseConnection>, settings: DashboardConfig) -> Self {
        Self { db, settings }
    }

    pub fn settings(&self) -> &DashboardConfig {
        &self.settings
    }

    #[instrument(skip(self))]
    pub async fn build(&self) -> Result<DashboardReport, ServiceError> {
        let records = match db::fetch_sales_records(&self.db).await {
            Ok(records) => records,
            Err(ServiceError::DatabaseError(err)) if db::is_schema_mismatch(&err) => {
                warn!(error = %err, "Sales table does not have the expected columns");
                return Ok(DashboardReport::NoData);
            }
            Err(err) => return Err(err),
        };
        let report = compute_dashboard(&records, self.settings.profit_margin);

        match &report {
            DashboardReport::NoData => info!("No sales data available"),
            DashboardReport::Ready(dashboard) => info!(
                records = dashboard.record_count,
                months = dashboard.forecast.monthly_sales.len(),
                "Dashboard computed"
            ),
        }
        Ok(report)
    }
}
