// Pure computation over a snapshot of sales records
pub mod aggregation;
pub mod forecasting;

// Request-scoped orchestration: query, aggregate, forecast
pub mod dashboard;

pub use dashboard::{compute_dashboard, Dashboard, DashboardReport, DashboardService};
