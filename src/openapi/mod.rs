use axum::response::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sales Dashboard API",
        version = "0.1.0",
        description = r#"
Key performance indicators, segment breakdowns and a six-month linear-trend
forecast computed from the `sales_data` table.

Figures are recomputed on every request. Each value is returned both raw and
as a display string; charts are described as renderer-agnostic specs.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development")
    ),
    tags(
        (name = "Dashboard", description = "Computed sales dashboard"),
        (name = "Health", description = "Service and database health")
    ),
    paths(
        crate::handlers::dashboard::get_dashboard,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::presentation::DashboardView,
            crate::presentation::view::KpiCard,
            crate::presentation::view::CategoryRow,
            crate::presentation::view::MonthlyRow,
            crate::presentation::view::ForecastRow,
            crate::presentation::view::TrendView,
            crate::presentation::ChartSpec,
            crate::presentation::ChartKind,
            crate::handlers::health::HealthStatus,
            crate::handlers::health::ComponentHealth,
            crate::handlers::health::ComponentStatus,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

/// Serves the generated document at `/api-docs/openapi.json`
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDocV1::openapi())
}
