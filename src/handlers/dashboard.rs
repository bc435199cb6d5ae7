use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use tracing::error;

use crate::{
    errors::ServiceError,
    presentation::DashboardView,
    services::DashboardReport,
    ApiResponse, AppState,
};

pub const NO_DATA_MESSAGE: &str = "no sales data available";

const EMPTY_TABLE_HINT: &str = "The sales table is empty or lacks the expected columns. \
Run the load-sales command to import a CSV export.";
const UNREACHABLE_HINT: &str = "The sales database could not be reached. Try again shortly.";

/// Server-rendered dashboard.
///
/// Falls back to the "no data" page for an empty table (200) and for an
/// unreachable store (503).
pub async fn dashboard_page(State(state): State<AppState>) -> Response {
    let service = state.dashboard_service();

    let page = match service.build().await {
        Ok(DashboardReport::Ready(dashboard)) => {
            let view = DashboardView::build(&dashboard, service.settings());
            state
                .templates
                .render_dashboard(&view)
                .map(|html| (StatusCode::OK, html))
        }
        Ok(DashboardReport::NoData) => state
            .templates
            .render_no_data(EMPTY_TABLE_HINT)
            .map(|html| (StatusCode::OK, html)),
        Err(err) => {
            error!(error = %err, "Dashboard page could not be built");
            let message = match &err {
                ServiceError::DatabaseError(_) | ServiceError::ServiceUnavailable(_) => {
                    UNREACHABLE_HINT
                }
                _ => "The dashboard could not be computed.",
            };
            state
                .templates
                .render_no_data(message)
                .map(|html| (err.status_code(), html))
        }
    };

    match page {
        Ok((status, html)) => (status, Html(html)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Dashboard figures, display strings and chart specs as JSON
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard computed; `data` is null when the table is empty", body = ApiResponse<DashboardView>),
        (status = 503, description = "Sales database unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "Dashboard"
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardView>>, ServiceError> {
    let service = state.dashboard_service();

    let response = match service.build().await? {
        DashboardReport::Ready(dashboard) => {
            ApiResponse::success(DashboardView::build(&dashboard, service.settings()))
        }
        DashboardReport::NoData => ApiResponse::empty(NO_DATA_MESSAGE.to_string()),
    };
    Ok(Json(response))
}
