#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sales_dashboard::{
    config::AppConfig, db, entities::SalesRecordEntity, ingest::SalesRow, AppState,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Application harness backed by a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    /// Fresh, migrated, empty database
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = dir.path().join("sales_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.database.max_connections = 1;
        cfg.database.min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg).expect("failed to build app state");
        let router = sales_dashboard::app_router(state.clone());

        Self {
            router,
            state,
            _dir: dir,
        }
    }

    pub async fn with_sales(rows: Vec<SalesRow>) -> Self {
        let app = Self::new().await;
        app.seed(rows).await;
        app
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    pub async fn seed(&self, rows: Vec<SalesRow>) {
        if rows.is_empty() {
            return;
        }
        SalesRecordEntity::insert_many(rows.into_iter().map(SalesRow::into_active_model))
            .exec(self.db())
            .await
            .expect("failed to seed sales data");
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, _, body) = self.get(uri).await;
        let json = serde_json::from_str(&body)
            .unwrap_or_else(|e| panic!("response for {uri} was not JSON ({e}): {body}"));
        (status, json)
    }

    pub async fn request(
        &self,
        request: Request<Body>,
    ) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router should not fail");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        (status, headers, String::from_utf8_lossy(&bytes).into_owned())
    }
}

pub fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// A row with only the dashboard columns populated
pub fn sale(
    order_number: &str,
    sales: Decimal,
    order_date: NaiveDateTime,
    product_line: &str,
    country: &str,
) -> SalesRow {
    SalesRow {
        order_number: order_number.to_string(),
        quantity_ordered: None,
        price_each: None,
        order_line_number: None,
        sales,
        order_date,
        status: Some("Shipped".to_string()),
        product_line: product_line.to_string(),
        product_code: None,
        customer_name: None,
        city: None,
        country: country.to_string(),
        deal_size: None,
    }
}
