mod common;

use std::io::Write;
use std::time::Duration;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::TestApp;
use sales_dashboard::{
    db::{self, DbConfig},
    entities::SalesRecordEntity,
    errors::ServiceError,
    ingest,
    middleware_helpers::RetryConfig,
};
use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder};
use tempfile::NamedTempFile;

const HEADER: &[u8] = b"ORDERNUMBER,QUANTITYORDERED,PRICEEACH,ORDERLINENUMBER,SALES,ORDERDATE,STATUS,PRODUCTLINE,PRODUCTCODE,CUSTOMERNAME,CITY,COUNTRY,DEALSIZE\n";

fn csv_file(rows: &[&[u8]]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp csv");
    file.write_all(HEADER).unwrap();
    for row in rows {
        file.write_all(row).unwrap();
        file.write_all(b"\n").unwrap();
    }
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn loads_valid_rows_and_skips_bad_ones() {
    let app = TestApp::new().await;
    let file = csv_file(&[
        b"10107,30,95.5,2,2865,2/24/2003 0:00,Shipped,Motorcycles,S10_1678,Land of Toys Inc.,NYC,USA,Medium",
        // Latin-1 encoded customer name
        b"10121,34,81.5,5,2771,5/7/2003 0:00,Shipped,Motorcycles,S10_1678,Caf\xe9 Collectables,Reims,France,Medium",
        b"10134,41,94.75,2,,7/1/2003 0:00,Shipped,Motorcycles,S10_1678,Lyon Souveniers,Paris,France,Medium",
        b"10145,45,83.25,6,3746.25,8/25/2003 0:00,Shipped,Classic Cars,S10_1949,Toys4GrownUps.com,Pasadena,USA,Medium",
    ]);

    let summary = ingest::load_csv(app.db(), file.path(), 2).await.unwrap();
    assert_eq!(summary.rows_read, 4);
    assert_eq!(summary.rows_inserted, 3);
    assert_eq!(summary.rows_skipped, 1);

    let stored = SalesRecordEntity::find()
        .order_by_asc(sales_dashboard::entities::sales_record::Column::Id)
        .all(app.db())
        .await
        .unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].order_number, "10107");
    assert_eq!(stored[0].quantity_ordered, Some(30));
    assert_eq!(stored[1].customer_name.as_deref(), Some("Café Collectables"));
    assert_eq!(stored[2].product_line, "Classic Cars");
    assert_eq!(stored[2].deal_size.as_deref(), Some("Medium"));

    let (status, body) = app.get_json("/api/v1/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["kpis"][0]["display"], "$9,382.25");
    assert_eq!(body["data"]["kpis"][2]["display"], "3");
}

#[tokio::test]
async fn reloading_replaces_previous_contents() {
    let app = TestApp::new().await;
    let first = csv_file(&[
        b"1,1,1,1,100,1/1/2004 0:00,Shipped,Ships,P1,A,X,USA,Small",
        b"2,1,1,1,200,2/1/2004 0:00,Shipped,Ships,P1,A,X,USA,Small",
    ]);
    let second = csv_file(&[b"3,1,1,1,50,3/1/2004 0:00,Shipped,Planes,P2,B,Y,Spain,Small"]);

    ingest::load_csv(app.db(), first.path(), 500).await.unwrap();
    ingest::load_csv(app.db(), second.path(), 500).await.unwrap();

    let count = SalesRecordEntity::find().count(app.db()).await.unwrap();
    assert_eq!(count, 1);

    let (_, body) = app.get_json("/api/v1/dashboard").await;
    assert_eq!(body["data"]["kpis"][0]["display"], "$50.00");
    assert_eq!(body["data"]["sales_by_country"][0]["label"], "Spain");
}

#[tokio::test]
async fn missing_required_column_leaves_table_untouched() {
    let app = TestApp::new().await;
    let good = csv_file(&[b"1,1,1,1,100,1/1/2004 0:00,Shipped,Ships,P1,A,X,USA,Small"]);
    ingest::load_csv(app.db(), good.path(), 500).await.unwrap();

    let mut bad = NamedTempFile::new().unwrap();
    bad.write_all(b"ORDERNUMBER,ORDERDATE\n1,1/1/2004 0:00\n").unwrap();
    bad.flush().unwrap();

    let err = ingest::load_csv(app.db(), bad.path(), 500).await.unwrap_err();
    assert_matches!(err, ServiceError::Ingest(_));

    let count = SalesRecordEntity::find().count(app.db()).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn missing_file_is_an_ingest_error() {
    let app = TestApp::new().await;
    let dir = tempfile::tempdir().unwrap();

    let err = ingest::load_csv(app.db(), &dir.path().join("absent.csv"), 500)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Ingest(msg) if msg.contains("absent.csv"));
}

#[tokio::test]
async fn exhausted_connection_retries_are_service_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig {
        // Parent directory does not exist and mode=rwc cannot create it
        url: format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("missing").join("sales.db").display()
        ),
        connect_timeout: Duration::from_secs(1),
        acquire_timeout: Duration::from_secs(1),
        ..DbConfig::default()
    };

    let err = db::connect_with_retry(&config, &RetryConfig::fixed(2, Duration::ZERO))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::ServiceUnavailable(msg) if msg == "failed to connect to database"
    );
}
