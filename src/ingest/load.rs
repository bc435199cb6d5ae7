use std::path::Path;
use std::time::Instant;

use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use tracing::{info, instrument, warn};

use crate::entities::SalesRecordEntity;
use crate::errors::ServiceError;
use crate::ingest::parse::{read_sales_csv, SalesRow};

/// Outcome of one loader run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows_read: usize,
    pub rows_inserted: usize,
    pub rows_skipped: usize,
}

/// Replaces the whole `sales_data` table with `rows`.
///
/// Runs in one transaction: readers see either the old table or the new one.
pub async fn replace_sales_data(
    db: &DatabaseConnection,
    rows: Vec<SalesRow>,
    batch_size: usize,
) -> Result<usize, ServiceError> {
    let batch_size = batch_size.max(1);
    let txn = db.begin().await?;

    let deleted = SalesRecordEntity::delete_many().exec(&txn).await?;
    info!(rows = deleted.rows_affected, "Cleared existing sales data");

    let total = rows.len();
    let mut rows = rows.into_iter().peekable();
    let mut batches = 0usize;
    while rows.peek().is_some() {
        let batch: Vec<_> = rows
            .by_ref()
            .take(batch_size)
            .map(SalesRow::into_active_model)
            .collect();
        SalesRecordEntity::insert_many(batch).exec(&txn).await?;
        batches += 1;
    }

    txn.commit().await?;
    info!(rows = total, batches, "Inserted sales data");
    Ok(total)
}

/// Parses `csv_path` and replaces the table with the valid rows
#[instrument(skip(db), fields(csv = %csv_path.display()))]
pub async fn load_csv(
    db: &DatabaseConnection,
    csv_path: &Path,
    batch_size: usize,
) -> Result<LoadSummary, ServiceError> {
    let start = Instant::now();
    let parsed = read_sales_csv(csv_path)?;

    for row_error in &parsed.row_errors {
        warn!(
            line = row_error.line,
            order_number = row_error.order_number.as_deref().unwrap_or("-"),
            "Skipping row: {}",
            row_error.message
        );
    }

    let rows_skipped = parsed.row_errors.len();
    let rows_inserted = replace_sales_data(db, parsed.rows, batch_size).await?;

    info!(
        rows_read = parsed.rows_read,
        rows_inserted,
        rows_skipped,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Sales data loaded"
    );

    Ok(LoadSummary {
        rows_read: parsed.rows_read,
        rows_inserted,
        rows_skipped,
    })
}
