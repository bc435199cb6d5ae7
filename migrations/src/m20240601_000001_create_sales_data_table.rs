use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        manager
            .create_table(
                Table::create()
                    .table(SalesData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SalesData::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SalesData::OrderNumber).string().not_null())
                    .col(ColumnDef::new(SalesData::QuantityOrdered).integer().null())
                    .col(money(ColumnDef::new(SalesData::PriceEach), backend).null())
                    .col(ColumnDef::new(SalesData::OrderLineNumber).integer().null())
                    .col(money(ColumnDef::new(SalesData::Sales), backend).not_null())
                    .col(ColumnDef::new(SalesData::OrderDate).date_time().not_null())
                    .col(ColumnDef::new(SalesData::Status).string().null())
                    .col(
                        ColumnDef::new(SalesData::ProductLine)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(SalesData::ProductCode).string().null())
                    .col(ColumnDef::new(SalesData::CustomerName).string().null())
                    .col(ColumnDef::new(SalesData::City).string().null())
                    .col(
                        ColumnDef::new(SalesData::Country)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(SalesData::DealSize).string().null())
                    .to_owned(),
            )
            .await?;

        // Monthly bucketing scans by date
        manager
            .create_index(
                Index::create()
                    .name("idx_sales_data_order_date")
                    .table(SalesData::Table)
                    .col(SalesData::OrderDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SalesData::Table).to_owned())
            .await
    }
}

// SQLite gives DECIMAL columns NUMERIC affinity, which stores whole amounts as
// INTEGER; REAL keeps every amount readable as a float.
fn money(mut column: ColumnDef, backend: DbBackend) -> ColumnDef {
    match backend {
        DbBackend::Sqlite => column.double(),
        _ => column.decimal_len(16, 4),
    };
    column
}

#[derive(DeriveIden)]
pub enum SalesData {
    Table,
    Id,
    OrderNumber,
    QuantityOrdered,
    PriceEach,
    OrderLineNumber,
    Sales,
    OrderDate,
    Status,
    ProductLine,
    ProductCode,
    CustomerName,
    City,
    Country,
    DealSize,
}
