use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One transaction line of the `sales_data` fact table
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub order_number: String,
    pub quantity_ordered: Option<i32>,
    pub price_each: Option<Decimal>,
    pub order_line_number: Option<i32>,
    pub sales: Decimal,
    pub order_date: DateTime,
    pub status: Option<String>,
    pub product_line: String,
    pub product_code: Option<String>,
    pub customer_name: Option<String>,
    pub city: Option<String>,
    pub country: String,
    pub deal_size: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
