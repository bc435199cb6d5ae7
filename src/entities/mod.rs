pub mod sales_record;

pub use sales_record::{
    ActiveModel as SalesRecordActiveModel, Entity as SalesRecordEntity, Model as SalesRecordModel,
};
