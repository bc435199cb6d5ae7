pub mod dashboard;
pub mod health;

pub use dashboard::{dashboard_page, get_dashboard};
pub use health::health_check;
