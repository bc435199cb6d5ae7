//! Turns a computed [`Dashboard`](crate::services::Dashboard) into display
//! strings, chart descriptions and HTML.

pub mod charts;
pub mod format;
pub mod html;
pub mod view;

pub use charts::{ChartKind, ChartSpec};
pub use html::Templates;
pub use view::DashboardView;
