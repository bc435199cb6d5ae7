//! Server-rendered dashboard pages.
//!
//! Charts are drawn client-side from the `ChartSpec` list embedded as JSON,
//! so the page and `/api/v1/dashboard` always agree on the numbers.

use std::sync::Arc;

use minijinja::{context, AutoEscape, Environment, Value};

use crate::{errors::ServiceError, presentation::view::DashboardView};

const PAGE_TITLE: &str = "Sales Dashboard";

const BASE_TEMPLATE: &str = "base.html";
const DASHBOARD_TEMPLATE: &str = "dashboard.html";
const NO_DATA_TEMPLATE: &str = "no_data.html";

/// Page templates compiled once at startup and shared across requests
#[derive(Clone)]
pub struct Templates {
    env: Arc<Environment<'static>>,
}

impl Templates {
    pub fn new() -> Result<Self, ServiceError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template(BASE_TEMPLATE, include_str!("../../templates/base.html"))?;
        env.add_template(
            DASHBOARD_TEMPLATE,
            include_str!("../../templates/dashboard.html"),
        )?;
        env.add_template(NO_DATA_TEMPLATE, include_str!("../../templates/no_data.html"))?;

        Ok(Self { env: Arc::new(env) })
    }

    pub fn render_dashboard(&self, view: &DashboardView) -> Result<String, ServiceError> {
        self.render(DASHBOARD_TEMPLATE, context! { title => PAGE_TITLE, view => view })
    }

    /// Shown when the table is empty or the database cannot be reached
    pub fn render_no_data(&self, message: &str) -> Result<String, ServiceError> {
        self.render(
            NO_DATA_TEMPLATE,
            context! { title => PAGE_TITLE, message => message },
        )
    }

    fn render(&self, name: &str, ctx: Value) -> Result<String, ServiceError> {
        let template = self.env.get_template(name)?;
        Ok(template.render(ctx)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::models::SalesRecord;
    use crate::services::{compute_dashboard, DashboardReport};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn view_with_label(label: &str) -> DashboardView {
        let date = NaiveDate::from_ymd_opt(2004, 2, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let records = vec![SalesRecord::new(dec!(1500), date, "1", label, "USA")];
        let DashboardReport::Ready(dashboard) = compute_dashboard(&records, dec!(0.30)) else {
            panic!("expected data");
        };
        DashboardView::build(&dashboard, &DashboardConfig::default())
    }

    #[test]
    fn dashboard_page_contains_cards_tables_and_charts() {
        let templates = Templates::new().unwrap();
        let html = templates
            .render_dashboard(&view_with_label("Planes"))
            .unwrap();

        assert!(html.contains("<title>Sales Dashboard</title>"));
        assert!(html.contains("<h3>Total Revenue</h3><p>$1,500.00</p>"));
        assert!(html.contains("<h3>AOV</h3>"));
        assert!(html.contains("<td>Planes</td><td>$1,500.00</td>"));
        assert!(html.contains("<td>2004-03</td>"));
        assert!(html.contains("id=\"chart-3\""));
        assert!(html.contains("\"kind\":\"line-dashed\""));
    }

    #[test]
    fn labels_cannot_break_out_of_markup() {
        let templates = Templates::new().unwrap();
        let html = templates
            .render_dashboard(&view_with_label("</script><script>alert(1)"))
            .unwrap();

        assert!(!html.contains("</script><script>alert(1)"));
        assert!(html.contains("<td>&lt;"));
        assert!(html.contains("\\u003c/script\\u003e"));
    }

    #[test]
    fn no_data_page_escapes_message() {
        let templates = Templates::new().unwrap();
        let html = templates.render_no_data("table <empty> & idle").unwrap();

        assert!(html.contains("No sales data available"));
        assert!(html.contains("table &lt;empty&gt; &amp; idle"));
    }
}
