//! CSV serialization of assembled reports.
//!
//! `export_csv` produces the sectioned at-a-glance sheet (summary,
//! daily trends, payment methods), a deliberately lossy export;
//! itemized detail goes through `export_orders_csv` instead.

use std::borrow::Cow;

use orderscope_core::AnalyticsError;

use crate::report::SalesReport;

/// Sanitize a CSV field value against formula injection.
///
/// Spreadsheet apps (Excel, Google Sheets, LibreOffice) interpret
/// values that begin with `=`, `+`, `-`, `@`, TAB, or CR as formula
/// expressions. Prepending a single quote (`'`) makes them read the
/// value as a literal string.
fn sanitize_csv_field(val: &str) -> Cow<'_, str> {
    if val.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        Cow::Owned(format!("'{val}"))
    } else {
        Cow::Borrowed(val)
    }
}

/// Sectioned report CSV. Layout is fixed for downstream compatibility:
///
/// ```text
/// Sales Report,<title>
/// Period,"<start> to <end>"
/// Generated,<timestamp>
///
/// SUMMARY
/// Metric,Value
/// ...
///
/// DAILY TRENDS
/// Date,Revenue,Orders,Average Order Value
/// ...
///
/// PAYMENT METHODS
/// Method,Orders,Revenue,Average Order Value,Conversion Rate
/// ...
/// ```
pub fn export_csv(report: &SalesReport) -> Result<String, AnalyticsError> {
    ensure_finite(report)?;

    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("Sales Report,{}", sanitize_csv_field(&report.title)));
    lines.push(format!(
        "Period,\"{} to {}\"",
        report.period.start.format("%Y-%m-%d"),
        report.period.end.format("%Y-%m-%d")
    ));
    lines.push(format!(
        "Generated,{}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push(String::new());

    lines.push("SUMMARY".to_string());
    lines.push("Metric,Value".to_string());
    lines.push(format!("Total Revenue,{:.2}", report.summary.total_revenue));
    lines.push(format!("Total Orders,{}", report.summary.total_orders));
    lines.push(format!(
        "Average Order Value,{:.2}",
        report.summary.average_order_value
    ));
    lines.push(format!("Total Items,{}", report.summary.total_items));
    lines.push(format!(
        "Unique Customers,{}",
        report.summary.unique_customers
    ));
    lines.push(String::new());

    lines.push("DAILY TRENDS".to_string());
    lines.push("Date,Revenue,Orders,Average Order Value".to_string());
    for bucket in &report.trends {
        lines.push(format!(
            "{},{:.2},{},{:.2}",
            bucket.period, bucket.total_revenue, bucket.order_count, bucket.average_order_value
        ));
    }
    lines.push(String::new());

    lines.push("PAYMENT METHODS".to_string());
    lines.push("Method,Orders,Revenue,Average Order Value,Conversion Rate".to_string());
    for method in &report.breakdown.payment_methods {
        lines.push(format!(
            "{},{},{:.2},{:.2},{:.2}%",
            sanitize_csv_field(&method.method),
            method.order_count,
            method.total_revenue,
            method.average_order_value,
            method.conversion_rate
        ));
    }

    Ok(lines.join("\n"))
}

/// Itemized order rows of a detailed report as a flat CSV.
pub fn export_orders_csv(report: &SalesReport) -> Result<Vec<u8>, AnalyticsError> {
    let details = report.details.as_ref().ok_or_else(|| {
        AnalyticsError::Export(
            "report has no itemized details; generate it with include_details".to_string(),
        )
    })?;

    let mut wtr = csv::Writer::from_writer(Vec::with_capacity(
        details.orders.len().saturating_mul(128),
    ));
    wtr.write_record([
        "order_id",
        "customer_email",
        "customer_name",
        "total",
        "payment_method",
        "shipping_method",
        "city",
        "state",
        "placed_at",
    ])
    .map_err(|e| AnalyticsError::Export(format!("csv write_record failed: {e}")))?;

    for row in &details.orders {
        let id = sanitize_csv_field(&row.id);
        let customer_id = sanitize_csv_field(&row.customer_id);
        let customer_name = sanitize_csv_field(&row.customer_name);
        let total = format!("{:.2}", row.total);
        let payment_method = sanitize_csv_field(&row.payment_method);
        let shipping_method = sanitize_csv_field(&row.shipping_method);
        let city = sanitize_csv_field(&row.city);
        let state = sanitize_csv_field(&row.state);
        let placed_at = row.placed_at.format("%Y-%m-%d %H:%M:%S").to_string();

        wtr.write_record([
            id.as_ref(),
            customer_id.as_ref(),
            customer_name.as_ref(),
            total.as_str(),
            payment_method.as_ref(),
            shipping_method.as_ref(),
            city.as_ref(),
            state.as_ref(),
            placed_at.as_str(),
        ])
        .map_err(|e| AnalyticsError::Export(format!("csv write_record failed: {e}")))?;
    }

    wtr.into_inner()
        .map_err(|e| AnalyticsError::Export(format!("csv flush failed: {e}")))
}

/// A non-finite number in a report means an upstream guard was
/// bypassed; refuse to format it into a business document.
fn ensure_finite(report: &SalesReport) -> Result<(), AnalyticsError> {
    let summary_values = [
        report.summary.total_revenue,
        report.summary.average_order_value,
    ];
    let trend_values = report
        .trends
        .iter()
        .flat_map(|t| [t.total_revenue, t.average_order_value]);
    let method_values = report.breakdown.payment_methods.iter().flat_map(|m| {
        [m.total_revenue, m.average_order_value, m.conversion_rate]
    });

    if summary_values
        .into_iter()
        .chain(trend_values)
        .chain(method_values)
        .all(f64::is_finite)
    {
        Ok(())
    } else {
        Err(AnalyticsError::Export(
            "report contains a non-finite value".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_prefixes_formula_leaders() {
        assert_eq!(sanitize_csv_field("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(sanitize_csv_field("+1"), "'+1");
        assert_eq!(sanitize_csv_field("pix"), "pix");
    }
}
