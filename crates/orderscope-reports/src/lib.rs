//! Reporting service: turns a time range and options into one
//! assembled sales report, with comparison, performance trends, and
//! CSV export on top of the metrics engine.

pub mod export;
pub mod report;
pub mod service;

pub use report::{
    ComparativeSalesReport, DashboardMetrics, DashboardPeriod, ReportOptions, SalesReport,
    TrendMetric, TrendSeries,
};
pub use service::{ReportConfig, ReportService};
