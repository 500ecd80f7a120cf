//! Report value objects assembled by the reporting service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderscope_core::metrics::{
    ConversionFunnel, CustomerBehavior, CustomerTypeBreakdown, DailyPerformance,
    GeographicInsight, OrderRow, PaymentMethodMetric, ProductMetric, RefundRecord, RevenueMetric,
    RevenueTotals, ShippingMethodMetric, TopCustomer,
};
use orderscope_core::{AnalyticsError, Granularity, TimeWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    Custom,
}

impl PeriodKind {
    /// Inferred from window length in whole days, rounded up.
    pub fn infer(window: &TimeWindow) -> Self {
        let days = window.duration_days().ceil() as i64;
        if days <= 1 {
            Self::Daily
        } else if days <= 7 {
            Self::Weekly
        } else if days <= 31 {
            Self::Monthly
        } else if days <= 93 {
            Self::Quarterly
        } else if days <= 366 {
            Self::Yearly
        } else {
            Self::Custom
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodDescriptor {
    pub start: DateTime<Utc>,
    /// Exclusive end of the half-open window.
    pub end: DateTime<Utc>,
    pub kind: PeriodKind,
}

impl PeriodDescriptor {
    pub fn from_window(window: &TimeWindow) -> Self {
        Self {
            start: window.start(),
            end: window.end(),
            kind: PeriodKind::infer(window),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_revenue: f64,
    pub total_orders: i64,
    pub average_order_value: f64,
    pub total_items: i64,
    pub unique_customers: i64,
}

impl ReportSummary {
    pub fn from_totals(totals: &RevenueTotals) -> Self {
        Self {
            total_revenue: totals.total_revenue,
            total_orders: totals.order_count,
            average_order_value: totals.average_order_value,
            total_items: totals.total_items,
            unique_customers: totals.unique_customers,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportBreakdown {
    pub payment_methods: Vec<PaymentMethodMetric>,
    pub shipping_methods: Vec<ShippingMethodMetric>,
    pub customer_types: Vec<CustomerTypeBreakdown>,
    /// Top locations by revenue, truncated to the configured limit.
    pub geography: Vec<GeographicInsight>,
}

/// Itemized sections of a detailed report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDetails {
    pub orders: Vec<OrderRow>,
    pub products: Vec<ProductMetric>,
    pub customers: Vec<TopCustomer>,
    pub refunds: Vec<RefundRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub id: String,
    pub title: String,
    pub period: PeriodDescriptor,
    pub summary: ReportSummary,
    pub breakdown: ReportBreakdown,
    pub customer_behavior: CustomerBehavior,
    pub trends: Vec<RevenueMetric>,
    /// Present only when the report was generated with
    /// `include_details`: the "detailed sales report" shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ReportDetails>,
    pub generated_at: DateTime<Utc>,
    pub generated_by: String,
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub include_details: bool,
    pub group_by: Granularity,
    pub generated_by: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_details: false,
            group_by: Granularity::Day,
            generated_by: "system".to_string(),
        }
    }
}

/// Delta for one headline metric between two reports.
#[derive(Debug, Clone, Serialize)]
pub struct MetricComparison {
    pub current: f64,
    pub previous: f64,
    pub change: f64,
    /// 0 when `baseline_zero`: a missing baseline, not "no
    /// change".
    pub percent_change: f64,
    pub baseline_zero: bool,
}

impl MetricComparison {
    pub fn between(current: f64, previous: f64) -> Self {
        Self {
            current,
            previous,
            change: current - previous,
            percent_change: orderscope_core::rates::change_pct(current, previous),
            baseline_zero: previous == 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportComparison {
    pub revenue: MetricComparison,
    pub orders: MetricComparison,
    pub average_order_value: MetricComparison,
    pub unique_customers: MetricComparison,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparativeSalesReport {
    pub id: String,
    pub title: String,
    pub current: SalesReport,
    pub previous: SalesReport,
    pub comparison: ReportComparison,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    Revenue,
    Orders,
    Aov,
    Customers,
}

impl TrendMetric {
    pub fn parse(raw: &str) -> Result<Self, AnalyticsError> {
        match raw.trim() {
            "revenue" => Ok(Self::Revenue),
            "orders" => Ok(Self::Orders),
            "aov" => Ok(Self::Aov),
            "customers" => Ok(Self::Customers),
            other => Err(AnalyticsError::Validation(format!(
                "unknown trend metric '{other}': expected revenue, orders, aov, or customers"
            ))),
        }
    }
}

/// One day of the performance series. Change fields are `None` for the
/// first day (no predecessor) and for metrics the caller did not
/// request.
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub revenue: f64,
    pub orders: i64,
    pub average_order_value: f64,
    pub customers: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aov_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customers_change: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendSummary {
    /// Days with at least one paid order; empty days are omitted from
    /// the series like everywhere else.
    pub total_days: i64,
    pub average_daily_revenue: f64,
    pub average_daily_orders: f64,
    pub best_day: Option<DailyPerformance>,
    pub worst_day: Option<DailyPerformance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendSeries {
    pub points: Vec<TrendPoint>,
    pub summary: TrendSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashboardPeriod {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
}

impl DashboardPeriod {
    pub fn parse(raw: &str) -> Result<Self, AnalyticsError> {
        match raw.trim() {
            "today" => Ok(Self::Today),
            "7d" => Ok(Self::Last7Days),
            "30d" => Ok(Self::Last30Days),
            "90d" => Ok(Self::Last90Days),
            other => Err(AnalyticsError::Validation(format!(
                "unknown dashboard period '{other}': expected today, 7d, 30d, or 90d"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub period: DashboardPeriod,
    pub totals: RevenueTotals,
    pub top_products: Vec<ProductMetric>,
    pub funnel: ConversionFunnel,
    pub geography: Vec<GeographicInsight>,
    pub customer_behavior: CustomerBehavior,
    pub generated_at: DateTime<Utc>,
}
