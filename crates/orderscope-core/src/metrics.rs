//! Metric result value objects.
//!
//! Every type here is produced fresh per query and never mutated or
//! persisted by this subsystem. Rates and averages are percentages /
//! plain means with a 0-guard on empty denominators (see
//! [`crate::rates`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::order::{CustomerKind, PaymentStatus};
use crate::window::Granularity;

/// One bucket of a revenue-by-period series.
#[derive(Debug, Clone, Serialize)]
pub struct RevenueMetric {
    pub period: String,
    pub total_revenue: f64,
    pub order_count: i64,
    /// 0 when `order_count` is 0, never NaN.
    pub average_order_value: f64,
}

/// Single-window aggregate backing the report Summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RevenueTotals {
    pub total_revenue: f64,
    pub order_count: i64,
    pub average_order_value: f64,
    pub total_items: i64,
    pub unique_customers: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductMetric {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub total_quantity: i64,
    pub total_revenue: f64,
    pub order_count: i64,
    /// `total_revenue / total_quantity`, 0 when no units sold.
    pub average_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    New,
    Repeat,
    Loyal,
    Vip,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerSegment {
    pub customer_id: String,
    pub kind: CustomerKind,
    pub total_orders: i64,
    pub total_spent: f64,
    pub average_order_value: f64,
    pub first_order: DateTime<Utc>,
    pub last_order: DateTime<Utc>,
    /// Whole days between first and last order.
    pub lifetime_days: i64,
    pub segment: Segment,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerTypeBreakdown {
    pub kind: CustomerKind,
    pub order_count: i64,
    pub total_revenue: f64,
    pub unique_customers: i64,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeographicInsight {
    pub state: String,
    pub city: String,
    pub order_count: i64,
    pub total_revenue: f64,
    pub average_order_value: f64,
}

/// Status-stage counts plus derived drop-off rates.
///
/// Stage counts are mutually exclusive and exhaustive, so
/// `total_orders == pending + paid + shipped + delivered + cancelled`.
/// Rate numerators are cumulative (an order that shipped still counts
/// as converted), keeping every rate within 0–100.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionFunnel {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub paid_orders: i64,
    pub shipped_orders: i64,
    pub delivered_orders: i64,
    pub cancelled_orders: i64,
    pub payment_conversion_rate: f64,
    pub fulfillment_rate: f64,
    pub cancellation_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonalTrend {
    pub period: String,
    pub revenue: f64,
    pub orders: i64,
    pub average_order_value: f64,
    /// Period-over-period growth, percent. 0 for the first period in a
    /// series (no predecessor) and when the predecessor had no revenue.
    pub growth_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomerBehavior {
    pub total_customers: i64,
    pub new_customers: i64,
    pub returning_customers: i64,
    pub retention_rate: f64,
    pub average_lifetime_value: f64,
    pub average_orders_per_customer: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethodMetric {
    pub method: String,
    /// Paid orders for this method.
    pub order_count: i64,
    pub total_revenue: f64,
    pub average_order_value: f64,
    /// Paid / all orders carrying this method, percent.
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShippingMethodMetric {
    pub method: String,
    pub order_count: i64,
    pub total_revenue: f64,
    pub average_order_value: f64,
    /// Delivered / all paid orders for this method, percent.
    pub on_time_rate: f64,
    /// Mean days from placement to actual delivery over delivered
    /// orders only.
    pub average_delivery_days: f64,
    pub average_shipping_cost: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CohortCell {
    pub period: String,
    pub active_customers: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CohortRow {
    /// First-paid-order period shared by every customer in the row.
    pub cohort: String,
    pub cohort_size: i64,
    pub cells: Vec<CohortCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CohortMatrix {
    pub granularity: Granularity,
    pub rows: Vec<CohortRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentOrder {
    pub id: String,
    pub customer_id: String,
    pub total: f64,
    pub payment_status: PaymentStatus,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RealtimeSnapshot {
    pub today: RevenueTotals,
    pub yesterday: RevenueTotals,
    pub revenue_growth_pct: f64,
    pub order_growth_pct: f64,
    pub recent_orders: Vec<RecentOrder>,
    pub last_updated: DateTime<Utc>,
}

/// Demand signal per product: units sold per window day. Derived from
/// orders only; the engine never sees stock-on-hand.
#[derive(Debug, Clone, Serialize)]
pub struct ProductVelocity {
    pub product_id: String,
    pub category: String,
    pub brand: String,
    pub units_per_day: f64,
    pub total_quantity: i64,
    pub total_revenue: f64,
    pub order_count: i64,
    pub average_price: f64,
    pub last_sold: DateTime<Utc>,
}

/// One day of the sales-performance series: base values only; the
/// reporting service layers day-over-day changes on top.
#[derive(Debug, Clone, Serialize)]
pub struct DailyPerformance {
    pub date: String,
    pub revenue: f64,
    pub orders: i64,
    pub average_order_value: f64,
    /// Distinct customers with a paid order that day.
    pub customers: i64,
}

/// One line of a detailed report's itemized order list.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRow {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub total: f64,
    pub payment_method: String,
    pub shipping_method: String,
    pub city: String,
    pub state: String,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopCustomer {
    pub customer_id: String,
    pub name: String,
    pub total_orders: i64,
    pub total_spent: f64,
    pub average_order_value: f64,
    pub last_order: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundRecord {
    pub order_id: String,
    pub customer_id: String,
    pub amount: f64,
    pub reason: Option<String>,
    pub refunded_at: DateTime<Utc>,
    pub order_total: f64,
}
