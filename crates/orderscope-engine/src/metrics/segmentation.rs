//! Customer segmentation and customer-type breakdown.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};

use orderscope_core::config::SegmentThresholds;
use orderscope_core::metrics::{CustomerSegment, CustomerTypeBreakdown};
use orderscope_core::order::{CustomerKind, Order};
use orderscope_core::rates;
use orderscope_core::{AnalyticsError, OrderStore, TimeWindow};

pub async fn customer_segments(
    store: &dyn OrderStore,
    window: &TimeWindow,
    thresholds: &SegmentThresholds,
) -> Result<Vec<CustomerSegment>, AnalyticsError> {
    let orders = store.paid_orders_in_window(window).await?;
    Ok(segment_customers(&orders, thresholds))
}

pub async fn customer_type_breakdown(
    store: &dyn OrderStore,
    window: &TimeWindow,
) -> Result<Vec<CustomerTypeBreakdown>, AnalyticsError> {
    let orders = store.paid_orders_in_window(window).await?;
    Ok(breakdown_by_kind(&orders))
}

struct CustomerAcc {
    kind: CustomerKind,
    total_orders: i64,
    total_spent: f64,
    first_order: DateTime<Utc>,
    last_order: DateTime<Utc>,
}

fn segment_customers(orders: &[Order], thresholds: &SegmentThresholds) -> Vec<CustomerSegment> {
    let mut by_customer: BTreeMap<&str, CustomerAcc> = BTreeMap::new();
    for order in orders {
        let acc = by_customer
            .entry(order.customer.id.as_str())
            .or_insert_with(|| CustomerAcc {
                kind: order.customer.kind,
                total_orders: 0,
                total_spent: 0.0,
                first_order: order.placed_at,
                last_order: order.placed_at,
            });
        acc.total_orders += 1;
        acc.total_spent += order.pricing.total;
        acc.first_order = acc.first_order.min(order.placed_at);
        acc.last_order = acc.last_order.max(order.placed_at);
    }

    let mut segments: Vec<CustomerSegment> = by_customer
        .into_iter()
        .map(|(customer_id, acc)| CustomerSegment {
            customer_id: customer_id.to_string(),
            kind: acc.kind,
            total_orders: acc.total_orders,
            total_spent: acc.total_spent,
            average_order_value: rates::ratio(acc.total_spent, acc.total_orders as f64),
            first_order: acc.first_order,
            last_order: acc.last_order,
            lifetime_days: (acc.last_order - acc.first_order).num_days(),
            segment: thresholds.classify(acc.total_orders),
        })
        .collect();

    segments.sort_by(|a, b| {
        b.total_spent
            .total_cmp(&a.total_spent)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    segments
}

fn breakdown_by_kind(orders: &[Order]) -> Vec<CustomerTypeBreakdown> {
    let mut out = Vec::new();
    for kind in [CustomerKind::Retail, CustomerKind::Professional] {
        let mut order_count = 0;
        let mut total_revenue = 0.0;
        let mut customers: HashSet<&str> = HashSet::new();
        for order in orders.iter().filter(|o| o.customer.kind == kind) {
            order_count += 1;
            total_revenue += order.pricing.total;
            customers.insert(order.customer.id.as_str());
        }
        if order_count == 0 {
            continue;
        }
        out.push(CustomerTypeBreakdown {
            kind,
            order_count,
            total_revenue,
            unique_customers: customers.len() as i64,
            average_order_value: rates::ratio(total_revenue, order_count as f64),
        });
    }
    out
}
