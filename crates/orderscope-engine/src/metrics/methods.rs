//! Payment- and shipping-method breakdowns.

use std::collections::BTreeMap;

use orderscope_core::metrics::{PaymentMethodMetric, ShippingMethodMetric};
use orderscope_core::order::{Order, ShippingStatus};
use orderscope_core::rates;
use orderscope_core::{AnalyticsError, OrderStore, TimeWindow};

pub async fn payment_method_breakdown(
    store: &dyn OrderStore,
    window: &TimeWindow,
) -> Result<Vec<PaymentMethodMetric>, AnalyticsError> {
    // All statuses: the conversion rate needs the unpaid attempts too.
    let orders = store.orders_in_window(window).await?;
    Ok(payment_methods_of(&orders))
}

pub async fn shipping_method_breakdown(
    store: &dyn OrderStore,
    window: &TimeWindow,
) -> Result<Vec<ShippingMethodMetric>, AnalyticsError> {
    let orders = store.paid_orders_in_window(window).await?;
    Ok(shipping_methods_of(&orders))
}

#[derive(Default)]
struct PaymentAcc {
    total: i64,
    paid: i64,
    revenue: f64,
}

fn payment_methods_of(orders: &[Order]) -> Vec<PaymentMethodMetric> {
    let mut by_method: BTreeMap<&str, PaymentAcc> = BTreeMap::new();
    for order in orders {
        let acc = by_method.entry(order.payment.method.as_str()).or_default();
        acc.total += 1;
        if order.is_paid() {
            acc.paid += 1;
            acc.revenue += order.pricing.total;
        }
    }

    let mut out: Vec<PaymentMethodMetric> = by_method
        .into_iter()
        .map(|(method, acc)| PaymentMethodMetric {
            method: method.to_string(),
            order_count: acc.paid,
            total_revenue: acc.revenue,
            average_order_value: rates::ratio(acc.revenue, acc.paid as f64),
            conversion_rate: rates::pct(acc.paid as f64, acc.total as f64),
        })
        .collect();

    out.sort_by(|a, b| {
        b.total_revenue
            .total_cmp(&a.total_revenue)
            .then_with(|| a.method.cmp(&b.method))
    });
    out
}

#[derive(Default)]
struct ShippingAcc {
    count: i64,
    revenue: f64,
    shipping_cost: f64,
    delivered: i64,
    /// Deliveries with a recorded timestamp; the denominator for the
    /// delivery-time mean.
    timed_deliveries: i64,
    delivery_days: f64,
}

fn shipping_methods_of(orders: &[Order]) -> Vec<ShippingMethodMetric> {
    let mut by_method: BTreeMap<&str, ShippingAcc> = BTreeMap::new();
    for order in orders {
        let acc = by_method.entry(order.shipping.method.as_str()).or_default();
        acc.count += 1;
        acc.revenue += order.pricing.total;
        acc.shipping_cost += order.shipping.cost;
        if order.shipping.status == ShippingStatus::Delivered {
            acc.delivered += 1;
        }
        if let Some(days) = order.delivery_days() {
            acc.timed_deliveries += 1;
            acc.delivery_days += days;
        }
    }

    let mut out: Vec<ShippingMethodMetric> = by_method
        .into_iter()
        .map(|(method, acc)| ShippingMethodMetric {
            method: method.to_string(),
            order_count: acc.count,
            total_revenue: acc.revenue,
            average_order_value: rates::ratio(acc.revenue, acc.count as f64),
            on_time_rate: rates::pct(acc.delivered as f64, acc.count as f64),
            // Mean over delivered orders only; undelivered orders are
            // excluded, not counted as zero-day deliveries.
            average_delivery_days: rates::ratio(acc.delivery_days, acc.timed_deliveries as f64),
            average_shipping_cost: rates::ratio(acc.shipping_cost, acc.count as f64),
        })
        .collect();

    out.sort_by(|a, b| {
        b.order_count
            .cmp(&a.order_count)
            .then_with(|| a.method.cmp(&b.method))
    });
    out
}
