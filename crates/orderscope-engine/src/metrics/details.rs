//! Itemized detail queries backing detailed reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use orderscope_core::metrics::{OrderRow, RefundRecord, TopCustomer};
use orderscope_core::order::Order;
use orderscope_core::rates;
use orderscope_core::{AnalyticsError, OrderStore, TimeWindow};

pub async fn order_rows(
    store: &dyn OrderStore,
    window: &TimeWindow,
    max_rows: usize,
) -> Result<Vec<OrderRow>, AnalyticsError> {
    let mut orders = store.paid_orders_in_window(window).await?;
    orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at).then_with(|| b.id.cmp(&a.id)));
    if orders.len() > max_rows {
        tracing::debug!(
            total = orders.len(),
            max_rows,
            "truncating itemized order list"
        );
        orders.truncate(max_rows);
    }
    Ok(orders.into_iter().map(row_of).collect())
}

pub async fn top_customers(
    store: &dyn OrderStore,
    window: &TimeWindow,
    limit: usize,
) -> Result<Vec<TopCustomer>, AnalyticsError> {
    let orders = store.paid_orders_in_window(window).await?;
    Ok(rank_customers(&orders, limit))
}

pub async fn refund_records(
    store: &dyn OrderStore,
    window: &TimeWindow,
) -> Result<Vec<RefundRecord>, AnalyticsError> {
    let orders = store.refunded_orders_in_window(window).await?;

    let mut records: Vec<RefundRecord> = orders
        .iter()
        .filter_map(|order| {
            let Some(refund) = &order.payment.refund else {
                tracing::warn!(order_id = %order.id, "refunded order without refund details");
                return None;
            };
            Some(RefundRecord {
                order_id: order.id.clone(),
                customer_id: order.customer.id.clone(),
                amount: refund.amount,
                reason: refund.reason.clone(),
                refunded_at: refund.refunded_at,
                order_total: order.pricing.total,
            })
        })
        .collect();

    records.sort_by(|a, b| {
        b.refunded_at
            .cmp(&a.refunded_at)
            .then_with(|| a.order_id.cmp(&b.order_id))
    });
    Ok(records)
}

fn row_of(order: Order) -> OrderRow {
    OrderRow {
        id: order.id,
        customer_id: order.customer.id,
        customer_name: order.customer.name,
        total: order.pricing.total,
        payment_method: order.payment.method,
        shipping_method: order.shipping.method,
        city: order.location.city,
        state: order.location.state,
        placed_at: order.placed_at,
    }
}

struct CustomerAcc {
    name: String,
    total_orders: i64,
    total_spent: f64,
    last_order: DateTime<Utc>,
}

fn rank_customers(orders: &[Order], limit: usize) -> Vec<TopCustomer> {
    let mut by_customer: BTreeMap<&str, CustomerAcc> = BTreeMap::new();
    for order in orders {
        let acc = by_customer
            .entry(order.customer.id.as_str())
            .or_insert_with(|| CustomerAcc {
                name: order.customer.name.clone(),
                total_orders: 0,
                total_spent: 0.0,
                last_order: order.placed_at,
            });
        acc.total_orders += 1;
        acc.total_spent += order.pricing.total;
        acc.last_order = acc.last_order.max(order.placed_at);
    }

    let mut ranked: Vec<TopCustomer> = by_customer
        .into_iter()
        .map(|(customer_id, acc)| TopCustomer {
            customer_id: customer_id.to_string(),
            name: acc.name,
            total_orders: acc.total_orders,
            total_spent: acc.total_spent,
            average_order_value: rates::ratio(acc.total_spent, acc.total_orders as f64),
            last_order: acc.last_order,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.total_spent
            .total_cmp(&a.total_spent)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderscope_testkit::order;

    #[test]
    fn customers_rank_by_spend_with_guarded_average() {
        let orders = vec![
            order("ORD-1").customer("a@example.com", "A").total(40.0).build(),
            order("ORD-2").customer("a@example.com", "A").total(60.0).build(),
            order("ORD-3").customer("b@example.com", "B").total(75.0).build(),
        ];

        let ranked = rank_customers(&orders, 10);
        assert_eq!(ranked[0].customer_id, "a@example.com");
        assert_eq!(ranked[0].total_spent, 100.0);
        assert_eq!(ranked[0].average_order_value, 50.0);
        assert_eq!(ranked[1].customer_id, "b@example.com");
    }

    #[test]
    fn rank_customers_truncates() {
        let orders = vec![
            order("ORD-1").customer("a@example.com", "A").total(10.0).build(),
            order("ORD-2").customer("b@example.com", "B").total(20.0).build(),
        ];
        assert_eq!(rank_customers(&orders, 1).len(), 1);
    }
}
