//! Revenue aggregation: per-period series and whole-window totals.

use std::collections::{BTreeMap, HashSet};

use orderscope_core::metrics::{RevenueMetric, RevenueTotals};
use orderscope_core::order::Order;
use orderscope_core::rates;
use orderscope_core::{AnalyticsError, Granularity, OrderStore, TimeWindow};

pub async fn revenue_by_period(
    store: &dyn OrderStore,
    window: &TimeWindow,
    granularity: Granularity,
) -> Result<Vec<RevenueMetric>, AnalyticsError> {
    let orders = store.paid_orders_in_window(window).await?;
    Ok(bucket_revenue(&orders, granularity))
}

pub async fn window_totals(
    store: &dyn OrderStore,
    window: &TimeWindow,
) -> Result<RevenueTotals, AnalyticsError> {
    let orders = store.paid_orders_in_window(window).await?;
    Ok(totals_of(&orders))
}

/// Buckets with no paid orders are omitted, not emitted as zero-rows:
/// downstream growth math treats a missing predecessor as "no prior
/// data", which must stay distinguishable from zero revenue.
fn bucket_revenue(orders: &[Order], granularity: Granularity) -> Vec<RevenueMetric> {
    let mut buckets: BTreeMap<String, (f64, i64)> = BTreeMap::new();
    for order in orders {
        let entry = buckets
            .entry(granularity.bucket_label(order.placed_at))
            .or_insert((0.0, 0));
        entry.0 += order.pricing.total;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(period, (revenue, count))| RevenueMetric {
            period,
            total_revenue: revenue,
            order_count: count,
            average_order_value: rates::ratio(revenue, count as f64),
        })
        .collect()
}

fn totals_of(orders: &[Order]) -> RevenueTotals {
    let mut total_revenue = 0.0;
    let mut total_items = 0;
    let mut customers: HashSet<&str> = HashSet::new();
    for order in orders {
        total_revenue += order.pricing.total;
        total_items += order.item_count();
        customers.insert(order.customer.id.as_str());
    }

    let order_count = orders.len() as i64;
    RevenueTotals {
        total_revenue,
        order_count,
        average_order_value: rates::ratio(total_revenue, order_count as f64),
        total_items,
        unique_customers: customers.len() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderscope_testkit::order;

    #[test]
    fn buckets_sum_revenue_and_guard_empty_average() {
        let orders = vec![
            order("ORD-1").placed("2025-01-03 09:00:00").total(100.0).build(),
            order("ORD-2").placed("2025-01-03 17:00:00").total(200.0).build(),
            order("ORD-3").placed("2025-01-05 11:00:00").total(150.0).build(),
        ];

        let series = bucket_revenue(&orders, Granularity::Day);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].period, "2025-01-03");
        assert_eq!(series[0].total_revenue, 300.0);
        assert_eq!(series[0].order_count, 2);
        assert_eq!(series[0].average_order_value, 150.0);
        // 2025-01-04 is absent, not a zero-row.
        assert_eq!(series[1].period, "2025-01-05");
    }

    #[test]
    fn empty_input_yields_empty_series_and_zero_totals() {
        assert!(bucket_revenue(&[], Granularity::Month).is_empty());

        let totals = totals_of(&[]);
        assert_eq!(totals.total_revenue, 0.0);
        assert_eq!(totals.order_count, 0);
        assert_eq!(totals.average_order_value, 0.0);
        assert_eq!(totals.unique_customers, 0);
    }

    #[test]
    fn totals_count_items_and_distinct_customers() {
        let orders = vec![
            order("ORD-1")
                .customer("ana@example.com", "Ana Costa")
                .item("p1", "Shampoo", "hair", "Acme", 2, 10.0)
                .build(),
            order("ORD-2")
                .customer("ana@example.com", "Ana Costa")
                .item("p2", "Conditioner", "hair", "Acme", 1, 15.0)
                .build(),
            order("ORD-3")
                .customer("rui@example.com", "Rui Alves")
                .item("p1", "Shampoo", "hair", "Acme", 3, 10.0)
                .build(),
        ];

        let totals = totals_of(&orders);
        assert_eq!(totals.order_count, 3);
        assert_eq!(totals.total_items, 6);
        assert_eq!(totals.unique_customers, 2);
        assert_eq!(totals.total_revenue, 65.0);
    }
}
