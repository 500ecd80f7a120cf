//! Sales velocity per product: a demand proxy, not stock levels.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use orderscope_core::metrics::ProductVelocity;
use orderscope_core::order::Order;
use orderscope_core::rates;
use orderscope_core::{AnalyticsError, OrderStore, TimeWindow};

pub async fn product_velocity(
    store: &dyn OrderStore,
    window: &TimeWindow,
) -> Result<Vec<ProductVelocity>, AnalyticsError> {
    let orders = store.paid_orders_in_window(window).await?;
    Ok(velocity_of(&orders, window.duration_days()))
}

struct VelocityAcc {
    category: String,
    brand: String,
    quantity: i64,
    revenue: f64,
    unit_price_sum: f64,
    line_count: i64,
    order_ids: HashSet<String>,
    last_sold: DateTime<Utc>,
}

fn velocity_of(orders: &[Order], window_days: f64) -> Vec<ProductVelocity> {
    if window_days <= 0.0 {
        // An empty window sells nothing; units-per-day is undefined.
        return Vec::new();
    }

    let mut by_product: HashMap<&str, VelocityAcc> = HashMap::new();
    for order in orders {
        for item in &order.items {
            let acc = by_product
                .entry(item.product_id.as_str())
                .or_insert_with(|| VelocityAcc {
                    category: item.category.clone(),
                    brand: item.brand.clone(),
                    quantity: 0,
                    revenue: 0.0,
                    unit_price_sum: 0.0,
                    line_count: 0,
                    order_ids: HashSet::new(),
                    last_sold: order.placed_at,
                });
            acc.quantity += item.quantity;
            acc.revenue += item.total;
            acc.unit_price_sum += item.unit_price;
            acc.line_count += 1;
            acc.order_ids.insert(order.id.clone());
            acc.last_sold = acc.last_sold.max(order.placed_at);
        }
    }

    let mut out: Vec<ProductVelocity> = by_product
        .into_iter()
        .map(|(product_id, acc)| ProductVelocity {
            product_id: product_id.to_string(),
            category: acc.category,
            brand: acc.brand,
            units_per_day: acc.quantity as f64 / window_days,
            total_quantity: acc.quantity,
            total_revenue: acc.revenue,
            order_count: acc.order_ids.len() as i64,
            average_price: rates::ratio(acc.unit_price_sum, acc.line_count as f64),
            last_sold: acc.last_sold,
        })
        .collect();

    out.sort_by(|a, b| {
        b.units_per_day
            .total_cmp(&a.units_per_day)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderscope_testkit::order;

    #[test]
    fn units_per_day_uses_window_length() {
        let orders = vec![
            order("ORD-1")
                .placed("2025-01-02 10:00:00")
                .item("p1", "Shampoo", "hair", "Acme", 6, 10.0)
                .build(),
            order("ORD-2")
                .placed("2025-01-08 10:00:00")
                .item("p1", "Shampoo", "hair", "Acme", 4, 10.0)
                .build(),
        ];

        let ranked = velocity_of(&orders, 10.0);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].total_quantity, 10);
        assert_eq!(ranked[0].units_per_day, 1.0);
        assert_eq!(ranked[0].order_count, 2);
        assert_eq!(ranked[0].last_sold, orderscope_testkit::ts("2025-01-08 10:00:00"));
    }

    #[test]
    fn zero_length_window_yields_empty_result() {
        assert!(velocity_of(&[], 0.0).is_empty());
    }

    #[test]
    fn fastest_mover_sorts_first() {
        let orders = vec![order("ORD-1")
            .item("slow", "A", "c", "b", 1, 5.0)
            .item("fast", "B", "c", "b", 30, 2.0)
            .build()];

        let ranked = velocity_of(&orders, 30.0);
        assert_eq!(ranked[0].product_id, "fast");
        assert_eq!(ranked[0].units_per_day, 1.0);
    }
}
