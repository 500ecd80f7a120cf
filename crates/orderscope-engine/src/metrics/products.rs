//! Top-product ranking from paid line items.

use std::collections::{HashMap, HashSet};

use orderscope_core::metrics::ProductMetric;
use orderscope_core::order::Order;
use orderscope_core::rates;
use orderscope_core::{AnalyticsError, OrderStore, TimeWindow};

pub async fn top_products(
    store: &dyn OrderStore,
    window: &TimeWindow,
    limit: usize,
) -> Result<Vec<ProductMetric>, AnalyticsError> {
    let orders = store.paid_orders_in_window(window).await?;
    Ok(rank_products(&orders, limit))
}

struct ProductAcc {
    name: String,
    category: String,
    brand: String,
    quantity: i64,
    revenue: f64,
    order_ids: HashSet<String>,
}

fn rank_products(orders: &[Order], limit: usize) -> Vec<ProductMetric> {
    let mut by_product: HashMap<&str, ProductAcc> = HashMap::new();
    for order in orders {
        for item in &order.items {
            let acc = by_product
                .entry(item.product_id.as_str())
                .or_insert_with(|| ProductAcc {
                    name: item.name.clone(),
                    category: item.category.clone(),
                    brand: item.brand.clone(),
                    quantity: 0,
                    revenue: 0.0,
                    order_ids: HashSet::new(),
                });
            acc.quantity += item.quantity;
            acc.revenue += item.total;
            acc.order_ids.insert(order.id.clone());
        }
    }

    let mut ranked: Vec<ProductMetric> = by_product
        .into_iter()
        .map(|(product_id, acc)| ProductMetric {
            product_id: product_id.to_string(),
            name: acc.name,
            category: acc.category,
            brand: acc.brand,
            total_quantity: acc.quantity,
            total_revenue: acc.revenue,
            order_count: acc.order_ids.len() as i64,
            average_price: rates::ratio(acc.revenue, acc.quantity as f64),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.total_revenue
            .total_cmp(&a.total_revenue)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderscope_testkit::order;

    #[test]
    fn ranks_by_revenue_and_counts_distinct_orders() {
        let orders = vec![
            order("ORD-1")
                .item("p1", "Shampoo", "hair", "Acme", 2, 10.0)
                .item("p2", "Serum", "skin", "Lumi", 1, 80.0)
                .build(),
            order("ORD-2")
                .item("p1", "Shampoo", "hair", "Acme", 3, 10.0)
                .build(),
        ];

        let ranked = rank_products(&orders, 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].product_id, "p2");
        assert_eq!(ranked[0].total_revenue, 80.0);
        assert_eq!(ranked[0].order_count, 1);
        assert_eq!(ranked[1].product_id, "p1");
        assert_eq!(ranked[1].total_quantity, 5);
        assert_eq!(ranked[1].order_count, 2);
        assert_eq!(ranked[1].average_price, 10.0);
    }

    #[test]
    fn truncates_to_limit() {
        let orders = vec![order("ORD-1")
            .item("p1", "A", "c", "b", 1, 1.0)
            .item("p2", "B", "c", "b", 1, 2.0)
            .item("p3", "C", "c", "b", 1, 3.0)
            .build()];

        let ranked = rank_products(&orders, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].product_id, "p3");
    }

    #[test]
    fn zero_quantity_guards_average_price() {
        // A zero-quantity line can appear on fully discounted rows.
        let mut o = order("ORD-1").build();
        o.items.push(orderscope_core::order::LineItem {
            product_id: "p9".into(),
            name: "Sample".into(),
            category: "promo".into(),
            brand: "Acme".into(),
            quantity: 0,
            unit_price: 0.0,
            total: 0.0,
        });

        let ranked = rank_products(std::slice::from_ref(&o), 10);
        assert_eq!(ranked[0].average_price, 0.0);
    }
}
