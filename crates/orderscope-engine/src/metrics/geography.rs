//! Geographic distribution of paid orders.

use std::collections::BTreeMap;

use orderscope_core::metrics::GeographicInsight;
use orderscope_core::order::Order;
use orderscope_core::rates;
use orderscope_core::{AnalyticsError, OrderStore, TimeWindow};

pub async fn geographic_distribution(
    store: &dyn OrderStore,
    window: &TimeWindow,
) -> Result<Vec<GeographicInsight>, AnalyticsError> {
    let orders = store.paid_orders_in_window(window).await?;
    Ok(group_by_location(&orders))
}

fn group_by_location(orders: &[Order]) -> Vec<GeographicInsight> {
    let mut by_location: BTreeMap<(&str, &str), (i64, f64)> = BTreeMap::new();
    for order in orders {
        let entry = by_location
            .entry((order.location.state.as_str(), order.location.city.as_str()))
            .or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += order.pricing.total;
    }

    let mut insights: Vec<GeographicInsight> = by_location
        .into_iter()
        .map(|((state, city), (count, revenue))| GeographicInsight {
            state: state.to_string(),
            city: city.to_string(),
            order_count: count,
            total_revenue: revenue,
            average_order_value: rates::ratio(revenue, count as f64),
        })
        .collect();

    insights.sort_by(|a, b| {
        b.total_revenue
            .total_cmp(&a.total_revenue)
            .then_with(|| (&a.state, &a.city).cmp(&(&b.state, &b.city)))
    });
    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderscope_testkit::order;

    #[test]
    fn groups_by_state_and_city_sorted_by_revenue() {
        let orders = vec![
            order("ORD-1").location("Porto", "Porto").total(50.0).build(),
            order("ORD-2").location("Lisbon", "Lisboa").total(120.0).build(),
            order("ORD-3").location("Lisbon", "Lisboa").total(80.0).build(),
        ];

        let insights = group_by_location(&orders);
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].city, "Lisbon");
        assert_eq!(insights[0].order_count, 2);
        assert_eq!(insights[0].total_revenue, 200.0);
        assert_eq!(insights[0].average_order_value, 100.0);
        assert_eq!(insights[1].city, "Porto");
    }

    #[test]
    fn same_city_name_in_two_states_stays_separate() {
        let orders = vec![
            order("ORD-1").location("Springfield", "IL").total(10.0).build(),
            order("ORD-2").location("Springfield", "MO").total(10.0).build(),
        ];

        assert_eq!(group_by_location(&orders).len(), 2);
    }
}
