//! New-versus-returning customer behavior.

use std::collections::BTreeMap;

use orderscope_core::metrics::CustomerBehavior;
use orderscope_core::rates;
use orderscope_core::{AnalyticsError, OrderStore, TimeWindow};

pub async fn customer_behavior(
    store: &dyn OrderStore,
    window: &TimeWindow,
) -> Result<CustomerBehavior, AnalyticsError> {
    let orders = store.paid_orders_in_window(window).await?;

    let mut by_customer: BTreeMap<&str, (i64, f64)> = BTreeMap::new();
    for order in &orders {
        let entry = by_customer.entry(order.customer.id.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += order.pricing.total;
    }

    if by_customer.is_empty() {
        return Ok(CustomerBehavior::default());
    }

    let ids: Vec<String> = by_customer.keys().map(|id| id.to_string()).collect();
    let seen_before = store
        .customers_with_paid_orders_before(window.start(), &ids)
        .await?;

    let total_customers = by_customer.len() as i64;
    let returning = ids.iter().filter(|id| seen_before.contains(*id)).count() as i64;
    let total_orders: i64 = by_customer.values().map(|(count, _)| count).sum();
    let total_spent: f64 = by_customer.values().map(|(_, spent)| spent).sum();

    Ok(CustomerBehavior {
        total_customers,
        new_customers: total_customers - returning,
        returning_customers: returning,
        retention_rate: rates::pct(returning as f64, total_customers as f64),
        average_lifetime_value: rates::ratio(total_spent, total_customers as f64),
        average_orders_per_customer: rates::ratio(total_orders as f64, total_customers as f64),
    })
}
