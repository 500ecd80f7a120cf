//! Cohort matrix construction.
//!
//! Two passes: the first pins each customer to the period of their
//! first paid order (the cohort key), the second marks the customer
//! active in every period they ordered in, under that one cohort. A
//! cell counts distinct active customers, so several orders by the
//! same customer in one period count once.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};

use orderscope_core::metrics::{CohortCell, CohortMatrix, CohortRow};
use orderscope_core::order::Order;
use orderscope_core::{AnalyticsError, Granularity, OrderStore, TimeWindow};

pub async fn cohort_matrix(
    store: &dyn OrderStore,
    window: &TimeWindow,
    granularity: Granularity,
) -> Result<CohortMatrix, AnalyticsError> {
    let orders = store.paid_orders_in_window(window).await?;
    Ok(build_matrix(&orders, granularity))
}

fn build_matrix(orders: &[Order], granularity: Granularity) -> CohortMatrix {
    let mut first_order: HashMap<&str, DateTime<Utc>> = HashMap::new();
    for order in orders {
        first_order
            .entry(order.customer.id.as_str())
            .and_modify(|first| *first = (*first).min(order.placed_at))
            .or_insert(order.placed_at);
    }

    let cohort_of: HashMap<&str, String> = first_order
        .iter()
        .map(|(id, first)| (*id, granularity.bucket_label(*first)))
        .collect();

    let mut cohort_sizes: BTreeMap<&str, i64> = BTreeMap::new();
    for cohort in cohort_of.values() {
        *cohort_sizes.entry(cohort.as_str()).or_insert(0) += 1;
    }

    let mut cells: BTreeMap<&str, BTreeMap<String, HashSet<&str>>> = BTreeMap::new();
    for order in orders {
        let customer = order.customer.id.as_str();
        let Some(cohort) = cohort_of.get(customer) else {
            continue;
        };
        cells
            .entry(cohort.as_str())
            .or_default()
            .entry(granularity.bucket_label(order.placed_at))
            .or_default()
            .insert(customer);
    }

    let rows = cells
        .into_iter()
        .map(|(cohort, periods)| CohortRow {
            cohort: cohort.to_string(),
            cohort_size: cohort_sizes.get(cohort).copied().unwrap_or(0),
            cells: periods
                .into_iter()
                .map(|(period, customers)| CohortCell {
                    period,
                    active_customers: customers.len() as i64,
                })
                .collect(),
        })
        .collect();

    CohortMatrix { granularity, rows }
}
