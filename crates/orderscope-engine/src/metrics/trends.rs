//! Seasonal trends and day-level performance series.

use std::collections::{BTreeMap, HashSet};

use orderscope_core::metrics::{DailyPerformance, RevenueMetric, SeasonalTrend};
use orderscope_core::order::Order;
use orderscope_core::rates;
use orderscope_core::{AnalyticsError, Granularity, OrderStore, TimeWindow};

use super::revenue;

pub async fn seasonal_trends(
    store: &dyn OrderStore,
    window: &TimeWindow,
    granularity: Granularity,
) -> Result<Vec<SeasonalTrend>, AnalyticsError> {
    if !matches!(granularity, Granularity::Month | Granularity::Quarter) {
        return Err(AnalyticsError::Validation(format!(
            "seasonal trends support month or quarter granularity, got {}",
            granularity.as_str()
        )));
    }
    let series = revenue::revenue_by_period(store, window, granularity).await?;
    Ok(growth_series(&series))
}

pub async fn daily_performance(
    store: &dyn OrderStore,
    window: &TimeWindow,
) -> Result<Vec<DailyPerformance>, AnalyticsError> {
    let orders = store.paid_orders_in_window(window).await?;
    Ok(daily_rows(&orders))
}

fn growth_series(series: &[RevenueMetric]) -> Vec<SeasonalTrend> {
    series
        .iter()
        .enumerate()
        .map(|(idx, current)| SeasonalTrend {
            period: current.period.clone(),
            revenue: current.total_revenue,
            orders: current.order_count,
            average_order_value: current.average_order_value,
            // First period has no predecessor: growth is 0 by definition.
            growth_rate: if idx == 0 {
                0.0
            } else {
                rates::change_pct(current.total_revenue, series[idx - 1].total_revenue)
            },
        })
        .collect()
}

fn daily_rows(orders: &[Order]) -> Vec<DailyPerformance> {
    let mut by_day: BTreeMap<String, (f64, i64, HashSet<&str>)> = BTreeMap::new();
    for order in orders {
        let entry = by_day
            .entry(Granularity::Day.bucket_label(order.placed_at))
            .or_insert_with(|| (0.0, 0, HashSet::new()));
        entry.0 += order.pricing.total;
        entry.1 += 1;
        entry.2.insert(order.customer.id.as_str());
    }

    by_day
        .into_iter()
        .map(|(date, (revenue, orders, customers))| DailyPerformance {
            date,
            revenue,
            orders,
            average_order_value: rates::ratio(revenue, orders as f64),
            customers: customers.len() as i64,
        })
        .collect()
}
