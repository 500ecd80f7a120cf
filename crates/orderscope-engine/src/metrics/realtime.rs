//! Live-dashboard snapshot: today versus yesterday plus recent orders.
//!
//! The only operation with an implicit, caller-independent window.

use chrono::{DateTime, Duration, Utc};

use orderscope_core::metrics::{RealtimeSnapshot, RecentOrder};
use orderscope_core::rates;
use orderscope_core::{AnalyticsError, OrderStore, TimeWindow};

use super::revenue;

pub async fn snapshot(
    store: &dyn OrderStore,
    recent_limit: usize,
) -> Result<RealtimeSnapshot, AnalyticsError> {
    snapshot_at(store, Utc::now(), recent_limit).await
}

/// Deterministic core: `now` is injected so tests can pin the clock.
pub async fn snapshot_at(
    store: &dyn OrderStore,
    now: DateTime<Utc>,
    recent_limit: usize,
) -> Result<RealtimeSnapshot, AnalyticsError> {
    let today = TimeWindow::day_of(now);
    let yesterday = TimeWindow::new(today.start() - Duration::days(1), today.start())?;

    let (today_totals, yesterday_totals, recent_orders) = tokio::try_join!(
        revenue::window_totals(store, &today),
        revenue::window_totals(store, &yesterday),
        async {
            let orders = store.recent_orders(now - Duration::days(1), recent_limit).await?;
            Ok::<_, AnalyticsError>(
                orders
                    .into_iter()
                    .map(|o| RecentOrder {
                        id: o.id,
                        customer_id: o.customer.id,
                        total: o.pricing.total,
                        payment_status: o.payment.status,
                        placed_at: o.placed_at,
                    })
                    .collect::<Vec<_>>(),
            )
        }
    )?;

    Ok(RealtimeSnapshot {
        revenue_growth_pct: rates::change_pct(
            today_totals.total_revenue,
            yesterday_totals.total_revenue,
        ),
        order_growth_pct: rates::change_pct(
            today_totals.order_count as f64,
            yesterday_totals.order_count as f64,
        ),
        today: today_totals,
        yesterday: yesterday_totals,
        recent_orders,
        last_updated: now,
    })
}
