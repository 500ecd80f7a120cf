//! Order-status conversion funnel.

use orderscope_core::metrics::ConversionFunnel;
use orderscope_core::order::{FunnelStage, Order};
use orderscope_core::rates;
use orderscope_core::{AnalyticsError, OrderStore, TimeWindow};

pub async fn conversion_funnel(
    store: &dyn OrderStore,
    window: &TimeWindow,
) -> Result<ConversionFunnel, AnalyticsError> {
    let orders = store.orders_in_window(window).await?;
    Ok(funnel_of(&orders))
}

fn funnel_of(orders: &[Order]) -> ConversionFunnel {
    let mut pending = 0;
    let mut paid = 0;
    let mut shipped = 0;
    let mut delivered = 0;
    let mut cancelled = 0;
    for order in orders {
        match order.funnel_stage() {
            FunnelStage::Pending => pending += 1,
            FunnelStage::Paid => paid += 1,
            FunnelStage::Shipped => shipped += 1,
            FunnelStage::Delivered => delivered += 1,
            FunnelStage::Cancelled => cancelled += 1,
        }
    }

    let total = orders.len() as i64;
    // Rate numerators are cumulative: an order that shipped or was
    // delivered still converted at the payment step.
    let converted = paid + shipped + delivered;

    ConversionFunnel {
        total_orders: total,
        pending_orders: pending,
        paid_orders: paid,
        shipped_orders: shipped,
        delivered_orders: delivered,
        cancelled_orders: cancelled,
        payment_conversion_rate: rates::pct(converted as f64, total as f64),
        fulfillment_rate: rates::pct(delivered as f64, converted as f64),
        cancellation_rate: rates::pct(cancelled as f64, total as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderscope_testkit::order;

    #[test]
    fn stage_counts_decompose_the_total() {
        let orders = vec![
            order("ORD-1").pending().build(),
            order("ORD-2").build(),
            order("ORD-3").shipped("2025-01-16 09:00:00").build(),
            order("ORD-4").delivered("2025-01-18 09:00:00").build(),
            order("ORD-5").cancelled().build(),
        ];

        let funnel = funnel_of(&orders);
        assert_eq!(funnel.total_orders, 5);
        assert_eq!(
            funnel.total_orders,
            funnel.pending_orders
                + funnel.paid_orders
                + funnel.shipped_orders
                + funnel.delivered_orders
                + funnel.cancelled_orders
        );
        // 3 of 5 converted (paid, shipped, delivered), 1 of 3 fulfilled.
        assert_eq!(funnel.payment_conversion_rate, 60.0);
        assert!((funnel.fulfillment_rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(funnel.cancellation_rate, 20.0);
    }

    #[test]
    fn empty_window_yields_all_zero_rates() {
        let funnel = funnel_of(&[]);
        assert_eq!(funnel.total_orders, 0);
        assert_eq!(funnel.payment_conversion_rate, 0.0);
        assert_eq!(funnel.fulfillment_rate, 0.0);
        assert_eq!(funnel.cancellation_rate, 0.0);
    }
}
