use std::sync::Arc;

use orderscope_core::{Granularity, TimeWindow};
use orderscope_engine::MetricsEngine;
use orderscope_testkit::{order, ts, MemoryOrderStore};

fn engine(orders: Vec<orderscope_core::order::Order>) -> MetricsEngine {
    MetricsEngine::new(Arc::new(MemoryOrderStore::new(orders)))
}

#[tokio::test]
async fn funnel_counts_decompose_across_all_statuses() {
    let window = TimeWindow::month(2025, 2).expect("february");
    let engine = engine(vec![
        order("ORD-1").placed("2025-02-01 10:00:00").total(10.0).pending().build(),
        order("ORD-2").placed("2025-02-02 10:00:00").total(10.0).build(),
        order("ORD-3").placed("2025-02-03 10:00:00").total(10.0).build(),
        order("ORD-4")
            .placed("2025-02-04 10:00:00")
            .total(10.0)
            .shipped("2025-02-05 10:00:00")
            .build(),
        order("ORD-5")
            .placed("2025-02-06 10:00:00")
            .total(10.0)
            .delivered("2025-02-09 10:00:00")
            .build(),
        order("ORD-6").placed("2025-02-07 10:00:00").total(10.0).cancelled().build(),
    ]);

    let funnel = engine.conversion_funnel(&window).await.expect("funnel");
    assert_eq!(funnel.total_orders, 6);
    assert_eq!(funnel.pending_orders, 1);
    assert_eq!(funnel.paid_orders, 2);
    assert_eq!(funnel.shipped_orders, 1);
    assert_eq!(funnel.delivered_orders, 1);
    assert_eq!(funnel.cancelled_orders, 1);
    assert_eq!(
        funnel.total_orders,
        funnel.pending_orders
            + funnel.paid_orders
            + funnel.shipped_orders
            + funnel.delivered_orders
            + funnel.cancelled_orders
    );
    // 4 of 6 converted; 1 of those 4 delivered.
    assert!((funnel.payment_conversion_rate - 400.0 / 6.0).abs() < 1e-9);
    assert_eq!(funnel.fulfillment_rate, 25.0);
    assert!((funnel.cancellation_rate - 100.0 / 6.0).abs() < 1e-9);
}

#[tokio::test]
async fn cohort_membership_follows_the_first_paid_order() {
    // Customer X first orders in January, again in February: X shows in
    // cells (2025-01, 2025-01) and (2025-01, 2025-02) and in no other
    // cohort row.
    let window = TimeWindow::new(ts("2025-01-01 00:00:00"), ts("2025-07-01 00:00:00"))
        .expect("half year");
    let engine = engine(vec![
        order("ORD-1")
            .customer("x@example.com", "X")
            .placed("2025-01-12 10:00:00")
            .total(20.0)
            .build(),
        order("ORD-2")
            .customer("x@example.com", "X")
            .placed("2025-02-18 10:00:00")
            .total(20.0)
            .build(),
        order("ORD-3")
            .customer("feb@example.com", "Feb")
            .placed("2025-02-03 10:00:00")
            .total(20.0)
            .build(),
    ]);

    let matrix = engine
        .cohort_matrix(&window, Granularity::Month)
        .await
        .expect("matrix");

    assert_eq!(matrix.rows.len(), 2);
    let jan = &matrix.rows[0];
    assert_eq!(jan.cohort, "2025-01");
    assert_eq!(jan.cohort_size, 1);
    assert_eq!(jan.cells.len(), 2);
    assert_eq!(jan.cells[0].period, "2025-01");
    assert_eq!(jan.cells[0].active_customers, 1);
    assert_eq!(jan.cells[1].period, "2025-02");
    assert_eq!(jan.cells[1].active_customers, 1);

    let feb = &matrix.rows[1];
    assert_eq!(feb.cohort, "2025-02");
    assert_eq!(feb.cohort_size, 1);
    assert_eq!(feb.cells.len(), 1);
}

#[tokio::test]
async fn cohorts_ignore_orders_outside_the_window() {
    // The pre-window order is invisible here: within the window the
    // customer's first order is in March, so that is their cohort.
    let window = TimeWindow::new(ts("2025-03-01 00:00:00"), ts("2025-05-01 00:00:00"))
        .expect("window");
    let engine = engine(vec![
        order("ORD-0")
            .customer("x@example.com", "X")
            .placed("2024-12-01 10:00:00")
            .total(20.0)
            .build(),
        order("ORD-1")
            .customer("x@example.com", "X")
            .placed("2025-03-09 10:00:00")
            .total(20.0)
            .build(),
    ]);

    let matrix = engine
        .cohort_matrix(&window, Granularity::Month)
        .await
        .expect("matrix");
    assert_eq!(matrix.rows.len(), 1);
    assert_eq!(matrix.rows[0].cohort, "2025-03");
}

#[tokio::test]
async fn product_velocity_ranks_through_the_engine() {
    let window = TimeWindow::new(ts("2025-01-01 00:00:00"), ts("2025-01-11 00:00:00"))
        .expect("ten days");
    let engine = engine(vec![
        order("ORD-1")
            .placed("2025-01-02 10:00:00")
            .item("fast", "Fast mover", "hair", "Acme", 20, 5.0)
            .item("slow", "Slow mover", "skin", "Lumi", 2, 40.0)
            .build(),
        order("ORD-2")
            .placed("2025-01-09 10:00:00")
            .item("fast", "Fast mover", "hair", "Acme", 10, 5.0)
            .build(),
    ]);

    let ranked = engine.product_velocity(&window).await.expect("velocity");
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].product_id, "fast");
    assert_eq!(ranked[0].units_per_day, 3.0);
    assert_eq!(ranked[0].order_count, 2);
    assert_eq!(ranked[0].last_sold, ts("2025-01-09 10:00:00"));
    assert_eq!(ranked[1].units_per_day, 0.2);
}
