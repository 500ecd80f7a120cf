//! Metrics engine: pure, stateless computations over order-store
//! responses.
//!
//! Each operation fetches the orders it needs from the injected
//! [`OrderStore`] and aggregates in-process. Identical parameters over
//! unchanged store data produce identical results; nothing here mutates
//! the store or keeps state between calls.

pub mod metrics;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use orderscope_core::config::SegmentThresholds;
use orderscope_core::metrics::{
    CohortMatrix, ConversionFunnel, CustomerBehavior, CustomerSegment, CustomerTypeBreakdown,
    DailyPerformance, GeographicInsight, OrderRow, PaymentMethodMetric, ProductMetric,
    ProductVelocity, RealtimeSnapshot, RefundRecord, RevenueMetric, RevenueTotals, SeasonalTrend,
    ShippingMethodMetric, TopCustomer,
};
use orderscope_core::{AnalyticsError, Granularity, OrderStore, TimeWindow};

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub segment_thresholds: SegmentThresholds,
}

/// Facade over the metric family modules. Cheap to clone; the store is
/// shared behind an `Arc` so concurrent report fan-outs can borrow the
/// same engine.
#[derive(Clone)]
pub struct MetricsEngine {
    store: Arc<dyn OrderStore>,
    config: EngineConfig,
}

impl MetricsEngine {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<dyn OrderStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Paid-order revenue grouped by period. Buckets with no orders are
    /// omitted (see [`metrics::revenue`]).
    pub async fn revenue_by_period(
        &self,
        window: &TimeWindow,
        granularity: Granularity,
    ) -> Result<Vec<RevenueMetric>, AnalyticsError> {
        metrics::revenue::revenue_by_period(self.store.as_ref(), window, granularity).await
    }

    /// Whole-window aggregate backing the report Summary.
    pub async fn window_totals(
        &self,
        window: &TimeWindow,
    ) -> Result<RevenueTotals, AnalyticsError> {
        metrics::revenue::window_totals(self.store.as_ref(), window).await
    }

    pub async fn top_products(
        &self,
        window: &TimeWindow,
        limit: usize,
    ) -> Result<Vec<ProductMetric>, AnalyticsError> {
        metrics::products::top_products(self.store.as_ref(), window, limit).await
    }

    pub async fn customer_segments(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<CustomerSegment>, AnalyticsError> {
        metrics::segmentation::customer_segments(
            self.store.as_ref(),
            window,
            &self.config.segment_thresholds,
        )
        .await
    }

    pub async fn customer_type_breakdown(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<CustomerTypeBreakdown>, AnalyticsError> {
        metrics::segmentation::customer_type_breakdown(self.store.as_ref(), window).await
    }

    pub async fn geographic_distribution(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<GeographicInsight>, AnalyticsError> {
        metrics::geography::geographic_distribution(self.store.as_ref(), window).await
    }

    pub async fn conversion_funnel(
        &self,
        window: &TimeWindow,
    ) -> Result<ConversionFunnel, AnalyticsError> {
        metrics::funnel::conversion_funnel(self.store.as_ref(), window).await
    }

    /// Month- or quarter-granularity revenue with period-over-period
    /// growth. Other granularities are a validation error.
    pub async fn seasonal_trends(
        &self,
        window: &TimeWindow,
        granularity: Granularity,
    ) -> Result<Vec<SeasonalTrend>, AnalyticsError> {
        metrics::trends::seasonal_trends(self.store.as_ref(), window, granularity).await
    }

    pub async fn daily_performance(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<DailyPerformance>, AnalyticsError> {
        metrics::trends::daily_performance(self.store.as_ref(), window).await
    }

    pub async fn customer_behavior(
        &self,
        window: &TimeWindow,
    ) -> Result<CustomerBehavior, AnalyticsError> {
        metrics::behavior::customer_behavior(self.store.as_ref(), window).await
    }

    pub async fn payment_method_breakdown(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<PaymentMethodMetric>, AnalyticsError> {
        metrics::methods::payment_method_breakdown(self.store.as_ref(), window).await
    }

    pub async fn shipping_method_breakdown(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<ShippingMethodMetric>, AnalyticsError> {
        metrics::methods::shipping_method_breakdown(self.store.as_ref(), window).await
    }

    pub async fn cohort_matrix(
        &self,
        window: &TimeWindow,
        granularity: Granularity,
    ) -> Result<CohortMatrix, AnalyticsError> {
        metrics::cohorts::cohort_matrix(self.store.as_ref(), window, granularity).await
    }

    /// Today-versus-yesterday totals plus the most recent orders.
    pub async fn realtime_snapshot(
        &self,
        recent_limit: usize,
    ) -> Result<RealtimeSnapshot, AnalyticsError> {
        metrics::realtime::snapshot(self.store.as_ref(), recent_limit).await
    }

    /// Clock-injected variant of [`Self::realtime_snapshot`].
    pub async fn realtime_snapshot_at(
        &self,
        now: DateTime<Utc>,
        recent_limit: usize,
    ) -> Result<RealtimeSnapshot, AnalyticsError> {
        metrics::realtime::snapshot_at(self.store.as_ref(), now, recent_limit).await
    }

    pub async fn product_velocity(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<ProductVelocity>, AnalyticsError> {
        metrics::velocity::product_velocity(self.store.as_ref(), window).await
    }

    pub async fn order_rows(
        &self,
        window: &TimeWindow,
        max_rows: usize,
    ) -> Result<Vec<OrderRow>, AnalyticsError> {
        metrics::details::order_rows(self.store.as_ref(), window, max_rows).await
    }

    pub async fn top_customers(
        &self,
        window: &TimeWindow,
        limit: usize,
    ) -> Result<Vec<TopCustomer>, AnalyticsError> {
        metrics::details::top_customers(self.store.as_ref(), window, limit).await
    }

    pub async fn refund_records(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<RefundRecord>, AnalyticsError> {
        metrics::details::refund_records(self.store.as_ref(), window).await
    }
}
