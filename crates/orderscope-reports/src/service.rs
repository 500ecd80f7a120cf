//! Report assembly: concurrent metric fan-out, comparison, trends.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use uuid::Uuid;

use orderscope_core::metrics::DailyPerformance;
use orderscope_core::rates;
use orderscope_core::window::day_start;
use orderscope_core::{AnalyticsError, TimeWindow};
use orderscope_engine::MetricsEngine;

use crate::export;
use crate::report::{
    ComparativeSalesReport, DashboardMetrics, DashboardPeriod, MetricComparison,
    PeriodDescriptor, ReportBreakdown, ReportComparison, ReportDetails, ReportOptions,
    ReportSummary, SalesReport, TrendMetric, TrendPoint, TrendSeries, TrendSummary,
};

const DASHBOARD_PRODUCT_LIMIT: usize = 5;
const DASHBOARD_GEOGRAPHY_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Cap on in-flight store queries across concurrent report
    /// generations. The store's query capacity is the one shared
    /// resource in this layer.
    pub max_concurrent_queries: usize,
    /// Deadline for one whole report fan-out. On expiry the entire
    /// generation fails; there are no partial reports.
    pub report_timeout: Duration,
    /// Row cap for the itemized order list of a detailed report.
    pub detail_order_cap: usize,
    pub geography_limit: usize,
    pub top_product_limit: usize,
    pub top_customer_limit: usize,
    pub recent_order_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_concurrent_queries: 8,
            report_timeout: Duration::from_secs(30),
            detail_order_cap: 1000,
            geography_limit: 15,
            top_product_limit: 20,
            top_customer_limit: 50,
            recent_order_limit: 10,
        }
    }
}

impl ReportConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_concurrent_queries: env_parse(
                "ORDERSCOPE_MAX_CONCURRENT_QUERIES",
                defaults.max_concurrent_queries,
            ),
            report_timeout: Duration::from_millis(env_parse(
                "ORDERSCOPE_REPORT_TIMEOUT_MS",
                defaults.report_timeout.as_millis() as u64,
            )),
            detail_order_cap: env_parse("ORDERSCOPE_DETAIL_ORDER_CAP", defaults.detail_order_cap),
            geography_limit: env_parse("ORDERSCOPE_GEOGRAPHY_LIMIT", defaults.geography_limit),
            top_product_limit: env_parse("ORDERSCOPE_TOP_PRODUCT_LIMIT", defaults.top_product_limit),
            top_customer_limit: env_parse(
                "ORDERSCOPE_TOP_CUSTOMER_LIMIT",
                defaults.top_customer_limit,
            ),
            recent_order_limit: env_parse(
                "ORDERSCOPE_RECENT_ORDER_LIMIT",
                defaults.recent_order_limit,
            ),
        }
    }
}

fn env_parse<T: std::str::FromStr + Copy>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

/// Turns a time range and options into one assembled report.
///
/// Holds no request state; one service instance can serve concurrent
/// report generations, all sharing the query-permit pool.
pub struct ReportService {
    engine: MetricsEngine,
    config: ReportConfig,
    query_permits: Arc<Semaphore>,
}

impl ReportService {
    pub fn new(engine: MetricsEngine) -> Self {
        Self::with_config(engine, ReportConfig::default())
    }

    pub fn with_config(engine: MetricsEngine, config: ReportConfig) -> Self {
        let query_permits = Arc::new(Semaphore::new(config.max_concurrent_queries.max(1)));
        Self {
            engine,
            config,
            query_permits,
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Generate a sales report for the window.
    ///
    /// All metric queries run concurrently and join fail-fast: if any
    /// one fails or the deadline expires, the whole call fails rather
    /// than returning a report with silently missing numbers.
    #[tracing::instrument(skip(self, options), fields(start = %window.start(), end = %window.end()))]
    pub async fn generate_report(
        &self,
        window: TimeWindow,
        options: ReportOptions,
    ) -> Result<SalesReport, AnalyticsError> {
        let deadline = self.config.report_timeout;
        match tokio::time::timeout(deadline, self.assemble(window, &options)).await {
            Ok(report) => report,
            Err(_) => Err(AnalyticsError::Timeout(deadline)),
        }
    }

    pub async fn generate_monthly_report(
        &self,
        year: i32,
        month: u32,
        include_details: bool,
    ) -> Result<SalesReport, AnalyticsError> {
        let window = TimeWindow::month(year, month)?;
        self.generate_report(
            window,
            ReportOptions {
                include_details,
                group_by: orderscope_core::Granularity::Day,
                generated_by: "monthly-report".to_string(),
            },
        )
        .await
    }

    pub async fn generate_yearly_report(
        &self,
        year: i32,
        include_details: bool,
    ) -> Result<SalesReport, AnalyticsError> {
        let window = TimeWindow::year(year)?;
        self.generate_report(
            window,
            ReportOptions {
                include_details,
                group_by: orderscope_core::Granularity::Month,
                generated_by: "yearly-report".to_string(),
            },
        )
        .await
    }

    /// Two independent reports plus per-metric deltas. The ranges need
    /// not be adjacent or equal length.
    pub async fn generate_comparative_report(
        &self,
        current: TimeWindow,
        previous: TimeWindow,
    ) -> Result<ComparativeSalesReport, AnalyticsError> {
        let (current_report, previous_report) = tokio::try_join!(
            self.generate_report(current, ReportOptions::default()),
            self.generate_report(previous, ReportOptions::default()),
        )?;

        let comparison = ReportComparison {
            revenue: MetricComparison::between(
                current_report.summary.total_revenue,
                previous_report.summary.total_revenue,
            ),
            orders: MetricComparison::between(
                current_report.summary.total_orders as f64,
                previous_report.summary.total_orders as f64,
            ),
            average_order_value: MetricComparison::between(
                current_report.summary.average_order_value,
                previous_report.summary.average_order_value,
            ),
            unique_customers: MetricComparison::between(
                current_report.summary.unique_customers as f64,
                previous_report.summary.unique_customers as f64,
            ),
        };

        Ok(ComparativeSalesReport {
            id: format!("comparative-{}", Uuid::new_v4().simple()),
            title: "Comparative Sales Report".to_string(),
            current: current_report,
            previous: previous_report,
            comparison,
            generated_at: Utc::now(),
        })
    }

    /// Day-by-day series with day-over-day changes for the requested
    /// metrics. Defaults to revenue and orders when `metrics` is empty.
    pub async fn sales_performance_trends(
        &self,
        window: TimeWindow,
        metrics: &[TrendMetric],
    ) -> Result<TrendSeries, AnalyticsError> {
        let requested: &[TrendMetric] = if metrics.is_empty() {
            &[TrendMetric::Revenue, TrendMetric::Orders]
        } else {
            metrics
        };

        let days = self.run(self.engine.daily_performance(&window)).await?;
        Ok(build_trend_series(&days, requested))
    }

    /// Preset-window dashboard: totals, top products, funnel, top
    /// geography, customer behavior.
    pub async fn dashboard(
        &self,
        period: DashboardPeriod,
    ) -> Result<DashboardMetrics, AnalyticsError> {
        self.dashboard_at(Utc::now(), period).await
    }

    /// Clock-injected variant of [`Self::dashboard`].
    pub async fn dashboard_at(
        &self,
        now: DateTime<Utc>,
        period: DashboardPeriod,
    ) -> Result<DashboardMetrics, AnalyticsError> {
        let start = match period {
            DashboardPeriod::Today => day_start(now.date_naive()),
            DashboardPeriod::Last7Days => now - chrono::Duration::days(7),
            DashboardPeriod::Last30Days => now - chrono::Duration::days(30),
            DashboardPeriod::Last90Days => now - chrono::Duration::days(90),
        };
        let window = TimeWindow::new(start, now)?;

        let engine = &self.engine;
        let (totals, top_products, funnel, mut geography, customer_behavior) = tokio::try_join!(
            self.run(engine.window_totals(&window)),
            self.run(engine.top_products(&window, DASHBOARD_PRODUCT_LIMIT)),
            self.run(engine.conversion_funnel(&window)),
            self.run(engine.geographic_distribution(&window)),
            self.run(engine.customer_behavior(&window)),
        )?;
        geography.truncate(DASHBOARD_GEOGRAPHY_LIMIT);

        Ok(DashboardMetrics {
            period,
            totals,
            top_products,
            funnel,
            geography,
            customer_behavior,
            generated_at: now,
        })
    }

    /// Sectioned CSV of an assembled report (summary, daily trends,
    /// payment methods).
    pub fn export_csv(&self, report: &SalesReport) -> Result<String, AnalyticsError> {
        export::export_csv(report)
    }

    /// Flat CSV of a detailed report's itemized order list.
    pub fn export_orders_csv(&self, report: &SalesReport) -> Result<Vec<u8>, AnalyticsError> {
        export::export_orders_csv(report)
    }

    async fn assemble(
        &self,
        window: TimeWindow,
        options: &ReportOptions,
    ) -> Result<SalesReport, AnalyticsError> {
        let engine = &self.engine;
        let (trends, totals, customer_behavior, payment_methods, shipping_methods, mut geography, customer_types, details) =
            tokio::try_join!(
                self.run(engine.revenue_by_period(&window, options.group_by)),
                self.run(engine.window_totals(&window)),
                self.run(engine.customer_behavior(&window)),
                self.run(engine.payment_method_breakdown(&window)),
                self.run(engine.shipping_method_breakdown(&window)),
                self.run(engine.geographic_distribution(&window)),
                self.run(engine.customer_type_breakdown(&window)),
                self.fetch_details(&window, options),
            )?;
        geography.truncate(self.config.geography_limit);

        let start_day = window.start().format("%Y-%m-%d");
        let end_day = window.end().format("%Y-%m-%d");
        Ok(SalesReport {
            id: format!("sales-{start_day}-{end_day}-{}", Uuid::new_v4().simple()),
            title: format!("Sales Report: {start_day} - {end_day}"),
            period: PeriodDescriptor::from_window(&window),
            summary: ReportSummary::from_totals(&totals),
            breakdown: ReportBreakdown {
                payment_methods,
                shipping_methods,
                customer_types,
                geography,
            },
            customer_behavior,
            trends,
            details,
            generated_at: Utc::now(),
            generated_by: options.generated_by.clone(),
        })
    }

    async fn fetch_details(
        &self,
        window: &TimeWindow,
        options: &ReportOptions,
    ) -> Result<Option<ReportDetails>, AnalyticsError> {
        if !options.include_details {
            return Ok(None);
        }
        let engine = &self.engine;
        let (orders, products, customers, refunds) = tokio::try_join!(
            self.run(engine.order_rows(window, self.config.detail_order_cap)),
            self.run(engine.top_products(window, self.config.top_product_limit)),
            self.run(engine.top_customers(window, self.config.top_customer_limit)),
            self.run(engine.refund_records(window)),
        )?;
        Ok(Some(ReportDetails {
            orders,
            products,
            customers,
            refunds,
        }))
    }

    /// Run one metric query under the shared in-flight permit pool.
    async fn run<T>(
        &self,
        query: impl Future<Output = Result<T, AnalyticsError>>,
    ) -> Result<T, AnalyticsError> {
        let _permit = self
            .query_permits
            .acquire()
            .await
            .map_err(|_| AnalyticsError::Store(anyhow::anyhow!("query permit pool closed")))?;
        query.await
    }
}

fn build_trend_series(days: &[DailyPerformance], requested: &[TrendMetric]) -> TrendSeries {
    let wants = |metric: TrendMetric| requested.contains(&metric);

    let points: Vec<TrendPoint> = days
        .iter()
        .enumerate()
        .map(|(idx, day)| {
            let prev = if idx == 0 { None } else { days.get(idx - 1) };
            let change = |metric: TrendMetric, current: f64, previous: f64| {
                (wants(metric) && prev.is_some()).then(|| rates::change_pct(current, previous))
            };
            TrendPoint {
                date: day.date.clone(),
                revenue: day.revenue,
                orders: day.orders,
                average_order_value: day.average_order_value,
                customers: day.customers,
                revenue_change: change(
                    TrendMetric::Revenue,
                    day.revenue,
                    prev.map_or(0.0, |p| p.revenue),
                ),
                orders_change: change(
                    TrendMetric::Orders,
                    day.orders as f64,
                    prev.map_or(0.0, |p| p.orders as f64),
                ),
                aov_change: change(
                    TrendMetric::Aov,
                    day.average_order_value,
                    prev.map_or(0.0, |p| p.average_order_value),
                ),
                customers_change: change(
                    TrendMetric::Customers,
                    day.customers as f64,
                    prev.map_or(0.0, |p| p.customers as f64),
                ),
            }
        })
        .collect();

    let total_revenue: f64 = days.iter().map(|d| d.revenue).sum();
    let total_orders: i64 = days.iter().map(|d| d.orders).sum();
    let summary = TrendSummary {
        total_days: days.len() as i64,
        average_daily_revenue: rates::mean(total_revenue, days.len()),
        average_daily_orders: rates::mean(total_orders as f64, days.len()),
        best_day: days
            .iter()
            .max_by(|a, b| a.revenue.total_cmp(&b.revenue))
            .cloned(),
        worst_day: days
            .iter()
            .min_by(|a, b| a.revenue.total_cmp(&b.revenue))
            .cloned(),
    };

    TrendSeries { points, summary }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str, revenue: f64, orders: i64, customers: i64) -> DailyPerformance {
        DailyPerformance {
            date: date.to_string(),
            revenue,
            orders,
            average_order_value: rates::ratio(revenue, orders as f64),
            customers,
        }
    }

    #[test]
    fn first_day_has_no_change_fields() {
        let days = vec![day("2025-03-01", 100.0, 2, 2), day("2025-03-02", 150.0, 3, 3)];
        let series = build_trend_series(&days, &[TrendMetric::Revenue, TrendMetric::Orders]);

        assert_eq!(series.points[0].revenue_change, None);
        let second = &series.points[1];
        assert!((second.revenue_change.unwrap_or(f64::NAN) - 50.0).abs() < 1e-9);
        assert!((second.orders_change.unwrap_or(f64::NAN) - 50.0).abs() < 1e-9);
        // Not requested: absent even though a predecessor exists.
        assert_eq!(second.aov_change, None);
        assert_eq!(second.customers_change, None);
    }

    #[test]
    fn summary_tracks_best_and_worst_days() {
        let days = vec![
            day("2025-03-01", 100.0, 2, 2),
            day("2025-03-02", 300.0, 3, 3),
            day("2025-03-03", 50.0, 1, 1),
        ];
        let series = build_trend_series(&days, &[TrendMetric::Revenue]);

        assert_eq!(series.summary.total_days, 3);
        assert_eq!(series.summary.average_daily_revenue, 150.0);
        assert_eq!(
            series.summary.best_day.as_ref().map(|d| d.date.as_str()),
            Some("2025-03-02")
        );
        assert_eq!(
            series.summary.worst_day.as_ref().map(|d| d.date.as_str()),
            Some("2025-03-03")
        );
    }

    #[test]
    fn empty_series_yields_zeroed_summary() {
        let series = build_trend_series(&[], &[TrendMetric::Revenue]);
        assert!(series.points.is_empty());
        assert_eq!(series.summary.total_days, 0);
        assert_eq!(series.summary.average_daily_revenue, 0.0);
        assert!(series.summary.best_day.is_none());
    }
}
